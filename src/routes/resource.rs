//! Resource CRUD routes built from the builtin model.
//! Parameterized paths let one set of handlers serve all three resources;
//! handlers resolve the descriptor from the segment.

use axum::{
    middleware,
    routing::{get, patch},
    Router,
};

use crate::auth::require_bearer;
use crate::handlers::resource::{create, get_by_id, list, set_status, soft_delete, update};
use crate::state::AppState;

/// `/:recurso` routes for clientes, maquiladores and usuarios. Every route
/// requires a valid bearer credential.
pub fn resource_routes(state: AppState) -> Router {
    Router::new()
        .route("/:recurso", get(list).post(create))
        .route(
            "/:recurso/:id",
            get(get_by_id).put(update).delete(soft_delete),
        )
        .route("/:recurso/:id/status", patch(set_status))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ))
        .with_state(state)
}
