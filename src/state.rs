//! Shared application state for all routes.

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::TokenVerifier;
use crate::model::ResourceModel;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub model: Arc<ResourceModel>,
    /// Injected credential verifier; routes never touch the raw secret.
    pub verifier: TokenVerifier,
}
