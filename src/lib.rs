//! Back-office REST API: clientes, maquiladores and usuarios over
//! PostgreSQL, with a shared status lifecycle (soft delete, guarded status
//! transitions) and a bearer-token gate.

pub mod auth;
pub mod config;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use auth::{Claims, TokenVerifier};
pub use config::ServerConfig;
pub use docs::docs_routes;
pub use error::{AppError, ConfigError};
pub use model::{ResourceModel, ResourceSpec, StatusFilter, STATUS_ACTIVE, STATUS_INACTIVE};
pub use response::{Envelope, ListMeta};
pub use routes::{common_routes, resource_routes};
pub use service::{LifecycleService, RequestValidator};
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_schema};
