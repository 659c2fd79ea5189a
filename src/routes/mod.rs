//! Routers: resource CRUD behind the bearer gate, plus open common routes.

pub mod common;
pub mod resource;

pub use common::common_routes;
pub use resource::resource_routes;
