//! Lifecycle engine and request-shape validation.

pub mod lifecycle;
pub mod validation;

pub use lifecycle::LifecycleService;
pub use validation::RequestValidator;
