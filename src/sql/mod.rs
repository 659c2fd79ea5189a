//! Parameterized SQL construction for resource tables and status lookups.

pub mod builder;
pub mod params;

pub use builder::{
    count, insert, natural_key_exists, select_by_id, select_window, soft_delete, status_exists,
    transition, update_full, QueryBuf,
};
pub use params::PgBindValue;
