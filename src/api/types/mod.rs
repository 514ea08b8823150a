//! Shared API types

pub mod error;
pub mod extract;

pub use error::{ApiError, ApiErrorResponse};
pub use extract::{deserialize_flag, Path, Query};
