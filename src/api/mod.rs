pub mod contracts;
pub mod dto;
pub mod errors;

pub use contracts::*;
pub use dto::*;
pub use errors::{ApiError, ApiResult, FailureResponse};
