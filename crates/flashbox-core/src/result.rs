//! Convenience result type alias for Flashbox.

use crate::error::AppError;

/// A specialized `Result` type for Flashbox operations.
pub type AppResult<T> = Result<T, AppError>;
