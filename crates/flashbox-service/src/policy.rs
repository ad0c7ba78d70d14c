//! Failure handling for the collaborator-facing facade.
//!
//! Repository errors never reach facade callers. They are logged here and
//! replaced with an empty result.

use tracing::{error, warn};

use flashbox_core::result::AppResult;

/// Unwrap a list result, logging failures and returning an empty list.
pub(crate) fn listing<T>(operation: &'static str, result: AppResult<Vec<T>>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            error!(operation, error = %e, "Store operation failed");
            Vec::new()
        }
    }
}

/// Unwrap a lookup. A missing record is a normal outcome; only failures are logged.
pub(crate) fn lookup<T>(operation: &'static str, result: AppResult<Option<T>>) -> Option<T> {
    match result {
        Ok(found) => found,
        Err(e) if e.is_not_found() => None,
        Err(e) => {
            error!(operation, error = %e, "Store operation failed");
            None
        }
    }
}

/// Unwrap a write that produces a value.
pub(crate) fn outcome<T>(operation: &'static str, result: AppResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            error!(operation, error = %e, "Store operation failed");
            None
        }
    }
}

/// Report whether a write was applied.
///
/// Writes aimed at a missing record are logged as warnings.
pub(crate) fn applied<T>(operation: &'static str, result: AppResult<T>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) if e.is_not_found() => {
            warn!(operation, error = %e, "Write target not found");
            false
        }
        Err(e) => {
            error!(operation, error = %e, "Store operation failed");
            false
        }
    }
}
