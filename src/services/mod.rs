//! Domain operations. Each service owns the handles it needs and returns
//! `AppError`s; controllers only translate HTTP to calls and back.

pub mod auth;
pub mod boards;
pub mod columns;
pub mod comments;
pub mod seed;
pub mod statuses;
pub mod tasks;
pub mod users;

use crate::error::{AppError, Missing};

/// Turns a lookup's `None` into the matching NotFound error.
pub(crate) trait OrMissing<T> {
    fn or_missing(self, missing: Missing) -> Result<T, AppError>;
}

impl<T> OrMissing<T> for Option<T> {
    fn or_missing(self, missing: Missing) -> Result<T, AppError> {
        self.ok_or(AppError::NotFound(missing))
    }
}
