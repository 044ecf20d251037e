use platter_database::DatabaseError;
use platter_kernel::prelude::ApiError;
use std::borrow::Cow;

#[platter_derive::platter_error]
pub enum CoverageError {
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Database error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },

    #[error("Internal coverage error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl CoverageError {
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }

    /// Returned by [`CoverageService::ensure_serviceable`](crate::CoverageService::ensure_serviceable).
    #[must_use]
    pub fn not_serviceable() -> Self {
        Self::validation("pincode not serviceable")
    }
}

impl From<CoverageError> for ApiError {
    fn from(err: CoverageError) -> Self {
        match err {
            CoverageError::Validation { message, .. } => Self::bad_request(message),
            CoverageError::NotFound { message, .. } => Self::not_found(message),
            other => Self::internal(other.to_string()),
        }
    }
}
