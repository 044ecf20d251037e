use platter_coverage::CoverageError;
use platter_database::DatabaseError;
use platter_kernel::prelude::ApiError;
use platter_ordering::OrderingError;
use std::borrow::Cow;

#[platter_derive::platter_error]
pub enum DispatchError {
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The partner's availability or current assignment does not allow the action.
    #[error("Conflict{}: {message}", format_context(.context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Ordering error{}: {source}", format_context(.context))]
    Ordering { source: OrderingError, context: Option<Cow<'static, str>> },

    #[error("Coverage error{}: {source}", format_context(.context))]
    Coverage { source: CoverageError, context: Option<Cow<'static, str>> },

    #[error("Database error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },

    #[error("Internal dispatch error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl DispatchError {
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }

    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Conflict { message: message.into(), context: None }
    }

    pub(crate) fn no_profile() -> Self {
        Self::NotFound { message: "set up your partner profile first".into(), context: None }
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Validation { message, .. } => Self::bad_request(message),
            DispatchError::NotFound { message, .. } => Self::not_found(message),
            DispatchError::Conflict { message, .. } => Self::conflict(message),
            DispatchError::Ordering { source, .. } => source.into(),
            DispatchError::Coverage { source, .. } => source.into(),
            other => Self::internal(other.to_string()),
        }
    }
}
