use platter_catalog::CatalogError;
use platter_coverage::CoverageError;
use platter_database::DatabaseError;
use platter_kernel::prelude::ApiError;
use std::borrow::Cow;

#[platter_derive::platter_error]
pub enum OrderingError {
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Missing, or not visible to the caller.
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A move the state machine forbids, or a lost compare-and-set race.
    #[error("Conflict{}: {message}", format_context(.context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Catalog error{}: {source}", format_context(.context))]
    Catalog { source: CatalogError, context: Option<Cow<'static, str>> },

    #[error("Coverage error{}: {source}", format_context(.context))]
    Coverage { source: CoverageError, context: Option<Cow<'static, str>> },

    #[error("Database error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },

    #[error("Internal ordering error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl OrderingError {
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }

    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound { message: message.into(), context: None }
    }

    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Conflict { message: message.into(), context: None }
    }
}

impl From<OrderingError> for ApiError {
    fn from(err: OrderingError) -> Self {
        match err {
            OrderingError::Validation { message, .. } => Self::bad_request(message),
            OrderingError::NotFound { message, .. } => Self::not_found(message),
            OrderingError::Conflict { message, .. } => Self::conflict(message),
            OrderingError::Catalog { source, .. } => source.into(),
            OrderingError::Coverage { source, .. } => source.into(),
            other => Self::internal(other.to_string()),
        }
    }
}
