use platter_coverage::CoverageError;
use platter_database::DatabaseError;
use platter_kernel::prelude::ApiError;
use std::borrow::Cow;

#[platter_derive::platter_error]
pub enum CatalogError {
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Coverage error{}: {source}", format_context(.context))]
    Coverage { source: CoverageError, context: Option<Cow<'static, str>> },

    #[error("Database error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },

    #[error("Internal catalog error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl CatalogError {
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }

    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound { message: message.into(), context: None }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation { message, .. } => Self::bad_request(message),
            CatalogError::NotFound { message, .. } => Self::not_found(message),
            CatalogError::Coverage { source, .. } => source.into(),
            other => Self::internal(other.to_string()),
        }
    }
}
