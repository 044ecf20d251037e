use platter_database::DatabaseError;
use platter_kernel::prelude::ApiError;
use platter_kernel::security::token::TokenError;
use std::borrow::Cow;
use tracing::warn;

#[platter_derive::platter_error]
pub enum IdentityError {
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Wrong credentials or an OTP that does not match.
    #[error("Authentication failed{}: {message}", format_context(.context))]
    Auth { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Authenticated but not allowed yet, e.g. an unverified account.
    #[error("Forbidden{}: {message}", format_context(.context))]
    Forbidden { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Conflict{}: {message}", format_context(.context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// OTP attempts or resends exhausted.
    #[error("Rate limited{}: {message}", format_context(.context))]
    RateLimited { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Database error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },

    #[error("Token error{}: {source}", format_context(.context))]
    Token { source: TokenError, context: Option<Cow<'static, str>> },

    #[error("Internal identity error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl IdentityError {
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Validation { message, .. } => Self::bad_request(message),
            IdentityError::Auth { message, .. } => Self::unauthorized(message),
            IdentityError::Forbidden { message, .. } => Self::forbidden(message),
            IdentityError::NotFound { message, .. } => Self::not_found(message),
            IdentityError::Conflict { message, .. } => Self::conflict(message),
            IdentityError::RateLimited { message, .. } => Self::too_many_requests(message),
            IdentityError::Database { ref source, .. } if source.is_conflict() => {
                warn!(error = %err, "Unclassified write conflict");
                Self::conflict("resource already exists")
            },
            other => Self::internal(other.to_string()),
        }
    }
}
