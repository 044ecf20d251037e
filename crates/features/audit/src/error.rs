use platter_database::DatabaseError;
use platter_kernel::prelude::ApiError;
use platter_ordering::OrderingError;
use std::borrow::Cow;

#[platter_derive::platter_error]
pub enum AuditError {
    #[error("Ordering error{}: {source}", format_context(.context))]
    Ordering { source: OrderingError, context: Option<Cow<'static, str>> },

    #[error("Database error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },

    #[error("Audit error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<AuditError> for ApiError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::Ordering { source, .. } => source.into(),
            other => Self::internal(other.to_string()),
        }
    }
}
