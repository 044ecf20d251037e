use std::borrow::Cow;

/// Errors raised by the database layer and the repositories built on it.
#[platter_derive::platter_error]
pub enum DatabaseError {
    /// Builder input is incomplete or malformed.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The engine could not be reached or stayed unhealthy.
    #[error("Database connection failed{}: {message}", format_context(.context))]
    Connection { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Authentication failed{}: {message}", format_context(.context))]
    Auth { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A write collided with a unique index or an existing record id.
    #[error("Conflict{}: {message}", format_context(.context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("SurrealDB error{}: {source}", format_context(.context))]
    Surreal {
        #[source]
        source: surrealdb::Error,
        context: Option<Cow<'static, str>>,
    },

    /// A migration failed or an applied one was edited afterwards.
    #[error("Migration error{}: {message}", format_context(.context))]
    Migration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal database error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl DatabaseError {
    /// Classifies the error of a write statement.
    ///
    /// Unique index and duplicate id violations, and transactions that lost a
    /// write race, become [`DatabaseError::Conflict`]; everything else stays a
    /// [`DatabaseError::Surreal`].
    pub fn from_write(source: surrealdb::Error, context: impl Into<Cow<'static, str>>) -> Self {
        let text = source.to_string();
        if text.contains("already contains")
            || text.contains("already exists")
            || text.contains("read or write conflict")
            || text.contains("can be retried")
        {
            Self::Conflict { message: text.into(), context: Some(context.into()) }
        } else {
            Self::Surreal { source, context: Some(context.into()) }
        }
    }

    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
