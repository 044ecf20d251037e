use std::borrow::Cow;

/// Errors raised by [`crate::EventBus`].
#[platter_derive::platter_error]
pub enum EventBusError {
    /// A channel registered for the type holds a different payload type.
    #[error("Type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Broadcast capacity must be at least one.
    #[error("Invalid capacity{}: {message}", format_context(.context))]
    InvalidCapacity { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
