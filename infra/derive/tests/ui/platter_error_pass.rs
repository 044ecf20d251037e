use platter_derive::platter_error;
use std::borrow::Cow;

#[platter_error]
pub enum DispatchError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Partner offline{}: {message}", format_context(.context))]
    Offline { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let err = DispatchError::from("boom");
    assert_eq!(err.kind(), "internal");
}
