use platter_derive::platter_error;
use std::borrow::Cow;

#[platter_error]
pub enum StorefrontError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Menu item not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal storefront error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read_menu() -> Result<String, std::io::Error> {
    Err(std::io::Error::new(std::io::ErrorKind::NotFound, "menu.json"))
}

#[test]
fn source_errors_convert_with_context() {
    let err = read_menu().context("Loading menu").unwrap_err();
    assert!(matches!(err, StorefrontError::Io { .. }));
    assert_eq!(err.kind(), "io");
    assert!(err.to_string().contains("(Loading menu)"), "got: {err}");
}

#[test]
fn context_is_attached_to_own_variants() {
    let res: Result<(), StorefrontError> = Err(StorefrontError::NotFound {
        message: "item 42".into(),
        context: None,
    });
    let err = res.context("Updating price").unwrap_err();
    assert_eq!(err.to_string(), "Menu item not found (Updating price): item 42");
    assert_eq!(err.kind(), "not_found");
}

#[test]
fn strings_become_internal_errors() {
    let err: StorefrontError = "kitchen on fire".into();
    assert!(matches!(err, StorefrontError::Internal { .. }));

    let err: StorefrontError = format!("{} orders lost", 3).into();
    assert_eq!(err.to_string(), "Internal storefront error: 3 orders lost");
}

#[test]
fn question_mark_uses_generated_from() {
    fn load() -> Result<String, StorefrontError> {
        Ok(read_menu()?)
    }
    assert!(matches!(load(), Err(StorefrontError::Io { context: None, .. })));
}

#[test]
fn ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/platter_error_pass.rs");
}
