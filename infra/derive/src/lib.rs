#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the Platter workspace: error enums, API models and
//! handlers, feature slice handles, and the runtime entry point.
//!
//! Examples are `ignore`d because a proc-macro crate cannot use its own macros in
//! doctests; the consuming crates exercise them in their tests.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Attribute macro to bootstrap the Platter Tokio runtime.
///
/// Turns an `async fn main() -> Result<..>` into a synchronous `main` that builds a
/// runtime from the selected profile and blocks on the body.
///
/// Profiles: `high_performance`, `memory_efficient`, `default` (or no argument).
///
/// ```rust,ignore
/// #[platter_runtime::main(high_performance)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Attribute macro for request/response DTOs.
///
/// * Adds `Debug`, `Serialize`, `Deserialize` and `utoipa::ToSchema` when missing.
/// * `rename_all = "camelCase"` unless overridden.
/// * `deny_unknown_fields` unless `deny_unknown_fields = false`.
///
/// ```rust,ignore
/// #[api_model]
/// pub struct LoginRequest {
///     pub email: String,
///     pub password: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Attribute macro that documents an Axum handler with `utoipa::path`.
///
/// Accepts the regular `utoipa::path` arguments.
///
/// ```rust,ignore
/// #[api_handler(get, path = "/health", responses((status = OK, body = HealthResponse)), tag = "System")]
/// pub async fn health_handler() -> impl IntoResponse { ... }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Attribute macro for the workspace error enums.
///
/// Every variant must use named fields. Variants carrying an upstream error name it
/// `source` (or mark it `#[source]`/`#[from]`) and must also carry
/// `context: Option<Cow<'static, str>>`.
///
/// Generated items:
/// * `#[derive(Debug, thiserror::Error)]` when missing.
/// * `<Name>Ext` with `.context(..)` for `Result<T, Name>` and `Result<T, Source>`.
/// * `From<Source>` for every source-carrying variant.
/// * `From<&'static str>` / `From<String>` when an `Internal` variant exists.
/// * `Name::kind()` returning the snake_case variant name, used for logs and API codes.
///
/// ```rust,ignore
/// #[platter_error]
/// pub enum OrderingError {
///     #[error("Database error{}: {source}", format_context(.context))]
///     Database { source: DatabaseError, context: Option<Cow<'static, str>> },
///     #[error("Internal ordering error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn platter_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Attribute macro that turns a struct into a feature slice handle.
///
/// The annotated fields move into `<Name>Inner`; `<Name>` becomes a cheap `Arc`
/// wrapper with `new`, `Deref<Target = <Name>Inner>` and a `FeatureSlice` impl so
/// it can be registered in the API state.
///
/// ```rust,ignore
/// #[platter_derive::platter_slice]
/// pub struct Ordering {
///     pub service: OrderService,
/// }
/// ```
#[proc_macro_attribute]
pub fn platter_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
