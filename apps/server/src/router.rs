use axum::routing::get;
use axum::{Json, Router};
use platter::domain::constants::{
    TAG_AUTH, TAG_CATALOG, TAG_COVERAGE, TAG_DISPATCH, TAG_ORDERS, TAG_SYSTEM,
};
use platter::kernel::server::state::ApiState;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(
    info(title = "Platter API", description = "Hyperlocal food delivery marketplace"),
    modifiers(&BearerAuth),
    tags(
        (name = TAG_SYSTEM),
        (name = TAG_AUTH, description = "Accounts, verification and sessions"),
        (name = TAG_COVERAGE, description = "Serviceable pincodes"),
        (name = TAG_CATALOG, description = "Vendor storefronts and menus"),
        (name = TAG_ORDERS, description = "Placement, status and timelines"),
        (name = TAG_DISPATCH, description = "Delivery partners"),
    ),
)]
struct ApiDoc;

/// Registers the `bearer` scheme the handlers refer to.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build(),
            ),
        );
    }
}

/// The full application: slice routes, `/openapi.json` and the Scalar UI at `/docs`.
pub fn app(state: ApiState) -> Router {
    let (routes, api_doc) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(platter::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .split_for_parts();

    let spec = api_doc.clone();
    Router::new()
        .merge(routes)
        .route("/openapi.json", get(move || async move { Json(spec) }))
        .merge(Scalar::with_url("/docs", api_doc))
}
