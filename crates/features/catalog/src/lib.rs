//! Catalog feature slice: vendor storefronts, menus and public browsing.

mod error;
mod handlers;
pub mod model;
mod repository;
mod service;

pub use crate::error::{CatalogError, CatalogErrorExt};
pub use crate::service::CatalogService;

use platter_coverage::CoverageService;
use platter_database::{Database, Migration};
use platter_kernel::server::state::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

#[platter_derive::platter_slice]
pub struct Catalog {
    pub service: CatalogService,
}

#[must_use]
pub fn migrations() -> Vec<Migration> {
    vec![
        Migration::new("catalog", "0001", include_str!("../migrations/0001_vendors.surql")),
        Migration::new("catalog", "0002", include_str!("../migrations/0002_menu_items.surql")),
    ]
}

#[must_use]
pub fn init(database: &Database, coverage: &CoverageService) -> Catalog {
    tracing::info!("Catalog slice initialized");
    Catalog::new(CatalogInner { service: CatalogService::new(database.clone(), coverage.clone()) })
}

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::get_profile, handlers::put_profile))
        .routes(routes!(handlers::own_menu, handlers::create_item))
        .routes(routes!(handlers::update_item, handlers::delete_item))
        .routes(routes!(handlers::list_vendors))
        .routes(routes!(handlers::storefront))
}
