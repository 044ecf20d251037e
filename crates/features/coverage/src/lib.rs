//! Coverage feature slice: the pincodes the marketplace delivers to.
//!
//! Other slices call [`CoverageService::ensure_serviceable`] before binding a
//! vendor, partner or order to a pincode.

mod error;
mod handlers;
pub mod model;
mod repository;
mod service;

pub use crate::error::{CoverageError, CoverageErrorExt};
pub use crate::service::CoverageService;

use platter_database::{Database, Migration};
use platter_kernel::server::state::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

#[platter_derive::platter_slice]
pub struct Coverage {
    pub service: CoverageService,
}

#[must_use]
pub fn migrations() -> Vec<Migration> {
    vec![Migration::new("coverage", "0001", include_str!("../migrations/0001_pincodes.surql"))]
}

#[must_use]
pub fn init(database: &Database) -> Coverage {
    tracing::info!("Coverage slice initialized");
    Coverage::new(CoverageInner { service: CoverageService::new(database.clone()) })
}

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::list, handlers::upsert))
        .routes(routes!(handlers::check, handlers::deactivate))
}
