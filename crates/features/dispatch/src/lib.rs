//! Dispatch feature slice: delivery partner profiles, availability and the
//! partner's side of an order (claim, release, pickup, deliver).
//!
//! A claim first takes the partner's own slot (`partner.activeOrder`) with a
//! conditional update, then the ordering slice's conditional assignment. The
//! slot keeps one partner to one live delivery and blocks going offline while
//! it is held; the assignment keeps one order to one partner.

mod error;
mod handlers;
pub mod model;
mod repository;
mod service;

pub use crate::error::{DispatchError, DispatchErrorExt};
pub use crate::service::DispatchService;

use platter_coverage::CoverageService;
use platter_database::{Database, Migration};
use platter_kernel::server::state::ApiState;
use platter_ordering::OrderingService;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

#[platter_derive::platter_slice]
pub struct Dispatch {
    pub service: DispatchService,
}

#[must_use]
pub fn migrations() -> Vec<Migration> {
    vec![
        Migration::new("dispatch", "0001", include_str!("../migrations/0001_partners.surql")),
        Migration::new("dispatch", "0002", include_str!("../migrations/0002_partner_claims.surql")),
    ]
}

#[must_use]
pub fn init(database: &Database, ordering: &OrderingService, coverage: &CoverageService) -> Dispatch {
    tracing::info!("Dispatch slice initialized");
    Dispatch::new(DispatchInner {
        service: DispatchService::new(database.clone(), ordering.clone(), coverage.clone()),
    })
}

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::get_profile, handlers::put_profile))
        .routes(routes!(handlers::availability))
        .routes(routes!(handlers::my_deliveries))
        .routes(routes!(handlers::available))
        .routes(routes!(handlers::accept))
        .routes(routes!(handlers::release))
        .routes(routes!(handlers::pickup))
        .routes(routes!(handlers::deliver))
}
