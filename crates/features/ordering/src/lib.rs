//! Ordering feature slice: placement, pricing, visibility and the status
//! state machine.
//!
//! Status writes are compare-and-set on the status read beforehand, so
//! concurrent moves of one order cannot both apply. Every change is published
//! as [`OrderStatusChanged`](model::OrderStatusChanged).

mod error;
mod handlers;
pub mod model;
mod pricing;
mod repository;
mod service;
pub mod state;

pub use crate::error::{OrderingError, OrderingErrorExt};
pub use crate::service::OrderingService;

use platter_catalog::CatalogService;
use platter_coverage::CoverageService;
use platter_database::{Database, Migration};
use platter_domain::config::ApiConfig;
use platter_event_bus::EventBus;
use platter_kernel::server::state::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

#[platter_derive::platter_slice]
pub struct Ordering {
    pub service: OrderingService,
}

#[must_use]
pub fn migrations() -> Vec<Migration> {
    vec![Migration::new("ordering", "0001", include_str!("../migrations/0001_orders.surql"))]
}

#[must_use]
pub fn init(
    config: &ApiConfig,
    database: &Database,
    events: &EventBus,
    catalog: &CatalogService,
    coverage: &CoverageService,
) -> Ordering {
    let service = OrderingService::new(
        database.clone(),
        catalog.clone(),
        coverage.clone(),
        events.clone(),
        config.marketplace.clone(),
    );
    tracing::info!("Ordering slice initialized");
    Ordering::new(OrderingInner { service })
}

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::place, handlers::list))
        .routes(routes!(handlers::get))
        .routes(routes!(handlers::transition))
}
