//! Audit feature slice: a persisted timeline of every order status change.
//!
//! [`init`] starts a worker that listens for
//! [`OrderStatusChanged`](platter_ordering::model::OrderStatusChanged) and
//! writes one [`OrderEvent`](model::OrderEvent) per change.

mod error;
mod handlers;
pub mod model;
mod repository;
mod service;

pub use crate::error::{AuditError, AuditErrorExt};
pub use crate::service::{AuditService, spawn_audit_worker};

use platter_database::{Database, Migration};
use platter_event_bus::EventBus;
use platter_kernel::server::state::ApiState;
use platter_ordering::OrderingService;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

#[platter_derive::platter_slice]
pub struct Audit {
    pub service: AuditService,
}

#[must_use]
pub fn migrations() -> Vec<Migration> {
    vec![Migration::new("audit", "0001", include_str!("../migrations/0001_order_events.surql"))]
}

/// Initializes the slice and starts the audit worker.
///
/// # Errors
/// Fails when the worker cannot subscribe to the bus.
pub fn init(
    database: &Database,
    events: &EventBus,
    ordering: &OrderingService,
) -> Result<Audit, AuditError> {
    let service = AuditService::new(database.clone(), ordering.clone());
    spawn_audit_worker(events, service.clone())?;

    tracing::info!("Audit slice initialized");
    Ok(Audit::new(AuditInner { service }))
}

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(handlers::timeline))
}
