use crate::error::{AuditError, AuditErrorExt};
use crate::model::OrderEvent;
use crate::repository::EventRepository;
use platter_database::Database;
use platter_event_bus::{EventBus, EventReceiverExt};
use platter_kernel::safe_nanoid;
use platter_kernel::security::session::AuthUser;
use platter_ordering::OrderingService;
use platter_ordering::model::OrderStatusChanged;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

/// Records order status changes and serves them back as timelines.
#[derive(Debug, Clone)]
pub struct AuditService {
    events: EventRepository,
    ordering: OrderingService,
}

impl AuditService {
    #[must_use]
    pub const fn new(db: Database, ordering: OrderingService) -> Self {
        Self { events: EventRepository::new(db), ordering }
    }

    /// Status history of an order the viewer can see, oldest first.
    ///
    /// # Errors
    /// NotFound (through ordering) when the order is missing or hidden from the viewer.
    pub async fn timeline(
        &self,
        viewer: &AuthUser,
        order_id: &str,
    ) -> Result<Vec<OrderEvent>, AuditError> {
        self.ordering.get(viewer, order_id).await?;
        let mut entries = self.events.for_order(order_id).await.context("building timeline")?;
        entries.sort_by_key(OrderEvent::sequence);
        Ok(entries)
    }

    #[instrument(skip_all, fields(order = %change.order_id, to = %change.to))]
    async fn record(&self, change: &OrderStatusChanged) {
        let entry = OrderEvent::record(safe_nanoid!(), change);
        match self.events.append(entry).await {
            Ok(()) => debug!("Order event recorded"),
            Err(e) => error!(error = %e, "Failed to record order event"),
        }
    }
}

/// Subscribes to [`OrderStatusChanged`] and persists every event.
///
/// The task ends when the bus shuts down.
///
/// # Errors
/// Fails when the bus already holds an incompatible `OrderStatusChanged` channel.
pub fn spawn_audit_worker(
    events: &EventBus,
    service: AuditService,
) -> Result<JoinHandle<()>, AuditError> {
    let mut receiver = events.subscribe::<OrderStatusChanged>().map_err(|e| AuditError::Internal {
        message: e.to_string().into(),
        context: Some("subscribing audit worker".into()),
    })?;

    Ok(tokio::spawn(async move {
        while let Some(change) = receiver.next_event().await {
            service.record(&change).await;
        }
        info!("Audit worker stopped");
    }))
}
