use crate::model::OrderEvent;
use platter_database::{Database, DatabaseError, DatabaseErrorExt};

#[derive(Debug, Clone)]
pub(crate) struct EventRepository {
    db: Database,
}

impl EventRepository {
    pub(crate) const fn new(db: Database) -> Self {
        Self { db }
    }

    pub(crate) async fn append(&self, event: OrderEvent) -> Result<(), DatabaseError> {
        self.db
            .query("CREATE order_event CONTENT $event RETURN NONE")
            .bind(("event", event))
            .await
            .and_then(surrealdb::Response::check)
            .map_err(|e| DatabaseError::from_write(e, "recording order event"))?;
        Ok(())
    }

    pub(crate) async fn for_order(&self, order_id: &str) -> Result<Vec<OrderEvent>, DatabaseError> {
        let mut response = self
            .db
            .query(
                "SELECT *, record::id(id) AS id FROM order_event WHERE orderId = $order \
                 ORDER BY at ASC",
            )
            .bind(("order", order_id.to_owned()))
            .await
            .context("loading order timeline")?;
        response.take::<Vec<OrderEvent>>(0).context("decoding order timeline")
    }
}
