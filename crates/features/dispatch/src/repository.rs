use crate::model::{PartnerProfile, Vehicle};
use chrono::{DateTime, Utc};
use platter_database::{Database, DatabaseError, DatabaseErrorExt};
use platter_domain::pincode::Pincode;
use platter_ordering::state::OrderStatus;

/// The partner's slot is free when it is empty or points at an order that is
/// finished or went to someone else. An unassigned live order still holds it:
/// that is a claim in progress.
const SLOT_FREE: &str = "(!activeOrder OR activeOrder.status IN $terminal \
     OR (activeOrder.partnerId AND activeOrder.partnerId != $partner))";

#[derive(Debug, Clone)]
pub(crate) struct PartnerRepository {
    db: Database,
}

impl PartnerRepository {
    pub(crate) const fn new(db: Database) -> Self {
        Self { db }
    }

    pub(crate) async fn find(&self, id: &str) -> Result<Option<PartnerProfile>, DatabaseError> {
        let mut response = self
            .db
            .query("SELECT *, record::id(id) AS id FROM ONLY type::thing('partner', $id)")
            .bind(("id", id.to_owned()))
            .await
            .context("loading partner")?;
        response.take::<Option<PartnerProfile>>(0).context("decoding partner")
    }

    /// New partners start offline; an existing partner keeps its availability.
    pub(crate) async fn upsert(
        &self,
        id: &str,
        vehicle: Vehicle,
        pincode: Pincode,
        phone: String,
        now: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        self.db
            .query(
                "UPSERT type::thing('partner', $id) SET vehicle = $vehicle, pincode = $pincode, \
                 phone = $phone, online = online ?? false, createdAt = createdAt ?? $now, \
                 updatedAt = $now RETURN NONE",
            )
            .bind(("id", id.to_owned()))
            .bind(("vehicle", vehicle))
            .bind(("pincode", pincode.into_inner()))
            .bind(("phone", phone))
            .bind(("now", now.timestamp_millis()))
            .await
            .and_then(surrealdb::Response::check)
            .context("saving partner")?;
        Ok(())
    }

    /// Going online always succeeds; going offline only while the slot is free.
    /// Returns whether the row changed.
    pub(crate) async fn set_online(
        &self,
        id: &str,
        online: bool,
        now: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        let guard = if online { String::new() } else { format!(" WHERE {SLOT_FREE}") };
        let mut response = self
            .db
            .query(format!(
                "LET $hit = (UPDATE type::thing('partner', $partner) SET online = $online, \
                 updatedAt = $now{guard} RETURN VALUE id); \
                 RETURN array::len($hit);"
            ))
            .bind(("partner", id.to_owned()))
            .bind(("online", online))
            .bind(("terminal", OrderStatus::TERMINAL.to_vec()))
            .bind(("now", now.timestamp_millis()))
            .await
            .and_then(surrealdb::Response::check)
            .map_err(|e| DatabaseError::from_write(e, "updating availability"))?;
        Ok(response.take::<Option<usize>>(1).context("reading availability change")?.unwrap_or(0) == 1)
    }

    /// Points the partner's slot at `order` if the partner is online and the
    /// slot is free. Concurrent claims by one partner all write this one row,
    /// so at most one of them takes the slot.
    pub(crate) async fn take_slot(
        &self,
        partner: &str,
        order: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        let mut response = self
            .db
            .query(format!(
                "LET $hit = (UPDATE type::thing('partner', $partner) \
                 SET activeOrder = type::thing('orders', $order), updatedAt = $now \
                 WHERE online = true AND {SLOT_FREE} RETURN VALUE id); \
                 RETURN array::len($hit);"
            ))
            .bind(("partner", partner.to_owned()))
            .bind(("order", order.to_owned()))
            .bind(("terminal", OrderStatus::TERMINAL.to_vec()))
            .bind(("now", now.timestamp_millis()))
            .await
            .and_then(surrealdb::Response::check)
            .map_err(|e| DatabaseError::from_write(e, "claiming partner slot"))?;
        Ok(response.take::<Option<usize>>(1).context("reading slot claim")?.unwrap_or(0) == 1)
    }

    /// Empties the slot if it still points at `order`.
    pub(crate) async fn free_slot(
        &self,
        partner: &str,
        order: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        self.db
            .query(
                "UPDATE type::thing('partner', $partner) SET activeOrder = NONE, updatedAt = $now \
                 WHERE activeOrder = type::thing('orders', $order) RETURN NONE",
            )
            .bind(("partner", partner.to_owned()))
            .bind(("order", order.to_owned()))
            .bind(("now", now.timestamp_millis()))
            .await
            .and_then(surrealdb::Response::check)
            .map_err(|e| DatabaseError::from_write(e, "freeing partner slot"))?;
        Ok(())
    }
}
