use crate::model::ServiceArea;
use chrono::{DateTime, Utc};
use platter_database::{Database, DatabaseError, DatabaseErrorExt};
use platter_domain::pincode::Pincode;
use platter_kernel::server::pagination::Page;

const PROJECTION: &str =
    "SELECT record::id(id) AS code, area, city, active, createdAt, updatedAt FROM";

#[derive(Debug, Clone)]
pub(crate) struct AreaRepository {
    db: Database,
}

impl AreaRepository {
    pub(crate) const fn new(db: Database) -> Self {
        Self { db }
    }

    pub(crate) async fn find(&self, code: &Pincode) -> Result<Option<ServiceArea>, DatabaseError> {
        let mut response = self
            .db
            .query(format!("{PROJECTION} ONLY type::thing('pincode', $code)"))
            .bind(("code", code.as_str().to_owned()))
            .await
            .context("loading pincode")?;
        response.take::<Option<ServiceArea>>(0).context("decoding pincode")
    }

    /// Keeps `createdAt` of an existing row and always reactivates it.
    pub(crate) async fn upsert(
        &self,
        code: &Pincode,
        area: String,
        city: String,
        now: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        self.db
            .query(
                "UPSERT type::thing('pincode', $code) SET area = $area, city = $city, \
                 active = true, createdAt = createdAt ?? $now, updatedAt = $now RETURN NONE",
            )
            .bind(("code", code.as_str().to_owned()))
            .bind(("area", area))
            .bind(("city", city))
            .bind(("now", now.timestamp_millis()))
            .await
            .and_then(surrealdb::Response::check)
            .context("saving pincode")?;
        Ok(())
    }

    pub(crate) async fn deactivate(
        &self,
        code: &Pincode,
        now: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        self.db
            .query("UPDATE type::thing('pincode', $code) SET active = false, updatedAt = $now RETURN NONE")
            .bind(("code", code.as_str().to_owned()))
            .bind(("now", now.timestamp_millis()))
            .await
            .and_then(surrealdb::Response::check)
            .context("deactivating pincode")?;
        Ok(())
    }

    pub(crate) async fn list_active(&self, page: Page) -> Result<Vec<ServiceArea>, DatabaseError> {
        let mut response = self
            .db
            .query(format!(
                "{PROJECTION} pincode WHERE active = true ORDER BY code LIMIT $limit START $offset"
            ))
            .bind(("limit", page.limit))
            .bind(("offset", page.offset))
            .await
            .context("listing pincodes")?;
        response.take::<Vec<ServiceArea>>(0).context("decoding pincodes")
    }
}
