use crate::model::{MenuItem, MenuItemPatch, VendorProfile};
use chrono::{DateTime, Utc};
use platter_database::{Database, DatabaseError, DatabaseErrorExt};
use platter_domain::pincode::Pincode;
use platter_kernel::server::pagination::Page;

/// Validated profile fields.
#[derive(Debug)]
pub(crate) struct ProfileFields {
    pub name: String,
    pub description: Option<String>,
    pub cuisines: Vec<String>,
    pub address: String,
    pub pincode: Pincode,
    pub is_open: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct CatalogRepository {
    db: Database,
}

impl CatalogRepository {
    pub(crate) const fn new(db: Database) -> Self {
        Self { db }
    }

    pub(crate) async fn vendor(&self, id: &str) -> Result<Option<VendorProfile>, DatabaseError> {
        let mut response = self
            .db
            .query("SELECT *, record::id(id) AS id FROM ONLY type::thing('vendor', $id)")
            .bind(("id", id.to_owned()))
            .await
            .context("loading vendor")?;
        response.take::<Option<VendorProfile>>(0).context("decoding vendor")
    }

    pub(crate) async fn upsert_vendor(
        &self,
        id: &str,
        fields: ProfileFields,
        now: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        self.db
            .query(
                "UPSERT type::thing('vendor', $id) SET name = $name, description = $description, \
                 cuisines = $cuisines, address = $address, pincode = $pincode, isOpen = $open, \
                 createdAt = createdAt ?? $now, updatedAt = $now RETURN NONE",
            )
            .bind(("id", id.to_owned()))
            .bind(("name", fields.name))
            .bind(("description", fields.description))
            .bind(("cuisines", fields.cuisines))
            .bind(("address", fields.address))
            .bind(("pincode", fields.pincode.into_inner()))
            .bind(("open", fields.is_open))
            .bind(("now", now.timestamp_millis()))
            .await
            .and_then(surrealdb::Response::check)
            .context("saving vendor")?;
        Ok(())
    }

    pub(crate) async fn open_vendors(
        &self,
        pincode: &Pincode,
        page: Page,
    ) -> Result<Vec<VendorProfile>, DatabaseError> {
        let mut response = self
            .db
            .query(
                "SELECT *, record::id(id) AS id FROM vendor WHERE pincode = $pincode \
                 AND isOpen = true ORDER BY name LIMIT $limit START $offset",
            )
            .bind(("pincode", pincode.as_str().to_owned()))
            .bind(("limit", page.limit))
            .bind(("offset", page.offset))
            .await
            .context("listing vendors")?;
        response.take::<Vec<VendorProfile>>(0).context("decoding vendors")
    }

    pub(crate) async fn create_item(&self, item: MenuItem) -> Result<(), DatabaseError> {
        self.db
            .query("CREATE menu_item CONTENT $item RETURN NONE")
            .bind(("item", item))
            .await
            .and_then(surrealdb::Response::check)
            .map_err(|e| DatabaseError::from_write(e, "creating menu item"))?;
        Ok(())
    }

    pub(crate) async fn item(&self, id: &str) -> Result<Option<MenuItem>, DatabaseError> {
        let mut response = self
            .db
            .query("SELECT *, record::id(id) AS id FROM ONLY type::thing('menu_item', $id)")
            .bind(("id", id.to_owned()))
            .await
            .context("loading menu item")?;
        response.take::<Option<MenuItem>>(0).context("decoding menu item")
    }

    pub(crate) async fn items(
        &self,
        vendor_id: &str,
        only_available: bool,
    ) -> Result<Vec<MenuItem>, DatabaseError> {
        let filter = if only_available { " AND available = true" } else { "" };
        let mut response = self
            .db
            .query(format!(
                "SELECT *, record::id(id) AS id FROM menu_item WHERE vendorId = $vendor{filter} \
                 ORDER BY createdAt"
            ))
            .bind(("vendor", vendor_id.to_owned()))
            .await
            .context("listing menu")?;
        response.take::<Vec<MenuItem>>(0).context("decoding menu")
    }

    pub(crate) async fn items_by_id(
        &self,
        vendor_id: &str,
        ids: Vec<String>,
    ) -> Result<Vec<MenuItem>, DatabaseError> {
        let mut response = self
            .db
            .query(
                "SELECT *, record::id(id) AS id FROM menu_item \
                 WHERE vendorId = $vendor AND record::id(id) IN $ids",
            )
            .bind(("vendor", vendor_id.to_owned()))
            .bind(("ids", ids))
            .await
            .context("loading order items")?;
        response.take::<Vec<MenuItem>>(0).context("decoding order items")
    }

    pub(crate) async fn update_item(
        &self,
        id: &str,
        patch: MenuItemPatch,
    ) -> Result<(), DatabaseError> {
        self.db
            .query("UPDATE type::thing('menu_item', $id) MERGE $patch RETURN NONE")
            .bind(("id", id.to_owned()))
            .bind(("patch", patch))
            .await
            .and_then(surrealdb::Response::check)
            .context("updating menu item")?;
        Ok(())
    }

    pub(crate) async fn delete_item(&self, id: &str) -> Result<(), DatabaseError> {
        self.db
            .query("DELETE type::thing('menu_item', $id) RETURN NONE")
            .bind(("id", id.to_owned()))
            .await
            .and_then(surrealdb::Response::check)
            .context("deleting menu item")?;
        Ok(())
    }
}
