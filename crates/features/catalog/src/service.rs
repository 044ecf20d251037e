use crate::error::{CatalogError, CatalogErrorExt};
use crate::model::{
    CreateMenuItemRequest, MenuItem, MenuItemPatch, Storefront, UpdateMenuItemRequest,
    UpsertProfileRequest, VendorProfile,
};
use crate::repository::{CatalogRepository, ProfileFields};
use chrono::Utc;
use platter_coverage::CoverageService;
use platter_database::Database;
use platter_domain::pincode::Pincode;
use platter_kernel::safe_nanoid;
use platter_kernel::server::pagination::Page;
use tracing::{info, instrument};

const NAME_MAX: usize = 80;
const DESCRIPTION_MAX: usize = 500;
const ADDRESS_MAX: usize = 200;
const CUISINE_MAX: usize = 40;
const CUISINES_MAX: usize = 10;

/// Vendor storefronts and their menus.
#[derive(Debug, Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
    coverage: CoverageService,
}

impl CatalogService {
    #[must_use]
    pub const fn new(db: Database, coverage: CoverageService) -> Self {
        Self { repo: CatalogRepository::new(db), coverage }
    }

    /// Creates or replaces the storefront of `vendor_id`.
    ///
    /// # Errors
    /// Validation for bad fields or an unserviceable pincode.
    #[instrument(skip(self, request))]
    pub async fn upsert_profile(
        &self,
        vendor_id: &str,
        request: UpsertProfileRequest,
    ) -> Result<VendorProfile, CatalogError> {
        let fields = ProfileFields {
            name: text(&request.name, "name", NAME_MAX)?,
            description: optional_text(request.description.as_deref(), DESCRIPTION_MAX)?,
            cuisines: cuisines(&request.cuisines)?,
            address: text(&request.address, "address", ADDRESS_MAX)?,
            is_open: request.is_open.unwrap_or(true),
            pincode: request.pincode,
        };
        self.coverage.ensure_serviceable(&fields.pincode).await?;

        self.repo.upsert_vendor(vendor_id, fields, Utc::now()).await.context("saving profile")?;
        info!("Vendor profile saved");
        self.own_profile(vendor_id).await
    }

    /// # Errors
    /// NotFound until the vendor has set up a profile.
    pub async fn own_profile(&self, vendor_id: &str) -> Result<VendorProfile, CatalogError> {
        self.repo
            .vendor(vendor_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("set up your vendor profile first"))
    }

    pub async fn vendor(&self, vendor_id: &str) -> Result<Option<VendorProfile>, CatalogError> {
        Ok(self.repo.vendor(vendor_id).await?)
    }

    /// # Errors
    /// Validation when the vendor has no profile or the fields are invalid.
    #[instrument(skip(self, request))]
    pub async fn create_item(
        &self,
        vendor_id: &str,
        request: CreateMenuItemRequest,
    ) -> Result<MenuItem, CatalogError> {
        if self.repo.vendor(vendor_id).await?.is_none() {
            return Err(CatalogError::validation(
                "set up your vendor profile before adding menu items",
            ));
        }

        let now = Utc::now();
        let item = MenuItem {
            id: safe_nanoid!(),
            vendor_id: vendor_id.to_owned(),
            name: text(&request.name, "name", NAME_MAX)?,
            description: optional_text(request.description.as_deref(), DESCRIPTION_MAX)?,
            price: price(request.price)?,
            vegetarian: request.vegetarian,
            available: request.available.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        self.repo.create_item(item.clone()).await?;
        info!(item = %item.id, "Menu item created");
        Ok(item)
    }

    /// Every item of the vendor, available or not.
    pub async fn own_menu(&self, vendor_id: &str) -> Result<Vec<MenuItem>, CatalogError> {
        Ok(self.repo.items(vendor_id, false).await?)
    }

    /// # Errors
    /// NotFound when the item does not exist or belongs to another vendor.
    #[instrument(skip(self, request))]
    pub async fn update_item(
        &self,
        vendor_id: &str,
        item_id: &str,
        request: UpdateMenuItemRequest,
    ) -> Result<MenuItem, CatalogError> {
        self.own_item(vendor_id, item_id).await?;

        let patch = MenuItemPatch {
            name: request.name.as_deref().map(|n| text(n, "name", NAME_MAX)).transpose()?,
            description: optional_text(request.description.as_deref(), DESCRIPTION_MAX)?,
            price: request.price.map(price).transpose()?,
            vegetarian: request.vegetarian,
            available: request.available,
            updated_at: Utc::now(),
        };
        self.repo.update_item(item_id, patch).await?;
        self.own_item(vendor_id, item_id).await
    }

    /// # Errors
    /// NotFound when the item does not exist or belongs to another vendor.
    #[instrument(skip(self))]
    pub async fn delete_item(&self, vendor_id: &str, item_id: &str) -> Result<(), CatalogError> {
        self.own_item(vendor_id, item_id).await?;
        self.repo.delete_item(item_id).await?;
        info!("Menu item deleted");
        Ok(())
    }

    /// Open vendors delivering to `pincode`, by name.
    pub async fn list_vendors(
        &self,
        pincode: &Pincode,
        page: Page,
    ) -> Result<Vec<VendorProfile>, CatalogError> {
        Ok(self.repo.open_vendors(pincode, page).await?)
    }

    /// # Errors
    /// NotFound for unknown vendors.
    pub async fn storefront(&self, vendor_id: &str) -> Result<Storefront, CatalogError> {
        let vendor = self
            .repo
            .vendor(vendor_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("vendor not found"))?;
        let menu = self.repo.items(vendor_id, true).await?;
        Ok(Storefront { vendor, menu })
    }

    /// Items of `vendor_id` among `ids`. Unknown and foreign ids are left out.
    pub async fn items_for_order(
        &self,
        vendor_id: &str,
        ids: &[String],
    ) -> Result<Vec<MenuItem>, CatalogError> {
        Ok(self.repo.items_by_id(vendor_id, ids.to_vec()).await?)
    }

    async fn own_item(&self, vendor_id: &str, item_id: &str) -> Result<MenuItem, CatalogError> {
        match self.repo.item(item_id).await? {
            Some(item) if item.vendor_id == vendor_id => Ok(item),
            _ => Err(CatalogError::not_found("menu item not found")),
        }
    }
}

fn text(raw: &str, field: &str, max: usize) -> Result<String, CatalogError> {
    let value = raw.trim();
    if (1..=max).contains(&value.chars().count()) {
        Ok(value.to_owned())
    } else {
        Err(CatalogError::validation(format!("{field} must be 1 to {max} characters")))
    }
}

/// Blank descriptions are dropped.
fn optional_text(raw: Option<&str>, max: usize) -> Result<Option<String>, CatalogError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) if value.chars().count() <= max => Ok(Some(value.to_owned())),
        Some(_) => Err(CatalogError::validation(format!("description is over {max} characters"))),
    }
}

fn price(paise: u64) -> Result<u64, CatalogError> {
    if paise == 0 {
        Err(CatalogError::validation("price must be greater than zero"))
    } else {
        Ok(paise)
    }
}

/// Trims, lowercases and de-duplicates.
fn cuisines(raw: &[String]) -> Result<Vec<String>, CatalogError> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for label in raw {
        let label = label.trim().to_lowercase();
        if label.is_empty() || label.chars().count() > CUISINE_MAX {
            return Err(CatalogError::validation(format!(
                "cuisine labels must be 1 to {CUISINE_MAX} characters"
            )));
        }
        if !out.contains(&label) {
            out.push(label);
        }
    }
    if out.len() > CUISINES_MAX {
        return Err(CatalogError::validation(format!("at most {CUISINES_MAX} cuisines")));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuisines_are_normalized() {
        let raw = vec![" South Indian ".to_owned(), "south indian".to_owned(), "Chaat".to_owned()];
        assert_eq!(cuisines(&raw).unwrap(), ["south indian", "chaat"]);
        assert!(cuisines(&[" ".to_owned()]).is_err());

        let many: Vec<String> = (0..11).map(|i| format!("c{i}")).collect();
        assert!(cuisines(&many).is_err());
    }

    #[test]
    fn blank_descriptions_are_dropped() {
        assert_eq!(optional_text(Some("   "), 10).unwrap(), None);
        assert_eq!(optional_text(Some(" hot "), 10).unwrap().as_deref(), Some("hot"));
        assert!(optional_text(Some("x".repeat(11).as_str()), 10).is_err());
    }

    #[test]
    fn zero_price_is_rejected() {
        assert!(price(0).is_err());
        assert_eq!(price(12_500).unwrap(), 12_500);
    }
}
