use crate::error::{CoverageError, CoverageErrorExt};
use crate::model::{ServiceArea, UpsertAreaRequest};
use crate::repository::AreaRepository;
use chrono::Utc;
use platter_database::Database;
use platter_domain::pincode::Pincode;
use platter_kernel::server::pagination::Page;
use tracing::{info, instrument};

const LABEL_MAX: usize = 80;

/// Which pincodes the marketplace serves.
#[derive(Debug, Clone)]
pub struct CoverageService {
    areas: AreaRepository,
}

impl CoverageService {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { areas: AreaRepository::new(db) }
    }

    /// Creates the area or renames and reactivates it. The flag is `true` when
    /// the pincode was not known before.
    ///
    /// # Errors
    /// Validation for empty or overlong labels.
    #[instrument(skip_all, fields(code = %request.code))]
    pub async fn upsert(
        &self,
        request: UpsertAreaRequest,
    ) -> Result<(ServiceArea, bool), CoverageError> {
        let area = label(&request.area, "area")?;
        let city = label(&request.city, "city")?;

        let created = self.areas.find(&request.code).await?.is_none();
        self.areas.upsert(&request.code, area, city, Utc::now()).await.context("upserting area")?;
        info!(created, "Service area saved");

        Ok((self.check(&request.code).await?, created))
    }

    /// # Errors
    /// NotFound for unknown pincodes.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, code: &Pincode) -> Result<ServiceArea, CoverageError> {
        self.check(code).await?;
        self.areas.deactivate(code, Utc::now()).await?;
        info!("Service area deactivated");
        self.check(code).await
    }

    /// Active areas ordered by pincode.
    pub async fn list(&self, page: Page) -> Result<Vec<ServiceArea>, CoverageError> {
        Ok(self.areas.list_active(page).await?)
    }

    /// Looks a pincode up whether or not it is active.
    ///
    /// # Errors
    /// NotFound for unknown pincodes.
    pub async fn check(&self, code: &Pincode) -> Result<ServiceArea, CoverageError> {
        self.areas.find(code).await?.ok_or_else(|| CoverageError::NotFound {
            message: format!("pincode {code} is not covered").into(),
            context: None,
        })
    }

    /// Guard for writes that bind something to a pincode.
    ///
    /// # Errors
    /// Validation "pincode not serviceable" when the area is missing or inactive.
    pub async fn ensure_serviceable(&self, code: &Pincode) -> Result<ServiceArea, CoverageError> {
        match self.areas.find(code).await? {
            Some(area) if area.active => Ok(area),
            _ => Err(CoverageError::not_serviceable()),
        }
    }
}

fn label(raw: &str, field: &'static str) -> Result<String, CoverageError> {
    let value = raw.trim();
    if (1..=LABEL_MAX).contains(&value.chars().count()) {
        Ok(value.to_owned())
    } else {
        Err(CoverageError::validation(format!("{field} must be 1 to {LABEL_MAX} characters")))
    }
}
