use crate::error::{DispatchError, DispatchErrorExt};
use crate::model::{PartnerProfile, UpsertPartnerRequest};
use crate::repository::PartnerRepository;
use chrono::Utc;
use platter_coverage::CoverageService;
use platter_database::{Database, DatabaseError};
use platter_domain::phone::normalize_phone;
use platter_kernel::security::session::AuthUser;
use platter_kernel::server::pagination::Page;
use platter_ordering::OrderingService;
use platter_ordering::model::{Order, TransitionRequest};
use platter_ordering::state::OrderStatus;
use tracing::{info, instrument};

/// Partner profiles, availability and the partner side of the order flow.
#[derive(Debug, Clone)]
pub struct DispatchService {
    partners: PartnerRepository,
    ordering: OrderingService,
    coverage: CoverageService,
}

impl DispatchService {
    #[must_use]
    pub const fn new(db: Database, ordering: OrderingService, coverage: CoverageService) -> Self {
        Self { partners: PartnerRepository::new(db), ordering, coverage }
    }

    /// # Errors
    /// Validation for a bad phone number or an unserviceable pincode.
    #[instrument(skip(self, request))]
    pub async fn upsert_profile(
        &self,
        partner_id: &str,
        request: UpsertPartnerRequest,
    ) -> Result<PartnerProfile, DispatchError> {
        let phone = normalize_phone(&request.phone)
            .ok_or_else(|| DispatchError::validation("phone must have 10 to 15 digits"))?;
        self.coverage.ensure_serviceable(&request.pincode).await?;

        let vehicle = request.vehicle;
        self.partners
            .upsert(partner_id, vehicle, request.pincode, phone, Utc::now())
            .await
            .context("saving partner profile")?;
        info!(%vehicle, "Partner profile saved");
        self.profile(partner_id).await
    }

    /// # Errors
    /// NotFound until the partner has set up a profile.
    pub async fn profile(&self, partner_id: &str) -> Result<PartnerProfile, DispatchError> {
        self.partners.find(partner_id).await?.ok_or_else(DispatchError::no_profile)
    }

    /// # Errors
    /// Conflict when going offline while a delivery is still open.
    #[instrument(skip(self))]
    pub async fn set_availability(
        &self,
        partner_id: &str,
        online: bool,
    ) -> Result<PartnerProfile, DispatchError> {
        let profile = self.profile(partner_id).await?;
        if profile.online == online {
            return Ok(profile);
        }

        let changed =
            self.partners.set_online(partner_id, online, Utc::now()).await.map_err(lost_race)?;
        if !changed {
            return Err(DispatchError::conflict("finish your active delivery before going offline"));
        }
        info!(online, "Partner availability changed");
        self.profile(partner_id).await
    }

    /// Unassigned orders in the partner's area, oldest first.
    pub async fn available_orders(
        &self,
        partner: &AuthUser,
        page: Page,
    ) -> Result<Vec<Order>, DispatchError> {
        let profile = self.online_profile(&partner.id).await?;
        Ok(self.ordering.claimable(&profile.pincode, page).await?)
    }

    /// Claims an order. Of two partners racing for one order exactly one wins,
    /// and a partner racing for two orders gets at most one.
    ///
    /// # Errors
    /// Conflict when offline, already busy with a delivery, or beaten to it.
    #[instrument(skip(self, partner), fields(partner = %partner.id))]
    pub async fn accept(&self, partner: &AuthUser, order_id: &str) -> Result<Order, DispatchError> {
        let profile = self.online_profile(&partner.id).await?;
        if !self.partners.take_slot(&partner.id, order_id, Utc::now()).await.map_err(lost_race)? {
            return Err(self.slot_refused(&partner.id).await?);
        }

        match self.ordering.assign(partner, order_id, &profile.pincode).await {
            Ok(order) => Ok(order),
            Err(e) => {
                self.partners.free_slot(&partner.id, order_id, Utc::now()).await?;
                Err(e.into())
            },
        }
    }

    /// # Errors
    /// Conflict once the order was picked up.
    pub async fn release(&self, partner: &AuthUser, order_id: &str) -> Result<Order, DispatchError> {
        let order = self.ordering.release(partner, order_id).await?;
        self.partners.free_slot(&partner.id, order_id, Utc::now()).await?;
        Ok(order)
    }

    pub async fn pickup(&self, partner: &AuthUser, order_id: &str) -> Result<Order, DispatchError> {
        self.advance(partner, order_id, OrderStatus::OutForDelivery).await
    }

    pub async fn deliver(&self, partner: &AuthUser, order_id: &str) -> Result<Order, DispatchError> {
        self.advance(partner, order_id, OrderStatus::Delivered).await
    }

    /// Orders assigned to the partner, newest first.
    pub async fn my_deliveries(
        &self,
        partner: &AuthUser,
        status: Option<OrderStatus>,
        page: Page,
    ) -> Result<Vec<Order>, DispatchError> {
        Ok(self.ordering.list(partner, status, page).await?)
    }

    async fn advance(
        &self,
        partner: &AuthUser,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<Order, DispatchError> {
        let request = TransitionRequest { status, reason: None };
        Ok(self.ordering.transition(partner, order_id, request).await?)
    }

    /// Explains why the slot could not be taken.
    async fn slot_refused(&self, partner_id: &str) -> Result<DispatchError, DispatchError> {
        if !self.profile(partner_id).await?.online {
            return Ok(DispatchError::conflict("go online to take orders"));
        }
        Ok(match self.ordering.active_delivery(partner_id).await? {
            Some(active) => {
                DispatchError::conflict(format!("finish order {} before accepting another", active.id))
            },
            None => DispatchError::conflict("another claim of yours is in progress"),
        })
    }

    async fn online_profile(&self, partner_id: &str) -> Result<PartnerProfile, DispatchError> {
        let profile = self.profile(partner_id).await?;
        if !profile.online {
            return Err(DispatchError::conflict("go online to take orders"));
        }
        Ok(profile)
    }
}

fn lost_race(err: DatabaseError) -> DispatchError {
    if err.is_conflict() {
        DispatchError::conflict("your availability changed at the same time; try again")
    } else {
        err.into()
    }
}
