use crate::error::{OrderingError, OrderingErrorExt};
use crate::model::{
    DeliveryAddress, Order, OrderLine, OrderStatusChanged, PlaceOrderRequest, TransitionRequest,
};
use crate::pricing;
use crate::repository::{OrderRepository, Scope, StatusChange};
use crate::state::{OrderStatus, may_transition};
use chrono::{DateTime, Utc};
use fxhash::FxHashSet;
use platter_catalog::CatalogService;
use platter_coverage::CoverageService;
use platter_database::{Database, DatabaseError};
use platter_domain::config::MarketplaceConfig;
use platter_domain::phone::normalize_phone;
use platter_domain::pincode::Pincode;
use platter_domain::roles::Role;
use platter_event_bus::EventBus;
use platter_kernel::safe_nanoid;
use platter_kernel::security::session::AuthUser;
use platter_kernel::server::pagination::Page;
use tracing::{error, info, instrument, warn};

const REASON_MAX: usize = 200;
const NOTE_MAX: usize = 500;
const ADDRESS_LINE_MAX: usize = 200;
const CITY_MAX: usize = 80;

/// Order placement, visibility and the status state machine.
#[derive(Debug, Clone)]
pub struct OrderingService {
    orders: OrderRepository,
    catalog: CatalogService,
    coverage: CoverageService,
    events: EventBus,
    marketplace: MarketplaceConfig,
}

impl OrderingService {
    #[must_use]
    pub const fn new(
        db: Database,
        catalog: CatalogService,
        coverage: CoverageService,
        events: EventBus,
        marketplace: MarketplaceConfig,
    ) -> Self {
        Self { orders: OrderRepository::new(db), catalog, coverage, events, marketplace }
    }

    /// Prices and stores a new order for `customer`.
    ///
    /// # Errors
    /// * NotFound for an unknown vendor.
    /// * Validation for a closed vendor, bad lines, an unserviceable or
    ///   mismatched pincode and unavailable items.
    #[instrument(skip_all, fields(customer = %customer.id, vendor = %request.vendor_id))]
    pub async fn place(
        &self,
        customer: &AuthUser,
        request: PlaceOrderRequest,
    ) -> Result<Order, OrderingError> {
        self.check_lines(&request)?;
        let address = address(request.delivery_address)?;
        let note = bounded(request.note.as_deref(), "note", NOTE_MAX)?;

        let vendor = self
            .catalog
            .vendor(&request.vendor_id)
            .await?
            .ok_or_else(|| OrderingError::not_found("vendor not found"))?;
        if !vendor.is_open {
            return Err(OrderingError::validation("vendor is not accepting orders"));
        }
        self.coverage.ensure_serviceable(&address.pincode).await?;
        if address.pincode != vendor.pincode {
            return Err(OrderingError::validation("vendor does not deliver to this pincode"));
        }

        let ids: Vec<String> = request.items.iter().map(|l| l.menu_item_id.clone()).collect();
        let menu = self.catalog.items_for_order(&vendor.id, &ids).await?;
        let mut lines = Vec::with_capacity(request.items.len());
        for requested in &request.items {
            let item = menu
                .iter()
                .find(|item| item.id == requested.menu_item_id && item.available)
                .ok_or_else(|| {
                    OrderingError::validation(format!(
                        "menu item {} is not available",
                        requested.menu_item_id
                    ))
                })?;
            lines.push(OrderLine {
                menu_item_id: item.id.clone(),
                name: item.name.clone(),
                unit_price: item.price,
                quantity: requested.quantity,
                line_total: pricing::line_total(item.price, requested.quantity)?,
            });
        }
        let quote = pricing::quote(&lines, &self.marketplace)?;

        let now = Utc::now();
        let order = Order {
            id: safe_nanoid!(),
            customer_id: customer.id.clone(),
            vendor_id: vendor.id,
            vendor_name: vendor.name,
            items: lines,
            subtotal: quote.subtotal,
            delivery_fee: quote.delivery_fee,
            total: quote.total,
            pincode: address.pincode.clone(),
            delivery_address: address,
            status: OrderStatus::Placed,
            partner_id: None,
            note,
            reason: None,
            created_at: now,
            updated_at: now,
        };
        self.orders.create(order.clone()).await.context("placing order")?;
        info!(order = %order.id, total = order.total, "Order placed");

        self.announce(&order.id, None, OrderStatus::Placed, customer, now);
        Ok(order)
    }

    /// # Errors
    /// NotFound when the order does not exist or the viewer may not see it.
    pub async fn get(&self, viewer: &AuthUser, id: &str) -> Result<Order, OrderingError> {
        match self.orders.find(id).await? {
            Some(order) if visible(&order, viewer) => Ok(order),
            _ => Err(OrderingError::not_found("order not found")),
        }
    }

    /// Orders the viewer may see, newest first.
    pub async fn list(
        &self,
        viewer: &AuthUser,
        status: Option<OrderStatus>,
        page: Page,
    ) -> Result<Vec<Order>, OrderingError> {
        Ok(self.orders.list(Scope::of(viewer.role, &viewer.id), status, page).await?)
    }

    /// Moves an order to `request.status` on behalf of `actor`.
    ///
    /// The write is conditioned on the status the order had when it was read
    /// (and, for partners, on the assignment), so of two concurrent moves at
    /// most one applies.
    ///
    /// # Errors
    /// * NotFound when the actor cannot see the order.
    /// * Conflict when the move is not allowed or the order changed meanwhile.
    /// * Validation for a misplaced or overlong reason.
    #[instrument(skip_all, fields(order = %id, actor = %actor.id, to = %request.status))]
    pub async fn transition(
        &self,
        actor: &AuthUser,
        id: &str,
        request: TransitionRequest,
    ) -> Result<Order, OrderingError> {
        let order = self.get(actor, id).await?;
        let (from, to) = (order.status, request.status);

        if !may_transition(actor.role, from, to) {
            return Err(OrderingError::conflict(format!("cannot move order from {from} to {to}")));
        }
        let reason = bounded(request.reason.as_deref(), "reason", REASON_MAX)?;
        if reason.is_some() && !to.takes_reason() {
            return Err(OrderingError::validation(
                "a reason can only be given when rejecting or cancelling",
            ));
        }

        let at = Utc::now();
        let change = StatusChange {
            id,
            from,
            to,
            reason,
            partner: (actor.role == Role::Partner).then_some(actor.id.as_str()),
            at,
        };
        if !self.orders.change_status(change).await.map_err(lost_race)? {
            warn!(%from, "Status changed concurrently");
            return Err(OrderingError::conflict("order was updated by someone else; reload it"));
        }
        info!(%from, "Order status changed");

        self.announce(id, Some(from), to, actor, at);
        self.get(actor, id).await
    }

    /// Unassigned orders in `pincode` a partner could claim, oldest first.
    pub async fn claimable(
        &self,
        pincode: &Pincode,
        page: Page,
    ) -> Result<Vec<Order>, OrderingError> {
        Ok(self.orders.unassigned(pincode, page).await?)
    }

    /// Assigns an order in `area` to `partner` unless someone else got it first.
    ///
    /// # Errors
    /// * NotFound for unknown orders.
    /// * Validation when the order is outside `area`.
    /// * Conflict when the order is assigned or no longer assignable.
    #[instrument(skip(self, partner), fields(partner = %partner.id))]
    pub async fn assign(
        &self,
        partner: &AuthUser,
        id: &str,
        area: &Pincode,
    ) -> Result<Order, OrderingError> {
        if !self.orders.assign(id, &partner.id, area, Utc::now()).await.map_err(lost_race)? {
            return match self.orders.find(id).await? {
                None => Err(OrderingError::not_found("order not found")),
                Some(order) if order.pincode != *area => {
                    Err(OrderingError::validation("order is outside your delivery area"))
                },
                Some(_) => Err(OrderingError::conflict("order is no longer available")),
            };
        }
        info!("Order assigned");
        self.get(partner, id).await
    }

    /// Returns an assigned order to the pool before pickup.
    ///
    /// # Errors
    /// NotFound unless the partner holds the order, Conflict once it was picked up.
    #[instrument(skip(self, partner), fields(partner = %partner.id))]
    pub async fn release(&self, partner: &AuthUser, id: &str) -> Result<Order, OrderingError> {
        let order = self.get(partner, id).await?;
        if !order.status.is_assignable()
            || !self.orders.unassign(id, &partner.id, Utc::now()).await.map_err(lost_race)?
        {
            return Err(OrderingError::conflict(format!(
                "an order that is {} cannot be released",
                order.status
            )));
        }
        info!("Order released");
        self.orders
            .find(id)
            .await?
            .ok_or_else(|| OrderingError::not_found("order not found"))
    }

    /// The order a partner is currently responsible for.
    pub async fn active_delivery(&self, partner_id: &str) -> Result<Option<Order>, OrderingError> {
        Ok(self.orders.active_for_partner(partner_id).await?)
    }

    fn check_lines(&self, request: &PlaceOrderRequest) -> Result<(), OrderingError> {
        let max_lines = self.marketplace.max_lines_per_order;
        if request.items.is_empty() || request.items.len() > max_lines {
            return Err(OrderingError::validation(format!(
                "an order needs 1 to {max_lines} items"
            )));
        }

        let max_quantity = self.marketplace.max_quantity_per_item;
        let mut seen = FxHashSet::default();
        for line in &request.items {
            if !seen.insert(line.menu_item_id.as_str()) {
                return Err(OrderingError::validation(format!(
                    "menu item {} is listed twice",
                    line.menu_item_id
                )));
            }
            if !(1..=max_quantity).contains(&line.quantity) {
                return Err(OrderingError::validation(format!(
                    "quantity must be 1 to {max_quantity}"
                )));
            }
        }
        Ok(())
    }

    fn announce(
        &self,
        order_id: &str,
        from: Option<OrderStatus>,
        to: OrderStatus,
        actor: &AuthUser,
        at: DateTime<Utc>,
    ) {
        let event = OrderStatusChanged {
            order_id: order_id.to_owned(),
            from,
            to,
            actor_id: actor.id.clone(),
            actor_role: actor.role,
            at,
        };
        if let Err(e) = self.events.publish(event) {
            error!(error = %e, order = order_id, "Failed to publish status change");
        }
    }
}

/// Who may see an order.
#[must_use]
pub(crate) fn visible(order: &Order, viewer: &AuthUser) -> bool {
    match viewer.role {
        Role::Admin => true,
        Role::Customer => order.customer_id == viewer.id,
        Role::Vendor => order.vendor_id == viewer.id,
        Role::Partner => order.partner_id.as_deref() == Some(viewer.id.as_str()),
    }
}

fn lost_race(err: DatabaseError) -> OrderingError {
    if err.is_conflict() {
        OrderingError::conflict("order was updated by someone else; reload it")
    } else {
        err.into()
    }
}

fn bounded(raw: Option<&str>, field: &str, max: usize) -> Result<Option<String>, OrderingError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) if value.chars().count() <= max => Ok(Some(value.to_owned())),
        Some(_) => Err(OrderingError::validation(format!("{field} is over {max} characters"))),
    }
}

fn required(raw: &str, field: &str, max: usize) -> Result<String, OrderingError> {
    match bounded(Some(raw), field, max)? {
        Some(value) => Ok(value),
        None => Err(OrderingError::validation(format!("{field} is required"))),
    }
}

fn address(raw: DeliveryAddress) -> Result<DeliveryAddress, OrderingError> {
    let phone = normalize_phone(&raw.phone)
        .ok_or_else(|| OrderingError::validation("phone must have 10 to 15 digits"))?;

    Ok(DeliveryAddress {
        line1: required(&raw.line1, "line1", ADDRESS_LINE_MAX)?,
        line2: bounded(raw.line2.as_deref(), "line2", ADDRESS_LINE_MAX)?,
        city: required(&raw.city, "city", CITY_MAX)?,
        pincode: raw.pincode,
        phone,
    })
}
