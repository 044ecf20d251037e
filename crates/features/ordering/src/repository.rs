use crate::model::Order;
use crate::state::OrderStatus;
use chrono::{DateTime, Utc};
use platter_database::{Database, DatabaseError, DatabaseErrorExt};
use platter_domain::pincode::Pincode;
use platter_domain::roles::Role;
use platter_kernel::server::pagination::Page;

const SELECT: &str = "SELECT *, record::id(id) AS id FROM orders";

/// Which orders a listing may return.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Scope<'a> {
    All,
    Customer(&'a str),
    Vendor(&'a str),
    Partner(&'a str),
}

impl<'a> Scope<'a> {
    pub(crate) const fn of(role: Role, id: &'a str) -> Self {
        match role {
            Role::Customer => Self::Customer(id),
            Role::Vendor => Self::Vendor(id),
            Role::Partner => Self::Partner(id),
            Role::Admin => Self::All,
        }
    }

    const fn filter(self) -> Option<(&'static str, &'a str)> {
        match self {
            Self::All => None,
            Self::Customer(id) => Some(("customerId", id)),
            Self::Vendor(id) => Some(("vendorId", id)),
            Self::Partner(id) => Some(("partnerId", id)),
        }
    }
}

/// A status change applied only if the order still matches.
#[derive(Debug)]
pub(crate) struct StatusChange<'a> {
    pub id: &'a str,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub reason: Option<String>,
    /// Also require this partner to be assigned.
    pub partner: Option<&'a str>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub(crate) struct OrderRepository {
    db: Database,
}

impl OrderRepository {
    pub(crate) const fn new(db: Database) -> Self {
        Self { db }
    }

    pub(crate) async fn create(&self, order: Order) -> Result<(), DatabaseError> {
        self.db
            .query("CREATE orders CONTENT $order RETURN NONE")
            .bind(("order", order))
            .await
            .and_then(surrealdb::Response::check)
            .map_err(|e| DatabaseError::from_write(e, "creating order"))?;
        Ok(())
    }

    pub(crate) async fn find(&self, id: &str) -> Result<Option<Order>, DatabaseError> {
        let mut response = self
            .db
            .query("SELECT *, record::id(id) AS id FROM ONLY type::thing('orders', $id)")
            .bind(("id", id.to_owned()))
            .await
            .context("loading order")?;
        response.take::<Option<Order>>(0).context("decoding order")
    }

    /// Newest first.
    pub(crate) async fn list(
        &self,
        scope: Scope<'_>,
        status: Option<OrderStatus>,
        page: Page,
    ) -> Result<Vec<Order>, DatabaseError> {
        let mut conditions = Vec::with_capacity(2);
        if let Some((field, _)) = scope.filter() {
            conditions.push(format!("{field} = $owner"));
        }
        if status.is_some() {
            conditions.push("status = $status".to_owned());
        }
        let filter = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let mut response = self
            .db
            .query(format!(
                "{SELECT}{filter} ORDER BY createdAt DESC LIMIT $limit START $offset"
            ))
            .bind(("owner", scope.filter().map(|(_, id)| id.to_owned())))
            .bind(("status", status))
            .bind(("limit", page.limit))
            .bind(("offset", page.offset))
            .await
            .context("listing orders")?;
        response.take::<Vec<Order>>(0).context("decoding orders")
    }

    /// Compare-and-set on `status`. Returns whether the row changed.
    pub(crate) async fn change_status(&self, change: StatusChange<'_>) -> Result<bool, DatabaseError> {
        let partner_guard = if change.partner.is_some() { " AND partnerId = $partner" } else { "" };
        let mut response = self
            .db
            .query(format!(
                "LET $hit = (UPDATE type::thing('orders', $id) \
                 SET status = $to, reason = $reason ?? reason, updatedAt = $at \
                 WHERE status = $from{partner_guard} RETURN VALUE id); \
                 RETURN array::len($hit);"
            ))
            .bind(("id", change.id.to_owned()))
            .bind(("from", change.from))
            .bind(("to", change.to))
            .bind(("reason", change.reason))
            .bind(("partner", change.partner.map(str::to_owned)))
            .bind(("at", change.at.timestamp_millis()))
            .await
            .and_then(surrealdb::Response::check)
            .map_err(|e| DatabaseError::from_write(e, "changing order status"))?;
        Ok(response.take::<Option<usize>>(1).context("reading status change")?.unwrap_or(0) == 1)
    }

    /// Claims an unassigned order in `area` for `partner` while its status
    /// is assignable.
    pub(crate) async fn assign(
        &self,
        id: &str,
        partner: &str,
        area: &Pincode,
        at: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        let mut response = self
            .db
            .query(
                "LET $hit = (UPDATE type::thing('orders', $id) SET partnerId = $partner, updatedAt = $at \
                 WHERE !partnerId AND pincode = $area AND status IN $assignable RETURN VALUE id); \
                 RETURN array::len($hit);",
            )
            .bind(("id", id.to_owned()))
            .bind(("partner", partner.to_owned()))
            .bind(("area", area.as_str().to_owned()))
            .bind(("assignable", OrderStatus::ASSIGNABLE.to_vec()))
            .bind(("at", at.timestamp_millis()))
            .await
            .and_then(surrealdb::Response::check)
            .map_err(|e| DatabaseError::from_write(e, "assigning order"))?;
        Ok(response.take::<Option<usize>>(1).context("reading assignment")?.unwrap_or(0) == 1)
    }

    /// Gives an order back while it is still assignable.
    pub(crate) async fn unassign(
        &self,
        id: &str,
        partner: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        let mut response = self
            .db
            .query(
                "LET $hit = (UPDATE type::thing('orders', $id) SET partnerId = NONE, updatedAt = $at \
                 WHERE partnerId = $partner AND status IN $assignable RETURN VALUE id); \
                 RETURN array::len($hit);",
            )
            .bind(("id", id.to_owned()))
            .bind(("partner", partner.to_owned()))
            .bind(("assignable", OrderStatus::ASSIGNABLE.to_vec()))
            .bind(("at", at.timestamp_millis()))
            .await
            .and_then(surrealdb::Response::check)
            .map_err(|e| DatabaseError::from_write(e, "releasing order"))?;
        Ok(response.take::<Option<usize>>(1).context("reading release")?.unwrap_or(0) == 1)
    }

    /// Unassigned orders in `pincode` waiting for a partner, oldest first.
    pub(crate) async fn unassigned(
        &self,
        pincode: &Pincode,
        page: Page,
    ) -> Result<Vec<Order>, DatabaseError> {
        let mut response = self
            .db
            .query(format!(
                "{SELECT} WHERE pincode = $pincode AND status IN $assignable AND !partnerId \
                 ORDER BY createdAt ASC LIMIT $limit START $offset"
            ))
            .bind(("pincode", pincode.as_str().to_owned()))
            .bind(("assignable", OrderStatus::ASSIGNABLE.to_vec()))
            .bind(("limit", page.limit))
            .bind(("offset", page.offset))
            .await
            .context("listing unassigned orders")?;
        response.take::<Vec<Order>>(0).context("decoding unassigned orders")
    }

    /// The partner's assigned order that is not finished yet, if any.
    pub(crate) async fn active_for_partner(
        &self,
        partner: &str,
    ) -> Result<Option<Order>, DatabaseError> {
        let mut response = self
            .db
            .query(format!(
                "{SELECT} WHERE partnerId = $partner AND status NOT IN $terminal \
                 ORDER BY createdAt ASC LIMIT 1"
            ))
            .bind(("partner", partner.to_owned()))
            .bind(("terminal", OrderStatus::TERMINAL.to_vec()))
            .await
            .context("loading active delivery")?;
        response.take::<Option<Order>>(0).context("decoding active delivery")
    }
}
