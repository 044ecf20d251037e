//! Facade over the Platter feature slices.
//!
//! Composes slices; business logic lives in the slices themselves. The server
//! calls [`migrations`] when connecting the database, then [`init`] and
//! [`router`].

use platter_database::{Database, Migration};
use platter_domain::config::ApiConfig;
use platter_domain::registry::InitializedSlice;
use platter_event_bus::EventBus;
use platter_kernel::security::token::TokenService;
use platter_kernel::server::state::ApiState;
use std::borrow::Cow;
use tracing::info;
use utoipa_axum::router::OpenApiRouter;

pub use platter_domain as domain;
pub use platter_kernel as kernel;

pub mod features {
    pub use platter_audit as audit;
    pub use platter_catalog as catalog;
    pub use platter_coverage as coverage;
    pub use platter_dispatch as dispatch;
    pub use platter_identity as identity;
    pub use platter_ordering as ordering;

    /// Slice names, in initialization order.
    pub const ENABLED: &[&str] =
        &["identity", "coverage", "catalog", "ordering", "dispatch", "audit"];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

#[platter_derive::platter_error]
pub enum PlatterError {
    #[error("Identity bootstrap failed{}: {source}", format_context(.context))]
    Identity { source: features::identity::IdentityError, context: Option<Cow<'static, str>> },

    #[error("Audit bootstrap failed{}: {source}", format_context(.context))]
    Audit { source: features::audit::AuditError, context: Option<Cow<'static, str>> },
}

/// Every slice's schema, dependencies first.
#[must_use]
pub fn migrations() -> Vec<Migration> {
    [
        features::identity::migrations(),
        features::coverage::migrations(),
        features::catalog::migrations(),
        features::ordering::migrations(),
        features::dispatch::migrations(),
        features::audit::migrations(),
    ]
    .concat()
}

/// Initializes all slices and starts their background workers.
///
/// # Errors
/// Fails when a worker cannot subscribe to the bus or the admin bootstrap fails.
pub async fn init(
    config: &ApiConfig,
    database: &Database,
    events: &EventBus,
    tokens: &TokenService,
) -> Result<Vec<InitializedSlice>, PlatterError> {
    let identity = features::identity::init(config, database, events, tokens)
        .await
        .context("identity")?;
    let coverage = features::coverage::init(database);
    let catalog = features::catalog::init(database, &coverage.service);
    let ordering =
        features::ordering::init(config, database, events, &catalog.service, &coverage.service);
    let dispatch = features::dispatch::init(database, &ordering.service, &coverage.service);
    let audit = features::audit::init(database, events, &ordering.service).context("audit")?;

    info!(slices = features::ENABLED.len(), "Feature slices initialized");
    Ok(vec![
        InitializedSlice::new(identity),
        InitializedSlice::new(coverage),
        InitializedSlice::new(catalog),
        InitializedSlice::new(ordering),
        InitializedSlice::new(dispatch),
        InitializedSlice::new(audit),
    ])
}

/// System routes plus every slice's routes.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .merge(platter_kernel::server::router::system_router())
        .merge(features::identity::router())
        .merge(features::coverage::router())
        .merge(features::catalog::router())
        .merge(features::ordering::router())
        .merge(features::dispatch::router())
        .merge(features::audit::router())
}
