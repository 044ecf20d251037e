//! Identity feature slice: accounts, email OTP verification and sessions.
//!
//! Registration creates an unverified account and publishes an
//! [`OtpIssued`](model::OtpIssued) event; the mail worker spawned by [`init`]
//! hands it to a [`Mailer`]. Verifying the code or signing in returns a JWT that
//! is also set as an HttpOnly cookie.

mod error;
mod handlers;
mod mail;
pub mod model;
mod otp;
mod password;
mod repository;
mod service;
mod validate;

pub use crate::error::{IdentityError, IdentityErrorExt};
pub use crate::mail::{LogMailer, Mailer, spawn_mail_worker};
pub use crate::service::IdentityService;

use platter_database::{Database, Migration};
use platter_domain::config::ApiConfig;
use platter_event_bus::EventBus;
use platter_kernel::security::token::TokenService;
use platter_kernel::server::state::ApiState;
use tracing::info;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

#[platter_derive::platter_slice]
pub struct Identity {
    pub service: IdentityService,
}

/// Schema owned by this slice.
#[must_use]
pub fn migrations() -> Vec<Migration> {
    vec![Migration::new("identity", "0001", include_str!("../migrations/0001_accounts.surql"))]
}

/// Initializes the slice with the logging mailer.
///
/// # Errors
/// See [`init_with_mailer`].
pub async fn init(
    config: &ApiConfig,
    database: &Database,
    events: &EventBus,
    tokens: &TokenService,
) -> Result<Identity, IdentityError> {
    init_with_mailer(config, database, events, tokens, LogMailer).await
}

/// Initializes the slice, starts the mail worker and creates the configured
/// admin account when it does not exist yet.
///
/// # Errors
/// Fails when the mail worker cannot subscribe or the admin bootstrap fails.
pub async fn init_with_mailer<M: Mailer>(
    config: &ApiConfig,
    database: &Database,
    events: &EventBus,
    tokens: &TokenService,
    mailer: M,
) -> Result<Identity, IdentityError> {
    let service = IdentityService::new(
        database.clone(),
        tokens.clone(),
        events.clone(),
        &config.security.otp,
    );

    spawn_mail_worker(events, mailer)?;

    if let Some(admin) = &config.security.admin
        && service.bootstrap_admin(admin).await?
    {
        info!(email = %admin.email, "Bootstrapped admin account");
    }

    info!("Identity slice initialized");
    Ok(Identity::new(IdentityInner { service }))
}

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::register))
        .routes(routes!(handlers::verify))
        .routes(routes!(handlers::resend))
        .routes(routes!(handlers::login))
        .routes(routes!(handlers::logout))
        .routes(routes!(handlers::me, handlers::update_me))
        .routes(routes!(handlers::change_password))
}
