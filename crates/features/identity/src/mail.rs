use crate::error::IdentityError;
use crate::model::{OtpIssued, OtpPurpose};
use platter_event_bus::{EventBus, EventReceiverExt};
use std::future::Future;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

/// Delivers verification codes to account holders.
pub trait Mailer: Send + Sync + 'static {
    fn send_otp(
        &self,
        email: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> impl Future<Output = Result<(), IdentityError>> + Send;
}

/// Writes deliveries to the log instead of sending mail.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    async fn send_otp(
        &self,
        email: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<(), IdentityError> {
        info!(%email, %code, ?purpose, "Verification code issued");
        Ok(())
    }
}

/// Subscribes to [`OtpIssued`] and hands every event to `mailer`.
///
/// The task ends when the bus shuts down.
///
/// # Errors
/// Fails when the bus already holds an incompatible `OtpIssued` channel.
pub fn spawn_mail_worker<M: Mailer>(
    events: &EventBus,
    mailer: M,
) -> Result<JoinHandle<()>, IdentityError> {
    let mut receiver = events.subscribe::<OtpIssued>().map_err(|e| IdentityError::Internal {
        message: e.to_string().into(),
        context: Some("subscribing mail worker".into()),
    })?;

    Ok(tokio::spawn(async move {
        while let Some(event) = receiver.next_event().await {
            deliver(&mailer, &event).await;
        }
        info!("Mail worker stopped");
    }))
}

#[instrument(skip_all, fields(email = %event.email))]
async fn deliver<M: Mailer>(mailer: &M, event: &OtpIssued) {
    if let Err(e) = mailer.send_otp(&event.email, &event.code, event.purpose).await {
        error!(error = %e, "Failed to deliver verification code");
    }
}
