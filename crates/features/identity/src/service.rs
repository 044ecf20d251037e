use crate::error::{IdentityError, IdentityErrorExt};
use crate::model::{
    Account, AccountPatch, AccountRecord, ChangePasswordRequest, LoginRequest, OtpIssued,
    OtpPurpose, PendingVerification, RegisterRequest, ResendRequest, ResendResponse, Session,
    UpdateProfileRequest, VerifyRequest,
};
use crate::otp::OtpStore;
use crate::repository::AccountRepository;
use crate::{password, validate};
use chrono::Utc;
use platter_database::Database;
use platter_domain::config::{AdminConfig, OtpConfig};
use platter_domain::roles::Role;
use platter_event_bus::EventBus;
use platter_kernel::safe_nanoid;
use platter_kernel::security::token::TokenService;
use tracing::{info, instrument, warn};

const BAD_CREDENTIALS: &str = "invalid email or password";

/// Account lifecycle: registration, verification, sign-in and profile edits.
#[derive(Debug, Clone)]
pub struct IdentityService {
    accounts: AccountRepository,
    otp: OtpStore,
    tokens: TokenService,
    events: EventBus,
}

impl IdentityService {
    #[must_use]
    pub fn new(db: Database, tokens: TokenService, events: EventBus, otp: &OtpConfig) -> Self {
        Self { accounts: AccountRepository::new(db), otp: OtpStore::new(otp), tokens, events }
    }

    /// Creates an unverified account and emails a code.
    ///
    /// # Errors
    /// Validation for bad input or an `admin` role, Conflict for a taken email.
    #[instrument(skip_all, fields(role = %request.role))]
    pub async fn register(
        &self,
        request: RegisterRequest,
    ) -> Result<PendingVerification, IdentityError> {
        if !request.role.is_self_service() {
            return Err(IdentityError::validation("admin accounts cannot be registered"));
        }
        let email = validate::email(&request.email)?;
        let name = validate::name(&request.name)?;
        validate::password(&request.password)?;
        let phone = request.phone.as_deref().map(validate::phone).transpose()?;

        let now = Utc::now();
        let record = AccountRecord {
            id: safe_nanoid!(),
            name,
            email,
            phone,
            role: request.role,
            verified: false,
            password_hash: password::hash(request.password).await?,
            created_at: now,
            updated_at: now,
        };

        match self.accounts.create(record.clone()).await {
            Err(e) if e.is_conflict() => {
                return Err(IdentityError::Conflict {
                    message: "an account with this email already exists".into(),
                    context: None,
                });
            },
            other => other.context("registering account")?,
        }
        info!(account = %record.id, "Account registered");

        self.send_code(&record.email, OtpPurpose::Registration).await?;
        Ok(PendingVerification { account: record.into(), otp_expires_in: self.otp.ttl().as_secs() })
    }

    /// Confirms the emailed code and signs the account in.
    ///
    /// # Errors
    /// Auth for a wrong or expired code, RateLimited when attempts run out,
    /// Conflict when the account is already verified.
    #[instrument(skip_all)]
    pub async fn verify(&self, request: VerifyRequest) -> Result<Session, IdentityError> {
        let email = validate::email(&request.email)?;
        let Some(mut record) = self.accounts.find_by_email(&email).await? else {
            return Err(IdentityError::Auth {
                message: "verification code expired or was never issued".into(),
                context: None,
            });
        };
        if record.verified {
            self.otp.discard(&email).await;
            return Err(IdentityError::Conflict {
                message: "account is already verified".into(),
                context: None,
            });
        }

        self.otp.verify(&email, &request.code).await?;

        let now = Utc::now();
        self.accounts.mark_verified(&record.id, now).await.context("verifying account")?;
        record.verified = true;
        record.updated_at = now;
        info!(account = %record.id, "Account verified");

        self.session(record.into())
    }

    /// # Errors
    /// NotFound for unknown emails, Conflict for verified accounts,
    /// RateLimited inside the resend cooldown.
    #[instrument(skip_all)]
    pub async fn resend(&self, request: ResendRequest) -> Result<ResendResponse, IdentityError> {
        let email = validate::email(&request.email)?;
        let record = self.accounts.find_by_email(&email).await?.ok_or_else(|| {
            IdentityError::NotFound { message: "no account with this email".into(), context: None }
        })?;
        if record.verified {
            return Err(IdentityError::Conflict {
                message: "account is already verified".into(),
                context: None,
            });
        }

        self.send_code(&email, OtpPurpose::Resend).await?;
        Ok(ResendResponse { otp_expires_in: self.otp.ttl().as_secs() })
    }

    /// # Errors
    /// Auth for unknown email or wrong password (same message), Forbidden when unverified.
    #[instrument(skip_all)]
    pub async fn login(&self, request: LoginRequest) -> Result<Session, IdentityError> {
        let bad_credentials =
            || IdentityError::Auth { message: BAD_CREDENTIALS.into(), context: None };

        let email = validate::email(&request.email).map_err(|_| bad_credentials())?;
        let Some(record) = self.accounts.find_by_email(&email).await? else {
            return Err(bad_credentials());
        };
        if !password::verify(request.password, record.password_hash.clone()).await? {
            warn!(account = %record.id, "Failed sign-in");
            return Err(bad_credentials());
        }
        if !record.verified {
            return Err(IdentityError::Forbidden {
                message: "verify your email before signing in".into(),
                context: None,
            });
        }

        info!(account = %record.id, role = %record.role, "Signed in");
        self.session(record.into())
    }

    /// # Errors
    /// NotFound when the account no longer exists.
    pub async fn account(&self, id: &str) -> Result<Account, IdentityError> {
        self.record(id).await.map(Account::from)
    }

    /// # Errors
    /// Validation when nothing valid is given.
    #[instrument(skip_all, fields(account = %id))]
    pub async fn update_profile(
        &self,
        id: &str,
        request: UpdateProfileRequest,
    ) -> Result<Account, IdentityError> {
        let patch = AccountPatch {
            name: request.name.as_deref().map(validate::name).transpose()?,
            phone: request.phone.as_deref().map(validate::phone).transpose()?,
            updated_at: Utc::now(),
        };
        if patch.name.is_none() && patch.phone.is_none() {
            return Err(IdentityError::validation("nothing to update"));
        }

        self.record(id).await?;
        self.accounts.update_profile(id, patch).await.context("updating profile")?;
        self.account(id).await
    }

    /// # Errors
    /// Auth when the current password is wrong, Validation for a weak new one.
    #[instrument(skip_all, fields(account = %id))]
    pub async fn change_password(
        &self,
        id: &str,
        request: ChangePasswordRequest,
    ) -> Result<(), IdentityError> {
        validate::password(&request.new_password)?;
        let record = self.record(id).await?;
        if !password::verify(request.current_password, record.password_hash).await? {
            return Err(IdentityError::Auth {
                message: "current password is incorrect".into(),
                context: None,
            });
        }

        let hash = password::hash(request.new_password).await?;
        self.accounts.set_password(id, hash, Utc::now()).await.context("changing password")?;
        info!("Password changed");
        Ok(())
    }

    /// Creates the configured admin unless the email is registered already.
    /// Returns whether an account was created.
    ///
    /// # Errors
    /// Validation when the configured account is malformed.
    #[instrument(skip_all)]
    pub async fn bootstrap_admin(&self, admin: &AdminConfig) -> Result<bool, IdentityError> {
        let email = validate::email(&admin.email).context("security.admin.email")?;
        let name = validate::name(&admin.name).context("security.admin.name")?;
        validate::password(&admin.password).context("security.admin.password")?;

        if let Some(existing) = self.accounts.find_by_email(&email).await? {
            if existing.role != Role::Admin {
                warn!(account = %existing.id, role = %existing.role, "Configured admin email belongs to another role");
            }
            return Ok(false);
        }

        let now = Utc::now();
        let record = AccountRecord {
            id: safe_nanoid!(),
            name,
            email,
            phone: None,
            role: Role::Admin,
            verified: true,
            password_hash: password::hash(admin.password.clone()).await?,
            created_at: now,
            updated_at: now,
        };
        self.accounts.create(record.clone()).await.context("creating admin account")?;
        info!(account = %record.id, "Admin account created");
        Ok(true)
    }

    async fn record(&self, id: &str) -> Result<AccountRecord, IdentityError> {
        self.accounts.find_by_id(id).await?.ok_or_else(|| IdentityError::NotFound {
            message: "account not found".into(),
            context: None,
        })
    }

    fn session(&self, account: Account) -> Result<Session, IdentityError> {
        let issued = self.tokens.issue(&account.id, account.role)?;
        Ok(Session { token: issued.token, expires_at: issued.expires_at, account })
    }

    async fn send_code(&self, email: &str, purpose: OtpPurpose) -> Result<(), IdentityError> {
        let code = self.otp.issue(email).await?;
        let event = OtpIssued { email: email.to_owned(), code, purpose };
        let reached = self.events.publish(event).map_err(|e| IdentityError::Internal {
            message: e.to_string().into(),
            context: Some("publishing verification code".into()),
        })?;
        if reached == 0 {
            warn!("No mail worker is listening; verification code was not delivered");
        }
        Ok(())
    }
}
