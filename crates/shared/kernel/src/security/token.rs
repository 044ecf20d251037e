use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use platter_domain::config::JwtConfig;
use platter_domain::roles::Role;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

const WEAK_SECRET_LEN: usize = 32;

#[platter_derive::platter_error]
pub enum TokenError {
    /// The JWT settings cannot produce a usable signer.
    #[error("Token configuration error{}: {message}", format_context(.context))]
    Configuration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Token encoding error{}: {source}", format_context(.context))]
    Encode { source: jsonwebtoken::errors::Error, context: Option<Cow<'static, str>> },

    /// Bad signature, wrong issuer, malformed or expired.
    #[error("Invalid token{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Session token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account key.
    pub sub: String,
    pub role: Role,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub max_age_seconds: u64,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl_seconds: u64,
}

/// Issues and verifies HS256 session tokens.
#[derive(Clone)]
pub struct TokenService {
    keys: Arc<Keys>,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.keys.issuer)
            .field("ttl_seconds", &self.keys.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// # Errors
    /// [`TokenError::Configuration`] for an empty secret, empty issuer or zero TTL.
    pub fn new(config: &JwtConfig) -> Result<Self, TokenError> {
        if config.secret.is_empty() {
            return Err(TokenError::Configuration {
                message: "jwt secret is empty".into(),
                context: None,
            });
        }
        if config.issuer.trim().is_empty() || config.ttl_seconds == 0 {
            return Err(TokenError::Configuration {
                message: "jwt issuer and ttl_seconds must be set".into(),
                context: None,
            });
        }
        if config.secret.len() < WEAK_SECRET_LEN {
            warn!(len = config.secret.len(), "JWT secret is short; use at least 32 bytes");
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = config.clock_skew_seconds;

        Ok(Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(config.secret.as_bytes()),
                decoding: DecodingKey::from_secret(config.secret.as_bytes()),
                validation,
                issuer: config.issuer.clone(),
                ttl_seconds: config.ttl_seconds,
            }),
        })
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> u64 {
        self.keys.ttl_seconds
    }

    /// # Errors
    /// [`TokenError::Encode`] when signing fails.
    pub fn issue(&self, subject: &str, role: Role) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, role, Utc::now())
    }

    fn issue_at(
        &self,
        subject: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let ttl = i64::try_from(self.keys.ttl_seconds).unwrap_or(i64::MAX / 2);
        let expires_at = now + Duration::seconds(ttl);
        let claims = Claims {
            sub: subject.to_owned(),
            role,
            iss: self.keys.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
            .context("signing session token")?;

        Ok(IssuedToken { token, expires_at, max_age_seconds: self.keys.ttl_seconds })
    }

    /// # Errors
    /// [`TokenError::Invalid`] for any token that does not verify.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.keys.decoding, &self.keys.validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Invalid { message: e.to_string().into(), context: None })
    }
}
