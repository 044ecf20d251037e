use chrono::{DateTime, Utc};
use platter_derive::api_model;
use platter_domain::roles::Role;
use serde::{Deserialize, Serialize};

/// A registered account as clients see it.
#[api_model(deny_unknown_fields = false)]
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[schema(value_type = String, example = "customer")]
    pub role: Role,
    pub verified: bool,
    /// Milliseconds since the Unix epoch.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub updated_at: DateTime<Utc>,
}

/// The stored row, including the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccountRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
    pub verified: bool,
    pub password_hash: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl From<AccountRecord> for Account {
    fn from(record: AccountRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            phone: record.phone,
            role: record.role,
            verified: record.verified,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Fields a `PATCH /api/auth/me` may change.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccountPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

#[api_model]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// `customer`, `vendor` or `partner`.
    #[schema(value_type = String, example = "customer")]
    pub role: Role,
    #[serde(default)]
    pub phone: Option<String>,
}

#[api_model]
pub struct PendingVerification {
    pub account: Account,
    /// Seconds until the emailed code expires.
    pub otp_expires_in: u64,
}

#[api_model]
pub struct VerifyRequest {
    pub email: String,
    pub code: String,
}

#[api_model]
pub struct ResendRequest {
    pub email: String,
}

#[api_model]
pub struct ResendResponse {
    pub otp_expires_in: u64,
}

#[api_model]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[api_model]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[api_model]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// A signed-in session. The token is also set as an HttpOnly cookie.
#[api_model]
pub struct Session {
    pub token: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub expires_at: DateTime<Utc>,
    pub account: Account,
}

/// What an issued code is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    Registration,
    Resend,
}

/// Published when a code is issued; the mail worker delivers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpIssued {
    pub email: String,
    pub code: String,
    pub purpose: OtpPurpose,
}
