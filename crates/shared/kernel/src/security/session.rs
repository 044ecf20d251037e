use crate::server::error::ApiError;
use crate::server::state::ApiState;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::{HeaderMap, request::Parts};
use platter_domain::config::SessionConfig;
use platter_domain::roles::{Role, RoleSet};
use tracing::debug;

/// The caller behind a verified session token.
///
/// The token is read from `Authorization: Bearer <token>` first and from the
/// session cookie second. Handlers that take an `AuthUser` answer 401 to
/// anonymous or expired sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub role: Role,
}

impl AuthUser {
    /// # Errors
    /// [`ApiError::Forbidden`] when the caller's role is not in `allowed`.
    pub fn require(&self, allowed: RoleSet) -> Result<&Self, ApiError> {
        if allowed.contains_role(self.role) {
            Ok(self)
        } else {
            Err(ApiError::forbidden(format!("{} accounts cannot do this", self.role)))
        }
    }
}

impl FromRequestParts<ApiState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        let cookie_name = &state.config.security.session.cookie_name;
        let token = bearer_token(&parts.headers)
            .or_else(|| cookie_value(&parts.headers, cookie_name))
            .ok_or_else(|| ApiError::unauthorized("authentication required"))?;

        let claims = state.tokens.verify(token).map_err(|e| {
            debug!(error = %e, "Rejected session token");
            ApiError::unauthorized("session is invalid or expired")
        })?;

        Ok(Self { id: claims.sub, role: claims.role })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value)
}

/// `Set-Cookie` value carrying a session token.
#[must_use]
pub fn session_cookie(config: &SessionConfig, token: &str, max_age_seconds: u64) -> String {
    let secure = if config.secure { "; Secure" } else { "" };
    format!(
        "{}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_seconds}{secure}",
        config.cookie_name
    )
}

/// `Set-Cookie` value that removes the session cookie.
#[must_use]
pub fn clear_session_cookie(config: &SessionConfig) -> String {
    session_cookie(config, "", 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn cookie_lookup_finds_named_pair() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; platter_session=tok123"));
        assert_eq!(cookie_value(&headers, "platter_session"), Some("tok123"));
        assert_eq!(cookie_value(&headers, "missing"), None);

        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("platter_session="));
        assert_eq!(cookie_value(&headers, "platter_session"), None);
    }

    #[test]
    fn cookies_carry_security_attributes() {
        let config = SessionConfig { cookie_name: "sid".to_owned(), secure: true };
        let cookie = session_cookie(&config, "tok", 60);
        assert_eq!(cookie, "sid=tok; HttpOnly; SameSite=Lax; Path=/; Max-Age=60; Secure");

        let cleared = clear_session_cookie(&SessionConfig { secure: false, ..config });
        assert_eq!(cleared, "sid=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0");
    }

    #[test]
    fn require_checks_role_membership() {
        let vendor = AuthUser { id: "v1".to_owned(), role: Role::Vendor };
        assert!(vendor.require(RoleSet::STAFF).is_ok());
        let err = vendor.require(RoleSet::CUSTOMER).unwrap_err();
        assert_eq!(err.kind(), "forbidden");
    }
}
