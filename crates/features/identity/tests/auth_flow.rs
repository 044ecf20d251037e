use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use platter_database::Database;
use platter_domain::config::{AdminConfig, ApiConfig};
use platter_domain::registry::InitializedSlice;
use platter_event_bus::{EventBus, EventReceiverExt, Receiver};
use platter_identity::model::OtpIssued;
use platter_kernel::security::token::TokenService;
use platter_kernel::server::state::ApiState;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

struct Harness {
    app: Router,
    otps: Receiver<Arc<OtpIssued>>,
}

async fn harness(config: ApiConfig) -> Harness {
    let db = Database::builder()
        .url("mem://")
        .session("platter", "identity")
        .migrations(platter_identity::migrations())
        .init()
        .await
        .unwrap();
    let events = EventBus::new();
    let otps = events.subscribe::<OtpIssued>().unwrap();
    let tokens = TokenService::new(&config.security.jwt).unwrap();

    let identity = platter_identity::init(&config, &db, &events, &tokens).await.unwrap();
    let state = ApiState::builder()
        .config(config)
        .db(db)
        .events(events)
        .tokens(tokens)
        .register_slice(InitializedSlice::new(identity))
        .build()
        .unwrap();

    let (router, _) = platter_identity::router().split_for_parts();
    Harness { app: router.with_state(state), otps }
}

impl Harness {
    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Option<String>, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_owned());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, cookie, json)
    }

    async fn register(&mut self, email: &str, role: &str) -> String {
        let body = json!({ "name": "Asha", "email": email, "password": "correct horse", "role": role });
        let (status, _, json) = self.call(Method::POST, "/api/auth/register", None, Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        self.otps.next_event().await.unwrap().code.clone()
    }
}

#[tokio::test]
async fn register_verify_and_use_session() {
    let mut h = harness(ApiConfig::default()).await;
    let code = h.register(" Asha@Example.COM ", "customer").await;

    let (status, _, body) = h
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "asha@example.com", "password": "correct horse" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");

    let (status, cookie, body) = h
        .call(
            Method::POST,
            "/api/auth/verify",
            None,
            Some(json!({ "email": "asha@example.com", "code": code })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(cookie.unwrap().starts_with("platter_session="));
    assert_eq!(body["account"]["email"], "asha@example.com");
    assert_eq!(body["account"]["verified"], true);
    assert!(body["account"].get("passwordHash").is_none());

    let token = body["token"].as_str().unwrap().to_owned();
    let (status, _, me) = h.call(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "customer");

    let (status, _, _) = h
        .call(
            Method::POST,
            "/api/auth/verify",
            None,
            Some(json!({ "email": "asha@example.com", "code": code })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn registration_rejects_duplicates_and_admins() {
    let mut h = harness(ApiConfig::default()).await;
    h.register("dup@example.com", "vendor").await;

    let body = json!({ "name": "B", "email": "DUP@example.com", "password": "password1", "role": "partner" });
    let (status, _, _) = h.call(Method::POST, "/api/auth/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let body = json!({ "name": "C", "email": "c@example.com", "password": "password1", "role": "admin" });
    let (status, _, json) = h.call(Method::POST, "/api/auth/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "bad_request");

    let body = json!({ "name": "D", "email": "not-an-email", "password": "password1", "role": "customer" });
    let (status, _, _) = h.call(Method::POST, "/api/auth/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body = json!({ "name": "E", "email": "e@example.com", "password": "short", "role": "customer" });
    let (status, _, _) = h.call(Method::POST, "/api/auth/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_codes_run_out_and_resend_is_throttled() {
    let mut config = ApiConfig::default();
    config.security.otp.max_attempts = 2;
    let mut h = harness(config).await;
    let code = h.register("otp@example.com", "customer").await;
    let wrong = if code == "000000" { "111111" } else { "000000" };
    let attempt = json!({ "email": "otp@example.com", "code": wrong });

    let (status, _, _) = h.call(Method::POST, "/api/auth/verify", None, Some(attempt.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _, _) = h.call(Method::POST, "/api/auth/verify", None, Some(attempt)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let correct = json!({ "email": "otp@example.com", "code": code });
    let (status, _, _) = h.call(Method::POST, "/api/auth/verify", None, Some(correct)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The exhausted code was dropped, so a resend is allowed right away.
    let resend = json!({ "email": "otp@example.com" });
    let (status, _, body) = h.call(Method::POST, "/api/auth/resend", None, Some(resend.clone())).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["otpExpiresIn"], 600);
    let (status, _, _) = h.call(Method::POST, "/api/auth/resend", None, Some(resend)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let fresh = h.otps.next_event().await.unwrap().code.clone();
    let verify = json!({ "email": "otp@example.com", "code": fresh });
    let (status, _, _) = h.call(Method::POST, "/api/auth/verify", None, Some(verify)).await;
    assert_eq!(status, StatusCode::OK);

    let unknown = json!({ "email": "ghost@example.com" });
    let (status, _, _) = h.call(Method::POST, "/api/auth/resend", None, Some(unknown)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_hides_which_credential_was_wrong() {
    let mut h = harness(ApiConfig::default()).await;
    let code = h.register("login@example.com", "partner").await;
    let verify = json!({ "email": "login@example.com", "code": code });
    h.call(Method::POST, "/api/auth/verify", None, Some(verify)).await;

    let wrong_password = json!({ "email": "login@example.com", "password": "incorrect1" });
    let (status, _, a) = h.call(Method::POST, "/api/auth/login", None, Some(wrong_password)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let wrong_email = json!({ "email": "nobody@example.com", "password": "correct horse" });
    let (status, _, b) = h.call(Method::POST, "/api/auth/login", None, Some(wrong_email)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(a["message"], b["message"]);

    let good = json!({ "email": "login@example.com", "password": "correct horse" });
    let (status, cookie, body) = h.call(Method::POST, "/api/auth/login", None, Some(good)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(cookie.unwrap().contains("HttpOnly"));
    assert_eq!(body["account"]["role"], "partner");

    let (status, cookie, _) = h.call(Method::POST, "/api/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(cookie.unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn profile_and_password_updates() {
    let mut h = harness(ApiConfig::default()).await;
    let code = h.register("me@example.com", "customer").await;
    let verify = json!({ "email": "me@example.com", "code": code });
    let (_, _, session) = h.call(Method::POST, "/api/auth/verify", None, Some(verify)).await;
    let token = session["token"].as_str().unwrap().to_owned();

    let patch = json!({ "name": "  Asha K ", "phone": "+91 98765-43210" });
    let (status, _, me) = h.call(Method::PATCH, "/api/auth/me", Some(&token), Some(patch)).await;
    assert_eq!(status, StatusCode::OK, "{me}");
    assert_eq!(me["name"], "Asha K");
    assert_eq!(me["phone"], "+919876543210");

    let (status, _, _) = h.call(Method::PATCH, "/api/auth/me", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let change = json!({ "currentPassword": "wrong pass", "newPassword": "new password" });
    let (status, _, _) = h.call(Method::POST, "/api/auth/password", Some(&token), Some(change)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let change = json!({ "currentPassword": "correct horse", "newPassword": "new password" });
    let (status, _, _) = h.call(Method::POST, "/api/auth/password", Some(&token), Some(change)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let login = json!({ "email": "me@example.com", "password": "new password" });
    let (status, _, _) = h.call(Method::POST, "/api/auth/login", None, Some(login)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = h.call(Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn configured_admin_is_bootstrapped() {
    let mut config = ApiConfig::default();
    config.security.admin = Some(AdminConfig {
        email: "Root@Platter.in".to_owned(),
        password: "admin password".to_owned(),
        name: "Operator".to_owned(),
    });
    let h = harness(config).await;

    let login = json!({ "email": "root@platter.in", "password": "admin password" });
    let (status, _, body) = h.call(Method::POST, "/api/auth/login", None, Some(login)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["account"]["role"], "admin");
    assert_eq!(body["account"]["verified"], true);
}
