use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use platter_coverage::model::UpsertAreaRequest;
use platter_database::Database;
use platter_domain::config::ApiConfig;
use platter_domain::pincode::Pincode;
use platter_domain::registry::InitializedSlice;
use platter_domain::roles::Role;
use platter_kernel::server::state::ApiState;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn setup() -> (ApiState, platter_coverage::Coverage) {
    let db = Database::builder()
        .url("mem://")
        .session("platter", "coverage")
        .migrations(platter_coverage::migrations())
        .init()
        .await
        .unwrap();
    let coverage = platter_coverage::init(&db);
    let state = ApiState::builder()
        .config(ApiConfig::default())
        .db(db)
        .register_slice(InitializedSlice::new(coverage.clone()))
        .build()
        .unwrap();
    (state, coverage)
}

async fn call(
    state: &ApiState,
    method: Method,
    uri: &str,
    role: Option<Role>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (router, _) = platter_coverage::router().split_for_parts();
    let app: Router = router.with_state(state.clone());

    let mut request = Request::builder().method(method).uri(uri);
    if let Some(role) = role {
        let token = state.tokens.issue("someone", role).unwrap().token;
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() })
}

#[tokio::test]
async fn admins_manage_areas_and_everyone_can_read() {
    let (state, _) = setup().await;
    let area = json!({ "code": "560001", "area": "MG Road", "city": "Bengaluru" });

    let (status, _) = call(&state, Method::POST, "/api/pincodes", None, Some(area.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) =
        call(&state, Method::POST, "/api/pincodes", Some(Role::Vendor), Some(area.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) =
        call(&state, Method::POST, "/api/pincodes", Some(Role::Admin), Some(area)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["code"], "560001");
    assert_eq!(body["active"], true);

    let (status, body) = call(&state, Method::GET, "/api/pincodes", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = call(&state, Method::GET, "/api/pincodes/560001", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city"], "Bengaluru");
}

#[tokio::test]
async fn deactivated_areas_are_hidden_but_still_checkable() {
    let (state, _) = setup().await;
    for (code, area) in [("560001", "MG Road"), ("400001", "Fort")] {
        let body = json!({ "code": code, "area": area, "city": "Somewhere" });
        call(&state, Method::POST, "/api/pincodes", Some(Role::Admin), Some(body)).await;
    }

    let (status, body) =
        call(&state, Method::DELETE, "/api/pincodes/560001", Some(Role::Admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], false);

    let (_, listed) = call(&state, Method::GET, "/api/pincodes", None, None).await;
    let codes: Vec<&str> =
        listed.as_array().unwrap().iter().map(|a| a["code"].as_str().unwrap()).collect();
    assert_eq!(codes, ["400001"]);

    let (status, body) = call(&state, Method::GET, "/api/pincodes/560001", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], false);

    let reactivate = json!({ "code": "560001", "area": "MG Road East", "city": "Bengaluru" });
    let (status, body) =
        call(&state, Method::POST, "/api/pincodes", Some(Role::Admin), Some(reactivate)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], true);
    assert_eq!(body["area"], "MG Road East");
}

#[tokio::test]
async fn malformed_and_unknown_codes() {
    let (state, _) = setup().await;
    let (status, _) = call(&state, Method::GET, "/api/pincodes/012345", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = call(&state, Method::GET, "/api/pincodes/110001", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) =
        call(&state, Method::DELETE, "/api/pincodes/110001", Some(Role::Admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let bad = json!({ "code": "56001", "area": "X", "city": "Y" });
    let (status, _) = call(&state, Method::POST, "/api/pincodes", Some(Role::Admin), Some(bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ensure_serviceable_requires_an_active_area() {
    let (_, coverage) = setup().await;
    let code = Pincode::parse("600001").unwrap();

    let err = coverage.service.ensure_serviceable(&code).await.unwrap_err();
    assert_eq!(err.kind(), "validation");
    assert!(err.to_string().contains("pincode not serviceable"));

    let request = UpsertAreaRequest {
        code: code.clone(),
        area: "George Town".to_owned(),
        city: "Chennai".to_owned(),
    };
    let (_, created) = coverage.service.upsert(request).await.unwrap();
    assert!(created);
    assert!(coverage.service.ensure_serviceable(&code).await.is_ok());

    coverage.service.deactivate(&code).await.unwrap();
    assert!(coverage.service.ensure_serviceable(&code).await.is_err());
}
