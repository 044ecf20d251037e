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

struct Harness {
    state: ApiState,
    app: Router,
}

async fn harness() -> Harness {
    let db = Database::builder()
        .url("mem://")
        .session("platter", "catalog")
        .migrations(platter_coverage::migrations())
        .migrations(platter_catalog::migrations())
        .init()
        .await
        .unwrap();

    let coverage = platter_coverage::init(&db);
    for code in ["560001", "400001"] {
        let area = UpsertAreaRequest {
            code: Pincode::parse(code).unwrap(),
            area: "Central".to_owned(),
            city: "Metro".to_owned(),
        };
        coverage.service.upsert(area).await.unwrap();
    }
    let catalog = platter_catalog::init(&db, &coverage.service);

    let state = ApiState::builder()
        .config(ApiConfig::default())
        .db(db)
        .register_slice(InitializedSlice::new(coverage))
        .register_slice(InitializedSlice::new(catalog))
        .build()
        .unwrap();
    let (router, _) = platter_catalog::router().split_for_parts();
    Harness { app: router.with_state(state.clone()), state }
}

impl Harness {
    fn token(&self, id: &str, role: Role) -> String {
        self.state.tokens.issue(id, role).unwrap().token
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
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
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() })
    }

    async fn open_store(&self, token: &str, name: &str, pincode: &str) {
        let profile = json!({
            "name": name,
            "cuisines": ["North Indian"],
            "address": "12 Residency Road",
            "pincode": pincode,
        });
        let (status, body) =
            self.call(Method::PUT, "/api/vendor/profile", Some(token), Some(profile)).await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }
}

#[tokio::test]
async fn vendor_sets_up_profile_and_menu() {
    let h = harness().await;
    let vendor = h.token("v1", Role::Vendor);

    let (status, _) = h.call(Method::GET, "/api/vendor/profile", Some(&vendor), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let dish = json!({ "name": "Paneer Tikka", "price": 24000, "vegetarian": true });
    let (status, _) =
        h.call(Method::POST, "/api/vendor/menu", Some(&vendor), Some(dish.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    h.open_store(&vendor, "Tandoor House", "560001").await;
    let (status, profile) = h.call(Method::GET, "/api/vendor/profile", Some(&vendor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["id"], "v1");
    assert_eq!(profile["isOpen"], true);
    assert_eq!(profile["cuisines"], json!(["north indian"]));

    let (status, item) = h.call(Method::POST, "/api/vendor/menu", Some(&vendor), Some(dish)).await;
    assert_eq!(status, StatusCode::CREATED, "{item}");
    assert_eq!(item["vendorId"], "v1");
    assert_eq!(item["available"], true);
    let id = item["id"].as_str().unwrap().to_owned();

    let patch = json!({ "price": 26000, "available": false });
    let (status, item) =
        h.call(Method::PATCH, &format!("/api/vendor/menu/{id}"), Some(&vendor), Some(patch)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["price"], 26000);
    assert_eq!(item["name"], "Paneer Tikka");

    let (_, menu) = h.call(Method::GET, "/api/vendor/menu", Some(&vendor), None).await;
    assert_eq!(menu.as_array().unwrap().len(), 1);

    let (_, store) = h.call(Method::GET, "/api/vendors/v1", None, None).await;
    assert_eq!(store["menu"].as_array().unwrap().len(), 0, "unavailable items are hidden");

    let (status, _) =
        h.call(Method::DELETE, &format!("/api/vendor/menu/{id}"), Some(&vendor), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn vendors_cannot_touch_each_others_items() {
    let h = harness().await;
    let owner = h.token("v1", Role::Vendor);
    let other = h.token("v2", Role::Vendor);
    h.open_store(&owner, "Owner", "560001").await;
    h.open_store(&other, "Other", "560001").await;

    let dish = json!({ "name": "Dosa", "price": 9000 });
    let (_, item) = h.call(Method::POST, "/api/vendor/menu", Some(&owner), Some(dish)).await;
    let uri = format!("/api/vendor/menu/{}", item["id"].as_str().unwrap());

    let (status, _) =
        h.call(Method::PATCH, &uri, Some(&other), Some(json!({ "price": 1 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = h.call(Method::DELETE, &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let customer = h.token("c1", Role::Customer);
    let (status, _) = h.call(Method::GET, "/api/vendor/menu", Some(&customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn profile_requires_serviceable_pincode_and_valid_fields() {
    let h = harness().await;
    let vendor = h.token("v1", Role::Vendor);

    let profile = json!({ "name": "Far Away", "address": "1 Road", "pincode": "110001" });
    let (status, body) =
        h.call(Method::PUT, "/api/vendor/profile", Some(&vendor), Some(profile)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "pincode not serviceable");

    let profile = json!({ "name": " ", "address": "1 Road", "pincode": "560001" });
    let (status, _) =
        h.call(Method::PUT, "/api/vendor/profile", Some(&vendor), Some(profile)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    h.open_store(&vendor, "Valid", "560001").await;
    let free = json!({ "name": "Free lunch", "price": 0 });
    let (status, _) = h.call(Method::POST, "/api/vendor/menu", Some(&vendor), Some(free)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn browsing_lists_open_vendors_in_a_pincode() {
    let h = harness().await;
    let a = h.token("va", Role::Vendor);
    let b = h.token("vb", Role::Vendor);
    let c = h.token("vc", Role::Vendor);
    h.open_store(&a, "Biryani Co", "560001").await;
    h.open_store(&b, "Appam Stop", "560001").await;
    h.open_store(&c, "Vada Pav", "400001").await;

    let closed = json!({ "name": "Biryani Co", "address": "x", "pincode": "560001", "isOpen": false });
    h.call(Method::PUT, "/api/vendor/profile", Some(&a), Some(closed)).await;

    let (status, vendors) = h.call(Method::GET, "/api/vendors?pincode=560001", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> =
        vendors.as_array().unwrap().iter().map(|v| v["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["Appam Stop"]);

    let (status, _) = h.call(Method::GET, "/api/vendors?pincode=abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = h.call(Method::GET, "/api/vendors", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = h.call(Method::GET, "/api/vendors/nobody", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn order_lookup_only_returns_the_vendors_items() {
    let h = harness().await;
    let owner = h.token("v1", Role::Vendor);
    let other = h.token("v2", Role::Vendor);
    h.open_store(&owner, "Owner", "560001").await;
    h.open_store(&other, "Other", "560001").await;

    let (_, mine) =
        h.call(Method::POST, "/api/vendor/menu", Some(&owner), Some(json!({ "name": "Idli", "price": 5000 }))).await;
    let (_, theirs) =
        h.call(Method::POST, "/api/vendor/menu", Some(&other), Some(json!({ "name": "Vada", "price": 4000 }))).await;

    let catalog = h.state.get_slice::<platter_catalog::Catalog>().unwrap();
    let ids = vec![
        mine["id"].as_str().unwrap().to_owned(),
        theirs["id"].as_str().unwrap().to_owned(),
        "missing".to_owned(),
    ];
    let items = catalog.service.items_for_order("v1", &ids).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Idli");
}
