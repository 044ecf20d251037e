use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use platter_catalog::model::{CreateMenuItemRequest, UpsertProfileRequest};
use platter_coverage::model::UpsertAreaRequest;
use platter_database::Database;
use platter_domain::config::ApiConfig;
use platter_domain::pincode::Pincode;
use platter_domain::registry::InitializedSlice;
use platter_domain::roles::Role;
use platter_event_bus::{EventBus, EventReceiverExt};
use platter_kernel::security::session::AuthUser;
use platter_kernel::server::pagination::Page;
use platter_kernel::server::state::ApiState;
use platter_ordering::OrderingService;
use platter_ordering::model::{
    DeliveryAddress, OrderLineRequest, OrderStatusChanged, PlaceOrderRequest, TransitionRequest,
};
use platter_ordering::state::OrderStatus;
use serde_json::{Value, json};
use std::time::Duration;
use tower::ServiceExt;

struct World {
    state: ApiState,
    orders: OrderingService,
    events: EventBus,
    /// Menu item ids of vendor `v1`: thali (30000), lassi (6000), sold-out halwa.
    thali: String,
    lassi: String,
    halwa: String,
}

fn user(id: &str, role: Role) -> AuthUser {
    AuthUser { id: id.to_owned(), role }
}

fn pin(code: &str) -> Pincode {
    Pincode::parse(code).unwrap()
}

async fn world() -> World {
    let config = ApiConfig::default();
    let db = Database::builder()
        .url("mem://")
        .session("platter", "ordering")
        .migrations(platter_coverage::migrations())
        .migrations(platter_catalog::migrations())
        .migrations(platter_ordering::migrations())
        .init()
        .await
        .unwrap();
    let events = EventBus::new();

    let coverage = platter_coverage::init(&db);
    for code in ["560001", "400001"] {
        let area = UpsertAreaRequest { code: pin(code), area: "A".to_owned(), city: "C".to_owned() };
        coverage.service.upsert(area).await.unwrap();
    }

    let catalog = platter_catalog::init(&db, &coverage.service);
    for (vendor, code, open) in [("v1", "560001", true), ("v2", "560001", false)] {
        let profile = UpsertProfileRequest {
            name: format!("Kitchen {vendor}"),
            description: None,
            cuisines: Vec::new(),
            address: "1 Main Road".to_owned(),
            pincode: pin(code),
            is_open: Some(open),
        };
        catalog.service.upsert_profile(vendor, profile).await.unwrap();
    }
    let mut ids = Vec::new();
    for (name, price, available) in [("Thali", 30_000, true), ("Lassi", 6_000, true), ("Halwa", 8_000, false)] {
        let item = CreateMenuItemRequest {
            name: name.to_owned(),
            description: None,
            price,
            vegetarian: true,
            available: Some(available),
        };
        ids.push(catalog.service.create_item("v1", item).await.unwrap().id);
    }

    let ordering = platter_ordering::init(&config, &db, &events, &catalog.service, &coverage.service);
    let orders = ordering.service.clone();
    let state = ApiState::builder()
        .config(config)
        .db(db)
        .events(events.clone())
        .register_slice(InitializedSlice::new(coverage))
        .register_slice(InitializedSlice::new(catalog))
        .register_slice(InitializedSlice::new(ordering))
        .build()
        .unwrap();

    let halwa = ids.pop().unwrap();
    let lassi = ids.pop().unwrap();
    let thali = ids.pop().unwrap();
    World { state, orders, events, thali, lassi, halwa }
}

fn address(code: &str) -> DeliveryAddress {
    DeliveryAddress {
        line1: "22 Church Street".to_owned(),
        line2: None,
        city: "Bengaluru".to_owned(),
        pincode: pin(code),
        phone: "9876543210".to_owned(),
    }
}

fn request(vendor: &str, lines: &[(&str, u32)], code: &str) -> PlaceOrderRequest {
    PlaceOrderRequest {
        vendor_id: vendor.to_owned(),
        items: lines
            .iter()
            .map(|(id, quantity)| OrderLineRequest { menu_item_id: (*id).to_owned(), quantity: *quantity })
            .collect(),
        delivery_address: address(code),
        note: None,
    }
}

fn to(status: OrderStatus) -> TransitionRequest {
    TransitionRequest { status, reason: None }
}

#[tokio::test]
async fn placing_snapshots_prices_and_charges_delivery() {
    let w = world().await;
    let customer = user("c1", Role::Customer);

    let order = w
        .orders
        .place(&customer, request("v1", &[(&w.lassi, 2)], "560001"))
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Placed);
    assert_eq!(order.vendor_name, "Kitchen v1");
    assert_eq!(order.items[0].unit_price, 6_000);
    assert_eq!(order.items[0].line_total, 12_000);
    assert_eq!((order.subtotal, order.delivery_fee, order.total), (12_000, 4_000, 16_000));

    let big = w
        .orders
        .place(&customer, request("v1", &[(&w.thali, 1), (&w.lassi, 4)], "560001"))
        .await
        .unwrap();
    assert_eq!((big.subtotal, big.delivery_fee, big.total), (54_000, 0, 54_000));

    let stored = w.orders.get(&customer, &order.id).await.unwrap();
    assert_eq!(stored, order);
}

#[tokio::test]
async fn placement_is_validated() {
    let w = world().await;
    let c = user("c1", Role::Customer);
    let kind = |r: Result<_, platter_ordering::OrderingError>| r.unwrap_err().kind();

    assert_eq!(kind(w.orders.place(&c, request("v1", &[], "560001")).await), "validation");
    assert_eq!(
        kind(w.orders.place(&c, request("v1", &[(&w.thali, 1), (&w.thali, 2)], "560001")).await),
        "validation"
    );
    assert_eq!(kind(w.orders.place(&c, request("v1", &[(&w.thali, 0)], "560001")).await), "validation");
    assert_eq!(kind(w.orders.place(&c, request("v1", &[(&w.thali, 21)], "560001")).await), "validation");
    assert_eq!(kind(w.orders.place(&c, request("v1", &[(&w.halwa, 1)], "560001")).await), "validation");
    assert_eq!(kind(w.orders.place(&c, request("v1", &[("nope", 1)], "560001")).await), "validation");
    assert_eq!(kind(w.orders.place(&c, request("v1", &[(&w.thali, 1)], "400001")).await), "validation");
    assert_eq!(kind(w.orders.place(&c, request("v2", &[(&w.thali, 1)], "560001")).await), "validation");
    assert_eq!(kind(w.orders.place(&c, request("v9", &[(&w.thali, 1)], "560001")).await), "not_found");

    let err = w.orders.place(&c, request("v1", &[(&w.thali, 1)], "110001")).await.unwrap_err();
    assert!(err.to_string().contains("pincode not serviceable"));
}

#[tokio::test]
async fn full_delivery_walks_the_state_machine() {
    let w = world().await;
    let mut changes = w.events.subscribe::<OrderStatusChanged>().unwrap();
    let customer = user("c1", Role::Customer);
    let vendor = user("v1", Role::Vendor);
    let partner = user("p1", Role::Partner);

    let order = w.orders.place(&customer, request("v1", &[(&w.thali, 1)], "560001")).await.unwrap();
    let id = order.id.as_str();

    for status in [OrderStatus::Accepted, OrderStatus::Preparing, OrderStatus::ReadyForPickup] {
        w.orders.transition(&vendor, id, to(status)).await.unwrap();
    }

    let err = w.orders.transition(&partner, id, to(OrderStatus::OutForDelivery)).await.unwrap_err();
    assert_eq!(err.kind(), "not_found", "unassigned partners cannot see the order");

    let claimable = w.orders.claimable(&pin("560001"), Page { limit: 10, offset: 0 }).await.unwrap();
    assert_eq!(claimable.len(), 1);
    let err = w.orders.assign(&partner, id, &pin("400001")).await.unwrap_err();
    assert_eq!(err.kind(), "validation");
    w.orders.assign(&partner, id, &pin("560001")).await.unwrap();
    let err = w.orders.assign(&user("p2", Role::Partner), id, &pin("560001")).await.unwrap_err();
    assert_eq!(err.kind(), "conflict");
    assert_eq!(w.orders.active_delivery("p1").await.unwrap().unwrap().id, id);

    let err = w.orders.transition(&customer, id, to(OrderStatus::Cancelled)).await.unwrap_err();
    assert_eq!(err.kind(), "conflict");
    assert!(err.to_string().contains("cannot move order from ready_for_pickup to cancelled"));

    w.orders.transition(&partner, id, to(OrderStatus::OutForDelivery)).await.unwrap();
    let done = w.orders.transition(&partner, id, to(OrderStatus::Delivered)).await.unwrap();
    assert_eq!(done.status, OrderStatus::Delivered);
    assert_eq!(done.partner_id.as_deref(), Some("p1"));
    assert!(w.orders.active_delivery("p1").await.unwrap().is_none());

    let admin = user("root", Role::Admin);
    let err = w.orders.transition(&admin, id, to(OrderStatus::Cancelled)).await.unwrap_err();
    assert_eq!(err.kind(), "conflict");

    let mut seen = Vec::new();
    for _ in 0..6 {
        let event = changes.next_event().await.unwrap();
        assert_eq!(event.order_id, id);
        seen.push((event.from, event.to, event.actor_role));
    }
    assert_eq!(seen[0], (None, OrderStatus::Placed, Role::Customer));
    assert_eq!(seen[1], (Some(OrderStatus::Placed), OrderStatus::Accepted, Role::Vendor));
    assert_eq!(seen[5], (Some(OrderStatus::OutForDelivery), OrderStatus::Delivered, Role::Partner));
}

#[tokio::test]
async fn reasons_are_only_kept_for_rejections_and_cancellations() {
    let w = world().await;
    let customer = user("c1", Role::Customer);
    let vendor = user("v1", Role::Vendor);

    let a = w.orders.place(&customer, request("v1", &[(&w.thali, 1)], "560001")).await.unwrap();
    let with_reason = |status, reason: &str| TransitionRequest { status, reason: Some(reason.to_owned()) };

    let err = w.orders.transition(&vendor, &a.id, with_reason(OrderStatus::Accepted, "ok")).await;
    assert_eq!(err.unwrap_err().kind(), "validation");
    let err = w
        .orders
        .transition(&vendor, &a.id, with_reason(OrderStatus::Rejected, &"x".repeat(201)))
        .await;
    assert_eq!(err.unwrap_err().kind(), "validation");

    let rejected = w
        .orders
        .transition(&vendor, &a.id, with_reason(OrderStatus::Rejected, "out of paneer"))
        .await
        .unwrap();
    assert_eq!(rejected.status, OrderStatus::Rejected);
    assert_eq!(rejected.reason.as_deref(), Some("out of paneer"));

    let b = w.orders.place(&customer, request("v1", &[(&w.lassi, 1)], "560001")).await.unwrap();
    let cancelled = w.orders.transition(&customer, &b.id, to(OrderStatus::Cancelled)).await.unwrap();
    assert_eq!(cancelled.reason, None);
}

#[tokio::test]
async fn orders_are_scoped_to_their_participants() {
    let w = world().await;
    let alice = user("alice", Role::Customer);
    let bob = user("bob", Role::Customer);
    let page = Page { limit: 10, offset: 0 };

    let first = w.orders.place(&alice, request("v1", &[(&w.thali, 1)], "560001")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = w.orders.place(&alice, request("v1", &[(&w.lassi, 1)], "560001")).await.unwrap();
    w.orders.place(&bob, request("v1", &[(&w.lassi, 3)], "560001")).await.unwrap();

    assert_eq!(w.orders.get(&bob, &first.id).await.unwrap_err().kind(), "not_found");
    assert_eq!(w.orders.get(&user("v2", Role::Vendor), &first.id).await.unwrap_err().kind(), "not_found");

    let mine = w.orders.list(&alice, None, page).await.unwrap();
    assert_eq!(mine.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(), [&second.id, &first.id]);
    assert_eq!(w.orders.list(&user("v1", Role::Vendor), None, page).await.unwrap().len(), 3);
    assert_eq!(w.orders.list(&user("root", Role::Admin), None, page).await.unwrap().len(), 3);
    assert!(w.orders.list(&user("p1", Role::Partner), None, page).await.unwrap().is_empty());

    w.orders.transition(&user("v1", Role::Vendor), &first.id, to(OrderStatus::Accepted)).await.unwrap();
    let accepted = w.orders.list(&alice, Some(OrderStatus::Accepted), page).await.unwrap();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].id, first.id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_moves_apply_at_most_once() {
    let w = world().await;
    let customer = user("c1", Role::Customer);
    let vendor = user("v1", Role::Vendor);

    for _ in 0..5 {
        let order = w.orders.place(&customer, request("v1", &[(&w.thali, 1)], "560001")).await.unwrap();

        let (accept, cancel) = tokio::join!(
            w.orders.transition(&vendor, &order.id, to(OrderStatus::Accepted)),
            w.orders.transition(&customer, &order.id, to(OrderStatus::Cancelled)),
        );
        let wins = usize::from(accept.is_ok()) + usize::from(cancel.is_ok());
        assert_eq!(wins, 1, "accept: {accept:?}, cancel: {cancel:?}");
        for loser in [accept, cancel].into_iter().filter_map(Result::err) {
            assert_eq!(loser.kind(), "conflict");
        }
    }
}

#[tokio::test]
async fn http_routes_enforce_roles_and_ids() {
    let w = world().await;
    let (router, _) = platter_ordering::router().split_for_parts();
    let app = router.with_state(w.state.clone());
    let token = |id: &str, role| w.state.tokens.issue(id, role).unwrap().token;

    let body = json!({
        "vendorId": "v1",
        "items": [{ "menuItemId": w.thali, "quantity": 1 }],
        "deliveryAddress": {
            "line1": "22 Church Street",
            "city": "Bengaluru",
            "pincode": "560001",
            "phone": "9876543210"
        }
    });
    let post = |token: String, body: &Value| {
        Request::post("/api/orders")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    };

    let response = app.clone().oneshot(post(token("v1", Role::Vendor), &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.clone().oneshot(post(token("c1", Role::Customer), &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let order: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(order["status"], "placed");
    assert_eq!(order["deliveryFee"], 4000);

    let request = Request::post(format!("/api/orders/{}/status", order["id"].as_str().unwrap()))
        .header(header::AUTHORIZATION, format!("Bearer {}", token("v1", Role::Vendor)))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "status": "teleported" }).to_string()))
        .unwrap();
    assert_eq!(app.clone().oneshot(request).await.unwrap().status(), StatusCode::BAD_REQUEST);

    let request = Request::get("/api/orders/vendor:abc")
        .header(header::AUTHORIZATION, format!("Bearer {}", token("c1", Role::Customer)))
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.clone().oneshot(request).await.unwrap().status(), StatusCode::BAD_REQUEST);

    let request = Request::get("/api/orders?status=placed")
        .header(header::AUTHORIZATION, format!("Bearer {}", token("c1", Role::Customer)))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let listed: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
}
