use platter_domain::config::{ApiConfig, MarketplaceConfig, OtpConfig, ServerConfig};
use serde_json::json;

#[test]
fn defaults_describe_a_local_dev_server() {
    let config = ApiConfig::default();
    assert_eq!(config.server.port, 8080);
    assert!(config.server.ssl.is_none());
    assert_eq!(config.database.url, "mem://");
    assert!(config.database.credentials.is_none());
    assert_eq!(config.security.session.cookie_name, "platter_session");
    assert!(config.security.admin.is_none());

    let otp = OtpConfig::default();
    assert_eq!(otp.length, 6);
    assert_eq!(otp.max_attempts, 5);

    let market = MarketplaceConfig::default();
    assert!(market.free_delivery_threshold > market.delivery_fee);
    assert!(market.default_page_size <= market.max_page_size);

    assert_eq!(ServerConfig::default().shutdown_grace_seconds, 30);
}

#[test]
fn partial_sections_keep_defaults() {
    let raw = json!({
        "server": { "address": "::", "port": 9000 },
        "security": { "otp": { "length": 8 }, "admin": { "email": "ops@platter.test" } },
        "marketplace": { "delivery_fee": 2500 },
        "unrelated": { "ignored": true }
    });

    let config: ApiConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.security.otp.length, 8);
    assert_eq!(config.security.otp.ttl_seconds, 600);
    assert_eq!(config.security.admin.as_ref().map(|a| a.email.as_str()), Some("ops@platter.test"));
    assert_eq!(config.marketplace.delivery_fee, 2500);
    assert_eq!(config.marketplace.max_lines_per_order, 25);
}

#[test]
fn clones_share_until_written() {
    let original = ApiConfig::default();
    let mut changed = original.clone();
    changed.marketplace.delivery_fee = 0;

    assert_eq!(original.marketplace.delivery_fee, 4_000);
    assert_eq!(changed.marketplace.delivery_fee, 0);
}
