use platter_logger::{LevelFilter, Logger, LoggerError};

#[test]
fn second_init_is_a_subscriber_error() {
    let _first = Logger::builder()
        .name("platter-first")
        .level(LevelFilter::INFO)
        .init()
        .expect("first init should succeed");

    let err = Logger::builder()
        .name("platter-second")
        .level(LevelFilter::INFO)
        .init()
        .expect_err("second init should fail");

    assert!(matches!(err, LoggerError::Subscriber { .. }));
    assert_eq!(err.kind(), "subscriber");
}
