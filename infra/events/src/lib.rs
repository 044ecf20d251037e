//! # Event Bus
//!
//! A type-indexed broadcast bus shared by the feature slices. Slices publish domain
//! events (an order changed status, an OTP was issued) without knowing who listens;
//! background workers subscribe by event type.
//!
//! ```rust
//! use platter_event_bus::{EventBus, EventBusError, EventReceiverExt};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct OrderPlaced { id: String }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), EventBusError> {
//!     let bus = EventBus::new();
//!     let mut rx = bus.subscribe::<OrderPlaced>()?;
//!
//!     bus.publish(OrderPlaced { id: "A1".into() })?;
//!
//!     let event = rx.next_event().await.expect("bus open");
//!     assert_eq!(event.id, "A1");
//!     Ok(())
//! }
//! ```

mod bus;
mod error;
mod receiver;

pub use bus::{DEFAULT_CAPACITY, Event, EventBus};
pub use error::{EventBusError, EventBusErrorExt};
pub use receiver::EventReceiverExt;
pub use tokio::sync::broadcast::Receiver;
