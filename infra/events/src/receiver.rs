use crate::bus::Event;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast::{Receiver, error::RecvError};
use tracing::warn;

/// Lag-tolerant receiving for bus subscribers.
pub trait EventReceiverExt<T> {
    /// Waits for the next event, skipping over messages lost to lag.
    /// Returns `None` once the channel is closed.
    fn next_event(&mut self) -> impl Future<Output = Option<Arc<T>>> + Send;
}

impl<T: Event> EventReceiverExt<T> for Receiver<Arc<T>> {
    async fn next_event(&mut self) -> Option<Arc<T>> {
        loop {
            match self.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        event = std::any::type_name::<T>(),
                        skipped, "Event receiver lagged; continuing from the oldest retained event"
                    );
                },
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
