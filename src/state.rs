use std::sync::Arc;

use tokio::sync::broadcast;

use crate::models::event::RideEvent;
use crate::observability::metrics::Metrics;
use crate::store::DocumentStore;

pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub ride_events_tx: broadcast::Sender<RideEvent>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, event_buffer_size: usize) -> Self {
        let (ride_events_tx, _unused_rx) = broadcast::channel(event_buffer_size.max(1));

        Self {
            store,
            ride_events_tx,
            metrics: Metrics::new(),
        }
    }

    /// Fans an event out to websocket subscribers. Having none is fine.
    pub fn publish(&self, event: RideEvent) {
        let _ = self.ride_events_tx.send(event);
    }
}
