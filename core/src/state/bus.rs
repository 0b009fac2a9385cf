use tokio::sync::broadcast;

use super::types::PortalEvent;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Fan-out of [`PortalEvent`]s to any number of observers.
///
/// Emitting never blocks and never fails; events are dropped when nobody
/// listens and lagging receivers skip ahead.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PortalEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PortalEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: PortalEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
