use crate::types::PropertyChange;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Fans change events out to every live subscriber.
///
/// Delivery is synchronous: an event is queued on each receiver before
/// `emit` returns. Subscribers whose receiver was dropped are forgotten.
#[derive(Debug, Default)]
pub struct ChangeNotifier {
    listeners: Vec<UnboundedSender<PropertyChange>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        ChangeNotifier { listeners: Vec::new() }
    }

    pub fn subscribe(&mut self) -> UnboundedReceiver<PropertyChange> {
        let (tx, rx) = mpsc::unbounded();
        self.listeners.push(tx);
        rx
    }

    pub fn emit(&mut self, change: PropertyChange) {
        debug!("{} changed: {:?}", change.property(), change);
        self.listeners.retain(|tx| tx.unbounded_send(change).is_ok());
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
