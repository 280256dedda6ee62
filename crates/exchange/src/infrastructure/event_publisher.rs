use bourse_core::{ExchangeEvent, TradingPair};
use bourse_ports::EventSink;
use dashmap::DashMap;
use log::debug;
use tokio::sync::broadcast;

/// Event fan-out over tokio broadcast channels
///
/// One channel carries every event; a pair channel is opened the first time
/// someone subscribes to that pair. `send` never blocks, so publishing from
/// inside a pair section is fine. A receiver that falls more than
/// `capacity` events behind sees `RecvError::Lagged`.
pub struct BroadcastEventPublisher {
    global_tx: broadcast::Sender<ExchangeEvent>,
    pair_channels: DashMap<TradingPair, broadcast::Sender<ExchangeEvent>>,
    capacity: usize,
}

impl BroadcastEventPublisher {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (global_tx, _) = broadcast::channel(capacity);
        Self {
            global_tx,
            pair_channels: DashMap::new(),
            capacity,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ExchangeEvent> {
        self.global_tx.subscribe()
    }

    /// Receive only events whose pair is `pair`
    pub fn subscribe_pair(&self, pair: &TradingPair) -> broadcast::Receiver<ExchangeEvent> {
        self.pair_channels
            .entry(pair.clone())
            .or_insert_with(|| {
                debug!("Opened event channel for {}", pair);
                broadcast::channel(self.capacity).0
            })
            .subscribe()
    }
}

impl EventSink for BroadcastEventPublisher {
    fn publish(&self, event: ExchangeEvent) {
        if let Some(tx) = self.pair_channels.get(event.pair()) {
            let _ = tx.send(event.clone());
        }
        // Err only means nobody is listening
        let _ = self.global_tx.send(event);
    }

    fn subscriber_count(&self) -> usize {
        self.global_tx.receiver_count()
            + self
                .pair_channels
                .iter()
                .map(|tx| tx.receiver_count())
                .sum::<usize>()
    }
}
