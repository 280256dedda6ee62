use bourse_core::ExchangeEvent;

/// Port for delivering exchange events to observers
///
/// Called only after a pass has committed, so observers never see state
/// that could still be rolled back.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: ExchangeEvent);

    fn publish_all(&self, events: Vec<ExchangeEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    /// Get the number of active subscribers
    fn subscriber_count(&self) -> usize;
}
