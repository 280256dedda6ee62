use bourse_core::Timestamp;

/// Source of every timestamp the engine writes
///
/// Orders, trades and last prices are stamped from the injected clock, never
/// from the wall clock directly, so tests can freeze or step time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;

    /// Shown in startup logs
    fn name(&self) -> &str {
        "Clock"
    }
}
