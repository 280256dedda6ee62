mod event_publisher;
mod in_memory_ledger;
mod repositories;

pub use event_publisher::BroadcastEventPublisher;
pub use in_memory_ledger::InMemoryBalanceRepository;
pub use repositories::{
    InMemoryCurrencyRepository, InMemoryFeeScheduleRepository, InMemoryOrderRepository,
    InMemoryPriceRepository, InMemoryTradeRepository,
};
