use bourse_core::{Amount, Balance, CurrencyCode, LedgerEntry, UserId};

use crate::error::LedgerResult;

/// Port for the per-(user, currency) available balance store
///
/// Rows are created on first credit; a missing row reads as zero.
pub trait BalanceRepository: Send + Sync {
    /// Available amount, zero when the row does not exist
    fn available(&self, user: UserId, currency: &CurrencyCode) -> Amount;

    /// All rows held by `user`, sorted by currency
    fn balances_for(&self, user: UserId) -> Vec<Balance>;

    /// Apply a batch of signed changes as one atomic unit.
    ///
    /// Implementations lock every touched row in ascending `BalanceKey`
    /// order before reading any of them. If any row would end up negative
    /// the whole batch is rejected with `NegativeBalance`, and with
    /// `Overflow` if an amount leaves the representable range; either way
    /// nothing is written.
    fn apply(&self, entries: &[LedgerEntry]) -> LedgerResult<()>;
}
