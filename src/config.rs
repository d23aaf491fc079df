use crate::domain::MIN_CHARGE_AMOUNT;

/// How the ledger treats a user without a balance record
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AccountPolicy {
    /// Users without a record have a zero balance, which the first charge or use persists
    #[default]
    Materialize,
    /// Every operation fails with `AccountNotFound` until the account is opened
    RequireExisting,
}

/// Whether balance and history reads take the per-user lock
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReadConsistency {
    /// Reads bypass the lock
    ///
    /// A read racing a mutation can observe the new balance before its history record.
    #[default]
    Relaxed,
    /// Reads are serialized with mutations of the same user
    Locked,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerConfig {
    pub min_charge_amount: u64,
    pub account_policy: AccountPolicy,
    pub read_consistency: ReadConsistency,
}

impl LedgerConfig {
    pub fn with_min_charge_amount(mut self, min_charge_amount: u64) -> Self {
        self.min_charge_amount = min_charge_amount;
        self
    }

    pub fn with_account_policy(mut self, account_policy: AccountPolicy) -> Self {
        self.account_policy = account_policy;
        self
    }

    pub fn with_read_consistency(mut self, read_consistency: ReadConsistency) -> Self {
        self.read_consistency = read_consistency;
        self
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            min_charge_amount: MIN_CHARGE_AMOUNT,
            account_policy: AccountPolicy::default(),
            read_consistency: ReadConsistency::default(),
        }
    }
}
