use serde::{Deserialize, Serialize};

/// Identifier of the user owning a point balance
pub type UserId = u64;

/// Smallest amount of points accepted by a single charge
pub const MIN_CHARGE_AMOUNT: u64 = 10;

/// Current point balance of a user
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPoint {
    /// User owning this balance
    pub id: UserId,
    /// Current number of points
    pub point: u64,
    /// Epoch milliseconds of the last committed change
    ///
    /// This never goes backwards for a given user, even if the wall clock does.
    pub update_millis: i64,
}

impl UserPoint {
    /// Balance of a user without any prior activity
    pub fn empty(id: UserId, now_millis: i64) -> Self {
        Self {
            id,
            point: 0,
            update_millis: now_millis,
        }
    }

    /// Copy of this balance holding `point`, stamped at `now_millis`
    pub fn with_point(&self, point: u64, now_millis: i64) -> Self {
        Self {
            id: self.id,
            point,
            update_millis: self.update_millis.max(now_millis),
        }
    }
}

/// Kind of a balance-changing operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Charge,
    Use,
}

impl TransactionType {
    /// Balance resulting from applying `amount` to `balance`
    ///
    /// `min_charge` only applies to [`TransactionType::Charge`].
    pub fn apply(
        &self,
        balance: u64,
        amount: u64,
        min_charge: u64,
    ) -> Result<u64, ValidationError> {
        match self {
            TransactionType::Charge => validate_charge(balance, amount, min_charge),
            TransactionType::Use => validate_use(balance, amount),
        }
    }
}

/// Immutable record of a committed charge or use
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointHistory {
    /// Sequence number, unique across all users
    pub id: u64,
    pub user_id: UserId,
    /// Requested amount, always positive
    pub amount: u64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Epoch milliseconds at which the change was committed
    pub update_millis: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("amount must be positive")]
    NonPositiveAmount,

    #[error("charge of {amount} points is below the minimum of {minimum} points")]
    BelowMinimumCharge { amount: u64, minimum: u64 },

    #[error("insufficient balance: using {amount} points out of {balance} points")]
    InsufficientBalance { balance: u64, amount: u64 },

    /// The resulting balance does not fit in a `u64`
    #[error("charging {amount} points to {balance} points overflows the balance")]
    BalanceOverflow { balance: u64, amount: u64 },
}

/// New balance after charging `amount` points
pub fn validate_charge(balance: u64, amount: u64, minimum: u64) -> Result<u64, ValidationError> {
    if amount == 0 {
        return Err(ValidationError::NonPositiveAmount);
    }
    if amount < minimum {
        return Err(ValidationError::BelowMinimumCharge { amount, minimum });
    }

    balance
        .checked_add(amount)
        .ok_or(ValidationError::BalanceOverflow { balance, amount })
}

/// New balance after using `amount` points
pub fn validate_use(balance: u64, amount: u64) -> Result<u64, ValidationError> {
    if amount == 0 {
        return Err(ValidationError::NonPositiveAmount);
    }

    balance
        .checked_sub(amount)
        .ok_or(ValidationError::InsufficientBalance { balance, amount })
}
