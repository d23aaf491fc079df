use std::{future::Future, pin::Pin, sync::Arc};

use chrono::Utc;

use crate::{
    config::{AccountPolicy, LedgerConfig, ReadConsistency},
    domain::{TransactionType, UserId, UserPoint, ValidationError},
    locks::{AccountGuard, AccountLocks},
    ports::{balance::BalanceStorePort, history::HistoryStorePort},
};

pub mod charge_point;
pub mod get_histories;
pub mod get_point;
pub mod use_point;

pub use charge_point::ChargePointRequest;
pub use get_histories::GetHistoriesRequest;
pub use get_point::GetPointRequest;
pub use use_point::UsePointRequest;

type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, Error>> + Send>>;

/// Entry point for every point operation
///
/// Charges and uses of a user are serialized through that user's lock. The balance write and the
/// history append happen inside the same critical section.
pub struct LedgerService<B, H> {
    balances: Arc<B>,
    histories: Arc<H>,
    locks: Arc<AccountLocks>,
    config: LedgerConfig,
}

impl<B, H> Clone for LedgerService<B, H> {
    fn clone(&self) -> Self {
        Self {
            balances: self.balances.clone(),
            histories: self.histories.clone(),
            locks: self.locks.clone(),
            config: self.config.clone(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("account {0} not found")]
    AccountNotFound(UserId),

    #[error("invalid amount: {0}")]
    InvalidAmount(ValidationError),

    #[error("insufficient balance for account {user_id}: using {amount} points out of {balance} points")]
    InsufficientBalance {
        user_id: UserId,
        balance: u64,
        amount: u64,
    },

    #[error("balance store error: {0:?}")]
    Balance(#[from] crate::ports::balance::Error),
    #[error("history store error: {0:?}")]
    History(#[from] crate::ports::history::Error),
}

impl Error {
    fn rejected(user_id: UserId, err: ValidationError) -> Self {
        match err {
            ValidationError::InsufficientBalance { balance, amount } => Error::InsufficientBalance {
                user_id,
                balance,
                amount,
            },
            err => Error::InvalidAmount(err),
        }
    }

    /// Whether the request itself was at fault
    ///
    /// Retrying such a request unchanged fails the same way.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::AccountNotFound(_) | Error::InvalidAmount(_) | Error::InsufficientBalance { .. }
        )
    }
}

impl<B, H> LedgerService<B, H>
where
    B: BalanceStorePort + Send + Sync,
    H: HistoryStorePort + Send + Sync,
{
    pub fn new(balances: Arc<B>, histories: Arc<H>) -> Self {
        Self::with_config(balances, histories, LedgerConfig::default())
    }

    pub fn with_config(balances: Arc<B>, histories: Arc<H>, config: LedgerConfig) -> Self {
        Self {
            balances,
            histories,
            locks: Arc::new(AccountLocks::new()),
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn locks(&self) -> &AccountLocks {
        &self.locks
    }

    /// Persist a zero balance for the user unless one already exists
    #[tracing::instrument(skip(self))]
    pub async fn open_account(&self, user_id: UserId) -> Result<UserPoint, Error> {
        let _guard = self.locks.acquire(user_id).await;

        if let Some(point) = self.balances.get_point(user_id).await? {
            return Ok(point);
        }

        let point = self
            .balances
            .upsert_point(UserPoint::empty(user_id, now_millis()))
            .await?;
        tracing::debug!("account opened");
        Ok(point)
    }

    /// Lock to hold while reading, depending on the configured consistency
    async fn read_guard(&self, user_id: UserId) -> Option<AccountGuard> {
        match self.config.read_consistency {
            ReadConsistency::Relaxed => None,
            ReadConsistency::Locked => Some(self.locks.acquire(user_id).await),
        }
    }

    /// Stored balance of the user, or a zero balance if the policy allows it
    async fn current_point(&self, user_id: UserId, now_millis: i64) -> Result<UserPoint, Error> {
        match (self.balances.get_point(user_id).await?, self.config.account_policy) {
            (Some(point), _) => Ok(point),
            (None, AccountPolicy::Materialize) => Ok(UserPoint::empty(user_id, now_millis)),
            (None, AccountPolicy::RequireExisting) => Err(Error::AccountNotFound(user_id)),
        }
    }

    /// Apply a charge or a use while holding the user's lock
    async fn commit(
        &self,
        user_id: UserId,
        kind: TransactionType,
        amount: u64,
    ) -> Result<UserPoint, Error> {
        let _guard = self.locks.acquire(user_id).await;

        let now = now_millis();
        let current = self.current_point(user_id, now).await?;
        let new_point = kind
            .apply(current.point, amount, self.config.min_charge_amount)
            .map_err(|err| {
                tracing::info!(balance = current.point, error = %err, "request rejected");
                Error::rejected(user_id, err)
            })?;

        let updated = self
            .balances
            .upsert_point(current.with_point(new_point, now))
            .await?;

        if let Err(err) = self
            .histories
            .append(user_id, amount, kind, updated.update_millis)
            .await
        {
            tracing::warn!(error = %err, "history append failed, restoring balance");
            if let Err(rollback_err) = self.balances.upsert_point(current).await {
                tracing::error!(error = %rollback_err, "failed to restore balance");
            }
            return Err(err.into());
        }

        tracing::debug!(
            old_point = current.point,
            new_point = updated.point,
            "mutation committed"
        );
        Ok(updated)
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
