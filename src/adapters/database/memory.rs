use crate::{
    domain::{PointHistory, TransactionType, UserId, UserPoint},
    ports::{
        balance::{self, BalanceStorePort},
        history::{self, HistoryStorePort},
    },
};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
};

#[derive(Clone, Debug, Default)]
pub struct MemoryBalanceStore {
    points: Arc<Mutex<HashMap<UserId, UserPoint>>>,
}

#[async_trait::async_trait]
impl BalanceStorePort for MemoryBalanceStore {
    async fn get_point(&self, user_id: UserId) -> Result<Option<UserPoint>, balance::Error> {
        Ok(self.points.lock()?.get(&user_id).copied())
    }

    async fn upsert_point(&self, point: UserPoint) -> Result<UserPoint, balance::Error> {
        self.points.lock()?.insert(point.id, point);
        Ok(point)
    }
}

#[derive(Clone, Debug)]
pub struct MemoryHistoryStore {
    histories: Arc<Mutex<HashMap<UserId, Vec<PointHistory>>>>,
    /// Next record id, shared by all users
    cursor: Arc<AtomicU64>,
}

#[async_trait::async_trait]
impl HistoryStorePort for MemoryHistoryStore {
    async fn append(
        &self,
        user_id: UserId,
        amount: u64,
        kind: TransactionType,
        update_millis: i64,
    ) -> Result<PointHistory, history::Error> {
        let mut histories = self.histories.lock()?;
        let record = PointHistory {
            id: self.cursor.fetch_add(1, Ordering::Relaxed),
            user_id,
            amount,
            kind,
            update_millis,
        };
        histories.entry(user_id).or_default().push(record.clone());

        Ok(record)
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<PointHistory>, history::Error> {
        let records = self
            .histories
            .lock()?
            .get(&user_id)
            .cloned()
            .unwrap_or_default();

        Ok(records)
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self {
            histories: Arc::new(Mutex::new(HashMap::new())),
            cursor: Arc::new(AtomicU64::new(1)),
        }
    }
}

/// Erased [`PoisonError`]
///
/// `PoisonError` keeps the `MutexGuard` internally, which is not send. Thus we erase the error
/// and only keep the string representation instead.
#[derive(Debug, thiserror::Error)]
#[error("poison error: {0}")]
pub struct ErasedPoisonError(String);

impl<T> From<PoisonError<T>> for balance::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}

impl<T> From<PoisonError<T>> for history::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}
