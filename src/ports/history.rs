use crate::domain::{PointHistory, TransactionType, UserId};

#[mockall::automock]
#[async_trait::async_trait]
pub trait HistoryStorePort {
    /// Append a record for the user and return it with its assigned id
    async fn append(
        &self,
        user_id: UserId,
        amount: u64,
        kind: TransactionType,
        update_millis: i64,
    ) -> Result<PointHistory, Error>;
    /// All records of the user, in the order they were appended
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<PointHistory>, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Concrete adapter errors
    ///
    /// See [`crate::ports::balance::Error::Adapter`].
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
