use crate::domain::{UserId, UserPoint};

#[mockall::automock]
#[async_trait::async_trait]
pub trait BalanceStorePort {
    /// Balance record for the user, if one was ever written
    async fn get_point(&self, user_id: UserId) -> Result<Option<UserPoint>, Error>;
    /// Insert or replace the balance record for `point.id`
    async fn upsert_point(&self, point: UserPoint) -> Result<UserPoint, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
