use std::task::{Context, Poll};

use tower::Service;

use crate::{
    domain::{UserId, UserPoint},
    ports::{balance::BalanceStorePort, history::HistoryStorePort},
};

use super::{now_millis, BoxFuture, Error, LedgerService};

pub struct GetPointRequest {
    pub user_id: UserId,
}

impl<B, H> LedgerService<B, H>
where
    B: BalanceStorePort + Send + Sync,
    H: HistoryStorePort + Send + Sync,
{
    /// Current balance of the user
    ///
    /// With [`crate::AccountPolicy::Materialize`], a user without any activity has a zero balance
    /// and this never fails with [`Error::AccountNotFound`].
    #[tracing::instrument(skip(self))]
    pub async fn get_point(&self, user_id: UserId) -> Result<UserPoint, Error> {
        let _guard = self.read_guard(user_id).await;
        self.current_point(user_id, now_millis()).await
    }
}

impl<B, H> Service<GetPointRequest> for LedgerService<B, H>
where
    B: BalanceStorePort + Send + Sync + 'static,
    H: HistoryStorePort + Send + Sync + 'static,
{
    type Response = UserPoint;
    type Error = Error;
    type Future = BoxFuture<UserPoint>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: GetPointRequest) -> Self::Future {
        let ledger = self.clone();
        Box::pin(async move { ledger.get_point(req.user_id).await })
    }
}
