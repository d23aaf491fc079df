use std::task::{Context, Poll};

use tower::Service;

use crate::{
    domain::{TransactionType, UserId, UserPoint},
    ports::{balance::BalanceStorePort, history::HistoryStorePort},
};

use super::{BoxFuture, Error, LedgerService};

pub struct UsePointRequest {
    pub user_id: UserId,
    /// Points to spend, at most the current balance
    pub amount: u64,
}

impl<B, H> LedgerService<B, H>
where
    B: BalanceStorePort + Send + Sync,
    H: HistoryStorePort + Send + Sync,
{
    /// Remove `amount` points from the user's balance and record a `USE`
    #[tracing::instrument(skip(self))]
    pub async fn use_point(&self, user_id: UserId, amount: u64) -> Result<UserPoint, Error> {
        self.commit(user_id, TransactionType::Use, amount).await
    }
}

impl<B, H> Service<UsePointRequest> for LedgerService<B, H>
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

    fn call(&mut self, req: UsePointRequest) -> Self::Future {
        let ledger = self.clone();
        Box::pin(async move { ledger.use_point(req.user_id, req.amount).await })
    }
}
