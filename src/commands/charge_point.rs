use std::task::{Context, Poll};

use tower::Service;

use crate::{
    domain::{TransactionType, UserId, UserPoint},
    ports::{balance::BalanceStorePort, history::HistoryStorePort},
};

use super::{BoxFuture, Error, LedgerService};

pub struct ChargePointRequest {
    pub user_id: UserId,
    /// Points to add, at least the configured minimum charge
    pub amount: u64,
}

impl<B, H> LedgerService<B, H>
where
    B: BalanceStorePort + Send + Sync,
    H: HistoryStorePort + Send + Sync,
{
    /// Add `amount` points to the user's balance and record a `CHARGE`
    #[tracing::instrument(skip(self))]
    pub async fn charge(&self, user_id: UserId, amount: u64) -> Result<UserPoint, Error> {
        self.commit(user_id, TransactionType::Charge, amount).await
    }
}

impl<B, H> Service<ChargePointRequest> for LedgerService<B, H>
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

    fn call(&mut self, req: ChargePointRequest) -> Self::Future {
        let ledger = self.clone();
        Box::pin(async move { ledger.charge(req.user_id, req.amount).await })
    }
}
