use std::task::{Context, Poll};

use tower::Service;

use crate::{
    config::AccountPolicy,
    domain::{PointHistory, UserId},
    ports::{balance::BalanceStorePort, history::HistoryStorePort},
};

use super::{BoxFuture, Error, LedgerService};

pub struct GetHistoriesRequest {
    pub user_id: UserId,
}

impl<B, H> LedgerService<B, H>
where
    B: BalanceStorePort + Send + Sync,
    H: HistoryStorePort + Send + Sync,
{
    /// Every charge and use of the user, in commit order
    #[tracing::instrument(skip(self))]
    pub async fn get_histories(&self, user_id: UserId) -> Result<Vec<PointHistory>, Error> {
        let _guard = self.read_guard(user_id).await;

        if self.config.account_policy == AccountPolicy::RequireExisting
            && self.balances.get_point(user_id).await?.is_none()
        {
            return Err(Error::AccountNotFound(user_id));
        }

        Ok(self.histories.list_by_user(user_id).await?)
    }
}

impl<B, H> Service<GetHistoriesRequest> for LedgerService<B, H>
where
    B: BalanceStorePort + Send + Sync + 'static,
    H: HistoryStorePort + Send + Sync + 'static,
{
    type Response = Vec<PointHistory>;
    type Error = Error;
    type Future = BoxFuture<Vec<PointHistory>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: GetHistoriesRequest) -> Self::Future {
        let ledger = self.clone();
        Box::pin(async move { ledger.get_histories(req.user_id).await })
    }
}
