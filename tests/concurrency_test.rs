use std::sync::Arc;

use point_ledger::{
    adapters::database::memory::{MemoryBalanceStore, MemoryHistoryStore},
    Error, LedgerConfig, LedgerService, ReadConsistency, TransactionType,
};
use rstest::*;
use speculoos::prelude::*;

type MemoryLedger = LedgerService<MemoryBalanceStore, MemoryHistoryStore>;

#[fixture]
fn ledger() -> MemoryLedger {
    LedgerService::new(
        Arc::new(MemoryBalanceStore::default()),
        Arc::new(MemoryHistoryStore::default()),
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_charges_are_never_lost(ledger: MemoryLedger) {
    for round in 0..50 {
        let user_id = round + 1;
        let first = tokio::spawn({
            let ledger = ledger.clone();
            async move { ledger.charge(user_id, 100).await }
        });
        let second = tokio::spawn({
            let ledger = ledger.clone();
            async move { ledger.charge(user_id, 100).await }
        });
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        let point = ledger.get_point(user_id).await.unwrap();
        assert_that!(point.point).is_equal_to(200);
        let records = ledger.get_histories(user_id).await.unwrap();
        assert_that!(records).has_length(2);
        assert!(records
            .iter()
            .all(|record| record.kind == TransactionType::Charge && record.amount == 100));
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn balance_is_the_fold_of_committed_operations(ledger: MemoryLedger) {
    const USERS: u64 = 4;
    const TASKS_PER_USER: u64 = 16;

    for user_id in 1..=USERS {
        ledger.charge(user_id, 500).await.unwrap();
    }

    // Mix charges and uses; some uses may be rejected depending on the interleaving
    let tasks = (0..USERS * TASKS_PER_USER)
        .map(|n| {
            let ledger = ledger.clone();
            let user_id = n % USERS + 1;
            tokio::spawn(async move {
                if n % 3 == 0 {
                    ledger.use_point(user_id, 200).await
                } else {
                    ledger.charge(user_id, 10 + n).await
                }
            })
        })
        .collect::<Vec<_>>();
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) | Err(Error::InsufficientBalance { .. }) => {}
            Err(err) => panic!("unexpected error: {err}"),
        }
    }

    for user_id in 1..=USERS {
        let point = ledger.get_point(user_id).await.unwrap();
        let records = ledger.get_histories(user_id).await.unwrap();

        // Replaying the history in commit order gives the balance and never goes negative
        let mut balance: u64 = 0;
        for record in &records {
            balance = match record.kind {
                TransactionType::Charge => balance + record.amount,
                TransactionType::Use => balance
                    .checked_sub(record.amount)
                    .expect("history replays to a negative balance"),
            };
        }
        assert_that!(balance).is_equal_to(point.point);

        // Record ids follow the commit order
        assert!(records.windows(2).all(|pair| pair[0].id < pair[1].id));
        assert!(records
            .windows(2)
            .all(|pair| pair[0].update_millis <= pair[1].update_millis));
    }
}

#[rstest]
#[tokio::test]
async fn charge_then_use_round_trip(ledger: MemoryLedger) {
    ledger.charge(1, 1000).await.unwrap();

    ledger.charge(1, 250).await.unwrap();
    let point = ledger.use_point(1, 250).await.unwrap();

    assert_that!(point.point).is_equal_to(1000);
    let records = ledger.get_histories(1).await.unwrap();
    let tail = records
        .iter()
        .skip(1)
        .map(|record| (record.kind, record.amount))
        .collect::<Vec<_>>();
    assert_that!(tail).is_equal_to(vec![
        (TransactionType::Charge, 250),
        (TransactionType::Use, 250),
    ]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn locked_reads_always_see_paired_history() {
    let ledger = LedgerService::with_config(
        Arc::new(MemoryBalanceStore::default()),
        Arc::new(MemoryHistoryStore::default()),
        LedgerConfig::default().with_read_consistency(ReadConsistency::Locked),
    );

    let writer = tokio::spawn({
        let ledger = ledger.clone();
        async move {
            for _ in 0..200 {
                ledger.charge(1, 10).await.unwrap();
            }
        }
    });

    while !writer.is_finished() {
        // The history is read after the balance, so it can never be behind it
        let point = ledger.get_point(1).await.unwrap();
        let records = ledger.get_histories(1).await.unwrap();
        let charged = records.iter().map(|record| record.amount).sum::<u64>();
        assert!(charged >= point.point);
    }
    writer.await.unwrap();

    assert_that!(ledger.get_point(1).await.unwrap().point).is_equal_to(2000);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unrelated_users_proceed_while_one_is_locked(ledger: MemoryLedger) {
    ledger.charge(1, 100).await.unwrap();
    let guard = ledger.locks().acquire(1).await;

    // User 2 is not blocked by user 1's lock
    let res = tokio::time::timeout(std::time::Duration::from_secs(1), ledger.charge(2, 100)).await;
    assert_that!(res).is_ok().is_ok();

    // User 1 is blocked until the guard is released
    let blocked = tokio::spawn({
        let ledger = ledger.clone();
        async move { ledger.charge(1, 100).await }
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_that!(blocked.is_finished()).is_false();
    assert_that!(ledger.get_point(1).await.unwrap().point).is_equal_to(100);

    drop(guard);
    let res = blocked.await.unwrap();
    assert_that!(res).is_ok().matches(|point| point.point == 200);
}
