//! Summary figures under partial gateway failure and cancellation.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use stakelens::numeric::TokenAmount;
use stakelens::{
    CancellationToken, ERROR_CALCULATING, GatewayError, ReadError, StakingSummary, StakingType,
    UNKNOWN,
};

async fn summarize(ledger: MockLedger, feed: MockPriceFeed) -> Option<StakingSummary> {
    let lens = reader(
        Arc::new(ledger),
        Arc::new(MockLedger::down("fallback")),
        Arc::new(feed),
    );
    lens.read_account(&STAKING_ADDRESS.to_string(), None, &CancellationToken::new())
        .await
        .unwrap()
        .summary
}

#[tokio::test]
async fn test_zero_supply_reports_zero_percent() {
    let account = StakingAccount::default();
    let ledger = healthy_ledger("primary", &account)
        .with_supply(STAKED_MINT, Ok(TokenAmount::from_u64(0, 6)));

    let summary = summarize(ledger, prices()).await.unwrap();
    assert_eq!(summary.total_supply, "0");
    assert_eq!(summary.percentage_staked, "0%");
    assert_eq!(summary.total_supply_usd, "$0.00");
}

#[tokio::test]
async fn test_supply_unavailable() {
    let account = StakingAccount::default();
    let ledger = healthy_ledger("primary", &account).with_supply(
        STAKED_MINT,
        Err(GatewayError::unavailable("primary", "operation timed out")),
    );

    let summary = summarize(ledger, prices()).await.unwrap();
    assert_eq!(summary.total_supply, UNKNOWN);
    assert_eq!(summary.percentage_staked, "0%");
    assert_eq!(summary.total_supply_usd, ERROR_CALCULATING);
    // unaffected figures are still computed
    assert_eq!(summary.total_staked_usd, "$25.00");
    assert_eq!(summary.pending_rewards, "3");
}

#[tokio::test]
async fn test_vault_missing() {
    let account = StakingAccount::default();
    let ledger = healthy_ledger("primary", &account).with_balance(
        VAULT,
        Err(GatewayError::NotFound {
            what: format!("token account {VAULT}"),
        }),
    );

    let summary = summarize(ledger, prices()).await.unwrap();
    assert_eq!(summary.reward_vault_balance, UNKNOWN);
    assert_eq!(summary.pending_rewards, ERROR_CALCULATING);
    assert_eq!(summary.percentage_staked, "25.00%");
}

#[tokio::test]
async fn test_pending_rewards_floor_at_zero() {
    let account = StakingAccount {
        resolved_reward_token_amount: 9_000_000,
        ..StakingAccount::default()
    };
    let summary = summarize(healthy_ledger("primary", &account), prices())
        .await
        .unwrap();
    assert_eq!(summary.reward_vault_balance, "5");
    assert_eq!(summary.pending_rewards, "0");
}

/// The resolved reward amount is in the vault token's units.
#[tokio::test]
async fn test_pending_rewards_use_vault_decimals() {
    let account = StakingAccount {
        resolved_reward_token_amount: 1_250_000_000,
        ..StakingAccount::default()
    };
    let ledger = healthy_ledger("primary", &account)
        .with_balance(VAULT, Ok(TokenAmount::from_u64(4_000_000_000, 9)));

    let summary = summarize(ledger, prices()).await.unwrap();
    assert_eq!(summary.reward_vault_balance, "4");
    assert_eq!(summary.pending_rewards, "2.75");
}

#[tokio::test]
async fn test_price_unavailable() {
    let account = StakingAccount::default();
    let summary = summarize(healthy_ledger("primary", &account), MockPriceFeed::new())
        .await
        .unwrap();

    assert_eq!(summary.token_price, UNKNOWN);
    assert_eq!(summary.price_timestamp, UNKNOWN);
    assert_eq!(summary.locked_tokens_usd, ERROR_CALCULATING);
    assert_eq!(summary.liquid_tokens_usd, ERROR_CALCULATING);
    assert_eq!(summary.total_staked_usd, ERROR_CALCULATING);
    assert_eq!(summary.total_supply_usd, ERROR_CALCULATING);
    assert_eq!(summary.total_staked, "250");
    assert_eq!(summary.percentage_staked, "25.00%");
}

#[tokio::test]
async fn test_every_lookup_fails() {
    let account = StakingAccount::default();
    let ledger = MockLedger::new("primary").with_account(
        STAKING_ADDRESS,
        stakelens::ADRENA_PROGRAM_ID,
        STAKING_LAMPORTS,
        account.bytes(),
    );

    let summary = summarize(ledger, MockPriceFeed::new()).await.unwrap();
    assert_eq!(summary.total_supply, UNKNOWN);
    assert_eq!(summary.reward_vault_balance, UNKNOWN);
    assert_eq!(summary.token_price, UNKNOWN);
    assert_eq!(summary.pending_rewards, ERROR_CALCULATING);
    assert_eq!(summary.percentage_staked, "0%");
    assert_eq!(summary.locked_tokens, "100");
}

#[tokio::test]
async fn test_alp_uses_alp_price() {
    let account = StakingAccount {
        staking_type: 2,
        ..StakingAccount::default()
    };
    let summary = summarize(healthy_ledger("primary", &account), prices())
        .await
        .unwrap();
    assert_eq!(summary.staking_type, StakingType::Alp);
    assert_eq!(summary.token_price, "$1.5");
    assert_eq!(summary.total_staked_usd, "$375.00");
}

#[tokio::test]
async fn test_large_usd_figures_are_grouped() {
    let account = StakingAccount {
        nb_locked_tokens: 1_234_567_890_000,
        ..StakingAccount::default()
    };
    let summary = summarize(healthy_ledger("primary", &account), prices())
        .await
        .unwrap();
    assert_eq!(summary.locked_tokens, "1234567.89");
    assert_eq!(summary.locked_tokens_usd, "$123,456.79");
}

/// An unknown staking type byte yields no summary rather than a guess; the
/// rest of the report is intact.
#[tokio::test]
async fn test_unknown_staking_type() {
    let account = StakingAccount {
        staking_type: 7,
        ..StakingAccount::default()
    };
    let feed = Arc::new(prices());
    let lens = reader(
        Arc::new(healthy_ledger("primary", &account)),
        Arc::new(MockLedger::down("fallback")),
        feed.clone(),
    );

    let report = lens
        .read_account(&STAKING_ADDRESS.to_string(), None, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.account_type, "staking");
    assert!(report.summary.is_none());
    assert_eq!(feed.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_during_lookups() {
    let account = StakingAccount::default();
    let ledger = healthy_ledger("primary", &account).with_delay(Duration::from_secs(60));
    let lens = reader(
        Arc::new(ledger),
        Arc::new(MockLedger::down("fallback")),
        Arc::new(prices()),
    );

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let err = lens
        .read_account(&STAKING_ADDRESS.to_string(), None, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, ReadError::Cancelled));
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let account = StakingAccount::default();
    let primary = Arc::new(healthy_ledger("primary", &account));
    let lens = reader(
        primary.clone(),
        Arc::new(MockLedger::down("fallback")),
        Arc::new(prices()),
    );
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = lens
        .read_account(&STAKING_ADDRESS.to_string(), None, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, ReadError::Cancelled));
    assert_eq!(primary.probes(), 0);
    assert_eq!(primary.account_reads(), 0);
}
