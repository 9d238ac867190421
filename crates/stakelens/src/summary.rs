//! Staking summary.
//!
//! Combines a classified staking account with three remote figures: the
//! staked token's total supply, the reward vault balance and the token price.
//! The three are fetched concurrently and fail independently. A failed figure
//! never aborts the summary:
//!
//! - raw figures that could not be fetched read [`UNKNOWN`]
//! - derived figures that depended on them read [`ERROR_CALCULATING`]
//! - the staked percentage reads `"0%"` when supply is zero or unknown
//!
//! All arithmetic is exact (see `stakelens-numeric`). Rounding only happens
//! when a figure is rendered.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use serde::Serialize;
use solana_pubkey::Pubkey;
use stakelens_layout::{ClassifiedValue, STAKING_LAYOUT};
use stakelens_numeric::{
    TokenAmount, checked_percentage, clamped_sub, format_percentage, format_plain, format_usd,
    scale_units, usd_value,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cancel::guarded;
use crate::{GatewayError, LedgerSource, PriceFeed, ReadError, StakingType};

/// Placeholder for a raw remote figure that could not be fetched.
pub const UNKNOWN: &str = "unknown";

/// Placeholder for a derived figure whose inputs were unavailable.
pub const ERROR_CALCULATING: &str = "Error calculating";

/// Reward window of the current staking round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundWindow {
    /// Round start
    pub start_time: ClassifiedValue,
    /// Round end
    pub end_time: ClassifiedValue,
    /// Reward rate
    pub rate: ClassifiedValue,
    /// Cumulative stake
    pub total_stake: ClassifiedValue,
    /// Cumulative claim
    pub total_claim: ClassifiedValue,
    /// LM reward rate
    pub lm_rate: ClassifiedValue,
    /// LM cumulative stake
    pub lm_total_stake: ClassifiedValue,
    /// LM cumulative claim
    pub lm_total_claim: ClassifiedValue,
}

/// Flat financial summary of one staking account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingSummary {
    /// ADX or ALP
    pub staking_type: StakingType,
    /// Locked stake in tokens
    pub locked_tokens: String,
    /// Liquid stake in tokens
    pub liquid_tokens: String,
    /// Locked plus liquid
    pub total_staked: String,
    /// Mint of the staked token
    pub staked_token_mint: String,
    /// Rewards already resolved against the vault
    pub resolved_reward_token_amount: ClassifiedValue,
    /// Staked token rewards already resolved
    pub resolved_staked_token_amount: Option<ClassifiedValue>,
    /// LM rewards already resolved
    pub resolved_lm_reward_token_amount: Option<ClassifiedValue>,
    /// LM staked token rewards already resolved
    pub resolved_lm_staked_token_amount: Option<ClassifiedValue>,
    /// Current round, if every window field is present
    pub current_staking_round: Option<RoundWindow>,
    /// Reward vault balance, or [`UNKNOWN`]
    pub reward_vault_balance: String,
    /// Vault balance minus resolved rewards, floored at zero
    pub pending_rewards: String,
    /// Staked token supply, or [`UNKNOWN`]
    pub total_supply: String,
    /// `"25.00%"`
    pub percentage_staked: String,
    /// `"$0.0412"`, or [`UNKNOWN`]
    pub token_price: String,
    /// Quote time, or [`UNKNOWN`]
    pub price_timestamp: String,
    /// USD value of the locked stake
    pub locked_tokens_usd: String,
    /// USD value of the liquid stake
    pub liquid_tokens_usd: String,
    /// USD value of the total stake
    pub total_staked_usd: String,
    /// USD value of the whole supply
    pub total_supply_usd: String,
    /// The whole classified account for audit
    pub full_data: ClassifiedValue,
}

/// Builds [`StakingSummary`] values.
#[derive(Clone, Debug)]
pub struct SummaryBuilder {
    reward_vault: Pubkey,
    staking_layouts: Vec<String>,
}

impl SummaryBuilder {
    /// Builder reading pending rewards from `reward_vault`, treating only the
    /// built-in `staking` layout as staking-shaped.
    pub fn new(reward_vault: Pubkey) -> Self {
        Self {
            reward_vault,
            staking_layouts: vec![STAKING_LAYOUT.to_string()],
        }
    }

    /// Replace the set of staking-shaped layout names.
    pub fn with_staking_layouts<I, S>(mut self, layouts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.staking_layouts = layouts.into_iter().map(Into::into).collect();
        self
    }

    /// Case-insensitive membership in the staking layout set.
    pub fn is_staking_layout(&self, layout: &str) -> bool {
        self.staking_layouts
            .iter()
            .any(|name| name.eq_ignore_ascii_case(layout))
    }

    /// Build the summary for a classified account.
    ///
    /// Returns `Ok(None)` if `layout` is not staking-shaped or the staking
    /// type byte is unknown.
    ///
    /// # Errors
    ///
    /// [`ReadError::MissingField`] if a required field is absent,
    /// [`ReadError::Cancelled`] if `cancel` fires. Gateway failures are not
    /// errors.
    pub async fn build(
        &self,
        tree: &ClassifiedValue,
        layout: &str,
        ledger: &dyn LedgerSource,
        prices: &dyn PriceFeed,
        cancel: &CancellationToken,
    ) -> Result<Option<StakingSummary>, ReadError> {
        if !self.is_staking_layout(layout) {
            debug!(layout, "not a staking layout, no summary");
            return Ok(None);
        }
        let fields = Fields { tree, layout };

        let type_byte = fields.integer("stakingType")?;
        let Some(staking_type) = u8::try_from(type_byte).ok().and_then(StakingType::from_byte)
        else {
            warn!(layout, staking_type = %type_byte, "unknown staking type, no summary");
            return Ok(None);
        };

        let decimals = match fields.get("stakedTokenDecimals").and_then(ClassifiedValue::raw_integer) {
            Some(raw) => u8::try_from(raw).unwrap_or_else(|_| {
                warn!(layout, decimals = %raw, "staked token decimals out of range, assuming default");
                stakelens_ids::DEFAULT_TOKEN_DECIMALS
            }),
            None => {
                warn!(layout, "staked token decimals missing, assuming default");
                stakelens_ids::DEFAULT_TOKEN_DECIMALS
            }
        };

        let locked = scale_units(fields.integer("nbLockedTokens")?, decimals);
        let liquid = scale_units(fields.integer("nbLiquidTokens")?, decimals);
        let total = &locked + &liquid;

        let mint = match fields.require("stakedTokenMint")? {
            ClassifiedValue::PublicKey(key) => *key,
            _ => return Err(fields.missing("stakedTokenMint")),
        };
        let resolved_reward = fields.require("resolvedRewardTokenAmount")?;
        let resolved_reward_raw = fields.integer("resolvedRewardTokenAmount")?;

        let symbol = staking_type.price_symbol();
        let (supply, vault, price) = guarded(cancel, async {
            tokio::join!(
                ledger.token_supply(&mint),
                ledger.token_account_balance(&self.reward_vault),
                prices.latest_price(symbol),
            )
        })
        .await?;

        log_failure(layout, "totalSupply", ledger.label(), &supply);
        log_failure(layout, "rewardVaultBalance", ledger.label(), &vault);
        log_failure(layout, "tokenPrice", symbol, &price);

        let supply_amount = supply.as_ref().ok().map(TokenAmount::to_decimal);
        let percentage_staked = match supply_amount
            .as_ref()
            .and_then(|supply| checked_percentage(&total, supply))
        {
            Some(percentage) => format_percentage(&percentage),
            None => {
                warn!(layout, mint = %mint, "token supply zero or unknown, reporting 0%");
                "0%".to_string()
            }
        };

        let pending_rewards = match &vault {
            Ok(balance) => {
                let resolved = scale_units(resolved_reward_raw, balance.decimals());
                format_plain(&clamped_sub(&balance.to_decimal(), &resolved))
            }
            Err(_) => ERROR_CALCULATING.to_string(),
        };

        let usd = |amount: &BigDecimal| match &price {
            Ok(quote) => format_usd(&usd_value(amount, &quote.price)),
            Err(_) => ERROR_CALCULATING.to_string(),
        };
        let total_supply_usd = supply_amount
            .as_ref()
            .map_or_else(|| ERROR_CALCULATING.to_string(), |supply| usd(supply));

        Ok(Some(StakingSummary {
            staking_type,
            locked_tokens: format_plain(&locked),
            liquid_tokens: format_plain(&liquid),
            total_staked: format_plain(&total),
            staked_token_mint: mint.to_string(),
            resolved_reward_token_amount: resolved_reward.clone(),
            resolved_staked_token_amount: fields.get("resolvedStakedTokenAmount").cloned(),
            resolved_lm_reward_token_amount: fields.get("resolvedLmRewardTokenAmount").cloned(),
            resolved_lm_staked_token_amount: fields.get("resolvedLmStakedTokenAmount").cloned(),
            current_staking_round: fields.round_window("currentStakingRound"),
            reward_vault_balance: vault
                .as_ref()
                .map_or_else(|_| UNKNOWN.to_string(), ToString::to_string),
            pending_rewards,
            total_supply: supply
                .as_ref()
                .map_or_else(|_| UNKNOWN.to_string(), ToString::to_string),
            percentage_staked,
            token_price: price
                .as_ref()
                .map_or_else(|_| UNKNOWN.to_string(), |q| format!("${}", format_plain(&q.price))),
            price_timestamp: price
                .as_ref()
                .map_or_else(|_| UNKNOWN.to_string(), |q| q.as_of.clone()),
            locked_tokens_usd: usd(&locked),
            liquid_tokens_usd: usd(&liquid),
            total_staked_usd: usd(&total),
            total_supply_usd,
            full_data: tree.clone(),
        }))
    }
}

fn log_failure<T>(layout: &str, figure: &str, source: &str, result: &Result<T, GatewayError>) {
    if let Err(error) = result {
        warn!(
            layout,
            figure,
            source,
            error = error.name(),
            reason = %error,
            "gateway call failed, figure degraded"
        );
    }
}

/// Field access that ignores case and underscores, so `nbLockedTokens` and
/// `nb_locked_tokens` name the same field.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn lookup<'t>(tree: &'t ClassifiedValue, name: &str) -> Option<&'t ClassifiedValue> {
    let ClassifiedValue::Struct(members) = tree else {
        return None;
    };
    let wanted = normalize(name);
    members
        .iter()
        .find(|(member, _)| normalize(member) == wanted)
        .map(|(_, value)| value)
}

struct Fields<'t> {
    tree: &'t ClassifiedValue,
    layout: &'t str,
}

impl<'t> Fields<'t> {
    fn get(&self, name: &str) -> Option<&'t ClassifiedValue> {
        lookup(self.tree, name)
    }

    fn missing(&self, name: &str) -> ReadError {
        ReadError::MissingField {
            layout: self.layout.to_string(),
            field: name.to_string(),
        }
    }

    fn require(&self, name: &str) -> Result<&'t ClassifiedValue, ReadError> {
        self.get(name).ok_or_else(|| self.missing(name))
    }

    fn integer(&self, name: &str) -> Result<&'t BigInt, ReadError> {
        self.require(name)?
            .raw_integer()
            .ok_or_else(|| self.missing(name))
    }

    fn round_window(&self, name: &str) -> Option<RoundWindow> {
        let round = self.get(name)?;
        let member = |field: &str| {
            let value = lookup(round, field).cloned();
            if value.is_none() {
                warn!(layout = self.layout, round = name, field, "round field missing");
            }
            value
        };
        Some(RoundWindow {
            start_time: member("startTime")?,
            end_time: member("endTime")?,
            rate: member("rate")?,
            total_stake: member("totalStake")?,
            total_claim: member("totalClaim")?,
            lm_rate: member("lmRate")?,
            lm_total_stake: member("lmTotalStake")?,
            lm_total_claim: member("lmTotalClaim")?,
        })
    }
}
