//! The serializable result of one account read.

use num_bigint::BigInt;
use serde::Serialize;
use solana_pubkey::Pubkey;
use stakelens_layout::{ClassifiedValue, DecodeAttempt};
use stakelens_numeric::{format_plain, scale_units};

use crate::{SourceRole, StakingSummary};

/// Address, owner and balance of the account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    /// Account address (base58)
    pub address: String,
    /// Owning program (base58)
    pub owner: String,
    /// Balance in lamports
    pub lamports: u64,
    /// Balance in SOL, exact
    pub sol_balance: String,
}

impl BasicInfo {
    /// Describe an account from its address, owner and lamport balance.
    pub fn new(address: &Pubkey, owner: &Pubkey, lamports: u64) -> Self {
        let sol = scale_units(&BigInt::from(lamports), stakelens_ids::SOL_DECIMALS);
        Self {
            address: address.to_string(),
            owner: owner.to_string(),
            lamports,
            sol_balance: format_plain(&sol),
        }
    }
}

/// Everything learned about one account.
///
/// Serializes to exactly `basicInfo`, `accountType`, `availableAccountTypes`,
/// `processedAccount` and `summary`. The failed layout attempts and the
/// source role are kept for callers and logs but not serialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountReport {
    /// Address, owner and balance
    pub basic_info: BasicInfo,
    /// Name of the layout that decoded the data
    pub account_type: String,
    /// Every registered layout, in try-order
    pub available_account_types: Vec<String>,
    /// Classified decoded tree
    pub processed_account: ClassifiedValue,
    /// Staking summary, if the layout is staking-shaped
    pub summary: Option<StakingSummary>,
    /// Layouts rejected before the match
    #[serde(skip)]
    pub attempts: Vec<DecodeAttempt>,
    /// Source that served the read
    #[serde(skip)]
    pub role: SourceRole,
}
