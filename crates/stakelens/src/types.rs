//! Core domain types.

use num_enum::TryFromPrimitive;
use serde::Serialize;

/// Which token a staking account stakes.
///
/// Stored as the `stakingType` byte of the staking account.
#[repr(u8)]
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, strum::IntoStaticStr,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum StakingType {
    /// ADX governance token staking
    #[strum(serialize = "ADX")]
    Adx = 1,
    /// ALP liquidity token staking
    #[strum(serialize = "ALP")]
    Alp = 2,
}

impl StakingType {
    /// Display label (`"ADX"`, `"ALP"`).
    pub fn label(self) -> &'static str {
        self.into()
    }

    /// Key of this token in the price service response.
    pub const fn price_symbol(self) -> &'static str {
        match self {
            Self::Adx => "adx",
            Self::Alp => "alp",
        }
    }

    /// Map the raw staking type byte; unknown values yield `None`.
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::try_from(byte).ok()
    }
}
