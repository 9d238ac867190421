//! Built-in Adrena staking layouts.
//!
//! These mirror the camelCase account definitions of the Adrena program IDL
//! so the pipeline works without an IDL file at hand.

use crate::{FieldKind, Layout, RegistryError, SchemaRegistry, TypeDef, account_discriminator};

/// Name of the staking round struct type.
pub const STAKING_ROUND_TYPE: &str = "stakingRound";

/// Name of the staking account layout.
pub const STAKING_LAYOUT: &str = "staking";

/// Number of resolved rounds kept in a staking account.
pub const RESOLVED_ROUNDS_LEN: usize = 32;

/// Reward window shared by the USDC and LM reward tracks.
pub fn staking_round() -> TypeDef {
    TypeDef::new(STAKING_ROUND_TYPE)
        .field("startTime", FieldKind::I64)
        .field("endTime", FieldKind::I64)
        .field("rate", FieldKind::U64)
        .field("totalStake", FieldKind::U64)
        .field("totalClaim", FieldKind::U64)
        .field("lmRate", FieldKind::U64)
        .field("lmTotalStake", FieldKind::U64)
        .field("lmTotalClaim", FieldKind::U64)
}

/// The `Staking` account.
pub fn staking_layout() -> Layout {
    let round = || FieldKind::structure(STAKING_ROUND_TYPE);
    Layout::new(STAKING_LAYOUT)
        .with_discriminator(account_discriminator("Staking"))
        .field("bump", FieldKind::U8)
        .field("stakedTokenDecimals", FieldKind::U8)
        .field("stakingType", FieldKind::U8)
        .field("rewardTokenVaultBump", FieldKind::U8)
        .field("lmRewardTokenVaultBump", FieldKind::U8)
        .field("stakedTokenVaultBump", FieldKind::U8)
        .field("initialized", FieldKind::U8)
        .field("padding", FieldKind::Bytes(1))
        .field("nbLockedTokens", FieldKind::U64)
        .field("nbLiquidTokens", FieldKind::U64)
        .field("stakedTokenMint", FieldKind::PublicKeyRef)
        .field("resolvedRewardTokenAmount", FieldKind::U64)
        .field("resolvedStakedTokenAmount", FieldKind::U64)
        .field("resolvedLmRewardTokenAmount", FieldKind::U64)
        .field("resolvedLmStakedTokenAmount", FieldKind::U64)
        .field("currentStakingRound", round())
        .field("nextStakingRound", round())
        .field(
            "resolvedStakingRounds",
            FieldKind::array(round(), RESOLVED_ROUNDS_LEN),
        )
        .field("registeredResolvedStakingRoundCount", FieldKind::U8)
        .field("padding2", FieldKind::Bytes(7))
}

/// Registry holding the built-in Adrena layouts.
///
/// # Errors
///
/// Never in practice; the definitions are static and consistent.
pub fn adrena_registry() -> Result<SchemaRegistry, RegistryError> {
    let mut registry = SchemaRegistry::new();
    registry.register_type(staking_round())?;
    registry.register(staking_layout())?;
    Ok(registry)
}
