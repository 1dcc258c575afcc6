// Copyright (C) 2022 Aventus Network Services (UK) Ltd.

use codec::{Decode, Encode};

pub mod amount;
pub mod contract;
pub mod storage;

/// Index of an era on the source chain.
pub type EraIndex = u32;
/// Index of a session on the source chain.
pub type SessionIndex = u32;
/// Era the bridge has confirmed on the target chain, mirrored back onto the source chain.
pub type ExternalIndex = u64;
/// Era a validator set is being submitted for.
pub type TargetEra = u64;

/// Number of decimals of the target chain's native unit (wei per ether).
pub const NATIVE_DECIMALS: u32 = 18;

/// Default execution fee, in native units.
pub const DEFAULT_EXECUTION_FEE: &str = "0.1";
/// Default relayer fee, in native units.
pub const DEFAULT_RELAYER_FEE: &str = "0.2";
/// Default network identifier, used to locate the deployment manifest.
pub const DEFAULT_NETWORK: &str = "anvil";
/// Maximum time to wait for a submission receipt.
pub const DEFAULT_RECEIPT_TIMEOUT_SECS: u64 = 120;

/// The currently active era, as stored in `ExternalValidators::ActiveEra`.
///
/// `start` is the timestamp of the era's first block. It stays unset until that block is
/// authored, so it is informational only.
#[derive(Encode, Decode, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EraDescriptor {
    pub index: EraIndex,
    pub start: Option<u64>,
}

/// The era whose validator set must be on the target chain before it begins.
pub fn target_era_for(active_era_index: EraIndex) -> TargetEra {
    TargetEra::from(active_era_index) + 1
}

/// True once `current_session` reaches the final session of the era that started at
/// `era_start_session`.
pub fn is_last_session(
    current_session: SessionIndex,
    era_start_session: SessionIndex,
    sessions_per_era: SessionIndex,
) -> bool {
    let last_session = era_start_session
        .saturating_add(sessions_per_era)
        .saturating_sub(1);

    current_session >= last_session
}

#[cfg(test)]
#[path = "tests/test_era_rules.rs"]
mod test_era_rules;
