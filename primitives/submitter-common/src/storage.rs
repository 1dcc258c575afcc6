// Copyright (C) 2022 Aventus Network Services (UK) Ltd.

//! Storage keys of the source chain items the submitter observes.

use crate::EraIndex;
use codec::Encode;
use sp_core::hashing::{twox_128, twox_64};

pub const SESSION_PALLET: &str = "Session";
pub const CURRENT_INDEX: &str = "CurrentIndex";

pub const EXTERNAL_VALIDATORS_PALLET: &str = "ExternalValidators";
pub const ACTIVE_ERA: &str = "ActiveEra";
pub const EXTERNAL_INDEX: &str = "ExternalIndex";
pub const ERAS_START_SESSION_INDEX: &str = "ErasStartSessionIndex";
pub const SESSIONS_PER_ERA: &str = "SessionsPerEra";

/// Key of a plain storage value: `twox128(pallet) ++ twox128(item)`.
pub fn storage_value_key(pallet: &str, item: &str) -> Vec<u8> {
    let mut key = twox_128(pallet.as_bytes()).to_vec();
    key.extend_from_slice(&twox_128(item.as_bytes()));
    key
}

/// Key of a `Twox64Concat` storage map entry.
pub fn storage_map_key_twox64_concat<K: Encode>(pallet: &str, item: &str, map_key: &K) -> Vec<u8> {
    let encoded = map_key.encode();
    let mut key = storage_value_key(pallet, item);
    key.extend_from_slice(&twox_64(&encoded));
    key.extend_from_slice(&encoded);
    key
}

pub fn current_session_index_key() -> Vec<u8> {
    storage_value_key(SESSION_PALLET, CURRENT_INDEX)
}

pub fn active_era_key() -> Vec<u8> {
    storage_value_key(EXTERNAL_VALIDATORS_PALLET, ACTIVE_ERA)
}

pub fn external_index_key() -> Vec<u8> {
    storage_value_key(EXTERNAL_VALIDATORS_PALLET, EXTERNAL_INDEX)
}

pub fn eras_start_session_index_key(era: EraIndex) -> Vec<u8> {
    storage_map_key_twox64_concat(EXTERNAL_VALIDATORS_PALLET, ERAS_START_SESSION_INDEX, &era)
}

/// Hex form accepted by `state_getStorage`.
pub fn to_rpc_key(key: &[u8]) -> String {
    format!("0x{}", hex::encode(key))
}

/// Decodes a `0x`-prefixed hex string returned by the node.
pub fn from_rpc_bytes(data: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(data.trim_start_matches("0x"))
}

#[cfg(test)]
#[path = "tests/test_storage_keys.rs"]
mod test_storage_keys;
