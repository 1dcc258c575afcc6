// Copyright (C) 2022 Aventus Network Services (UK) Ltd.

//! ABI encoding for the service manager contract and the bridge gateway event that confirms a
//! validator set message was queued.

use crate::TargetEra;
use ethabi::{Address, ParamType, Token};
use ethereum_types::{H256, U256};
use sp_core::hashing::keccak_256;

pub const SEND_NEW_VALIDATOR_SET_FOR_ERA: &str = "sendNewValidatorSetForEra(uint64,uint128,uint128)";
pub const BUILD_NEW_VALIDATOR_SET_MESSAGE_FOR_ERA: &str = "buildNewValidatorSetMessageForEra(uint64)";
pub const VALIDATOR_SET_SUBMITTER: &str = "validatorSetSubmitter()";

/// Canonical signature of the gateway's `OutboundMessageAccepted(uint64 nonce, Payload payload)`.
pub const OUTBOUND_MESSAGE_ACCEPTED: &str =
    "OutboundMessageAccepted(uint64,(address,(uint8,bytes)[],(uint8,bytes),bytes,uint128,uint128,uint128))";

#[derive(Debug, PartialEq, Eq)]
pub enum AbiError {
    InvalidEncoding(String),
    UnexpectedReturnType,
}

impl std::fmt::Display for AbiError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AbiError::InvalidEncoding(e) => write!(f, "Invalid ABI encoding: {}", e),
            AbiError::UnexpectedReturnType => write!(f, "Unexpected ABI return type"),
        }
    }
}

impl std::error::Error for AbiError {}

pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak_256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Topic 0 of the logs emitted for the event with the given canonical signature.
pub fn event_topic(signature: &str) -> H256 {
    H256::from(keccak_256(signature.as_bytes()))
}

fn encode_call(signature: &str, tokens: &[Token]) -> Vec<u8> {
    let mut calldata = function_selector(signature).to_vec();
    calldata.extend_from_slice(&ethabi::encode(tokens));
    calldata
}

pub fn encode_send_new_validator_set_for_era(
    target_era: TargetEra,
    execution_fee: u128,
    relayer_fee: u128,
) -> Vec<u8> {
    encode_call(
        SEND_NEW_VALIDATOR_SET_FOR_ERA,
        &[
            Token::Uint(U256::from(target_era)),
            Token::Uint(U256::from(execution_fee)),
            Token::Uint(U256::from(relayer_fee)),
        ],
    )
}

pub fn encode_build_new_validator_set_message_for_era(target_era: TargetEra) -> Vec<u8> {
    encode_call(BUILD_NEW_VALIDATOR_SET_MESSAGE_FOR_ERA, &[Token::Uint(U256::from(target_era))])
}

pub fn encode_validator_set_submitter() -> Vec<u8> {
    encode_call(VALIDATOR_SET_SUBMITTER, &[])
}

pub fn decode_address(data: &[u8]) -> Result<Address, AbiError> {
    let mut tokens = ethabi::decode(&[ParamType::Address], data)
        .map_err(|e| AbiError::InvalidEncoding(e.to_string()))?;

    match tokens.pop() {
        Some(Token::Address(address)) => Ok(address),
        _ => Err(AbiError::UnexpectedReturnType),
    }
}

pub fn decode_bytes(data: &[u8]) -> Result<Vec<u8>, AbiError> {
    let mut tokens = ethabi::decode(&[ParamType::Bytes], data)
        .map_err(|e| AbiError::InvalidEncoding(e.to_string()))?;

    match tokens.pop() {
        Some(Token::Bytes(bytes)) => Ok(bytes),
        _ => Err(AbiError::UnexpectedReturnType),
    }
}

#[cfg(test)]
#[path = "tests/test_contract.rs"]
mod test_contract;
