// Copyright (C) 2022 Aventus Network Services (UK) Ltd.

use anyhow::{ensure, Context};
use jsonrpc_core::{Error as RPCError, ErrorCode};
use secp256k1::{All, PublicKey, Secp256k1, SecretKey};
use web3::{
    signing::keccak256,
    transports::Http,
    types::{Address, Bytes, CallRequest, TransactionParameters, TransactionReceipt, H256, U256},
    Web3,
};

pub struct Web3Data {
    pub web3: Option<Web3<Http>>,
    nonce: Option<u64>,
}

impl Web3Data {
    pub fn new() -> Self {
        Web3Data { web3: None, nonce: None }
    }

    /// Updates the web3 nonce value if needed. If the force_update flag is set to true then it
    /// always does.
    pub async fn get_nonce(
        &mut self,
        sender_eth_address: &Address,
        force_update: bool,
    ) -> anyhow::Result<u64> {
        let web3 = self.get_web3_instance()?;
        let nonce = match self.nonce {
            Some(nonce) if !force_update => nonce,
            _ => get_nonce_from_ethereum(web3, sender_eth_address)
                .await
                .context("Error while getting nonce from Ethereum")?
                .low_u64(),
        };

        self.nonce = Some(nonce);
        log::info!("⛓️  submitter: web3 nonce value: {}", nonce);
        Ok(nonce)
    }

    pub fn increment_nonce(&mut self) -> anyhow::Result<()> {
        let nonce = self.nonce.context("Invalid nonce (None)")?;
        self.nonce = Some(nonce + 1);
        Ok(())
    }

    pub fn clear_nonce(&mut self) {
        self.nonce = None;
    }

    pub fn get_web3_instance(&self) -> anyhow::Result<&Web3<Http>> {
        self.web3.as_ref().context("No web3 instance available.")
    }
}

pub fn setup_web3_connection(url: &str) -> Option<Web3<Http>> {
    let transport = web3::transports::Http::new(url).ok()?;
    Some(web3::Web3::new(transport))
}

pub async fn get_nonce_from_ethereum(
    web3: &Web3<Http>,
    sender_eth_address: &Address,
) -> anyhow::Result<U256> {
    // Pending, so that transactions still in the pool are accounted for
    Ok(web3
        .eth()
        .transaction_count(*sender_eth_address, Some(web3::types::BlockNumber::Pending))
        .await?)
}

pub async fn build_raw_transaction(
    web3_data: &mut Web3Data,
    sender_eth_address: &Address,
    recipient: Address,
    data: &[u8],
    value: U256,
) -> anyhow::Result<TransactionParameters> {
    let nonce = web3_data.get_nonce(sender_eth_address, false).await?;
    let web3 = web3_data.get_web3_instance()?;
    let gas_estimate = estimate_gas(web3, sender_eth_address, recipient, data, value).await?;

    Ok(TransactionParameters {
        nonce: Some(nonce.into()),
        to: Some(recipient),
        value,
        gas: gas_estimate,
        gas_price: None,
        data: Bytes(data.to_vec()),
        chain_id: Some(get_chain_id(web3).await?),
        ..Default::default()
    })
}

pub fn build_call_request(recipient: Address, data: &[u8]) -> CallRequest {
    CallRequest { to: Some(recipient), data: Some(Bytes(data.to_vec())), ..Default::default() }
}

pub async fn get_chain_id(web3: &Web3<Http>) -> anyhow::Result<u64> {
    Ok(web3
        .eth()
        .chain_id()
        .await
        .with_context(|| "Error getting chain Id".to_string())?
        .as_u64())
}

async fn estimate_gas(
    web3: &Web3<Http>,
    sender: &Address,
    recipient: Address,
    data: &[u8],
    value: U256,
) -> anyhow::Result<U256> {
    let call_request = CallRequest {
        from: Some(*sender),
        to: Some(recipient),
        gas: None,
        gas_price: None,
        value: Some(value),
        data: Some(Bytes(data.to_vec())),
        access_list: None,
        max_fee_per_gas: None,
        max_priority_fee_per_gas: None,
        transaction_type: None,
    };

    Ok(web3.eth().estimate_gas(call_request.clone(), None).await.with_context(|| {
        format!(
            "Error estimating gas for data: {}",
            serde_json::to_string_pretty(&call_request).unwrap_or(format!("{:?}", call_request))
        )
    })?)
}

pub async fn get_tx_receipt(
    web3: &Web3<Http>,
    tx_hash: H256,
) -> anyhow::Result<Option<TransactionReceipt>> {
    Ok(web3.eth().transaction_receipt(tx_hash).await?)
}

pub async fn send_raw_transaction(web3: &Web3<Http>, tx: Bytes) -> anyhow::Result<H256> {
    Ok(web3
        .eth()
        .send_raw_transaction(tx)
        .await
        .context("Error while sending raw transaction to Ethereum")?)
}

// Parses the error message and identifies if the error is related with the nonce
// https://github.com/ethereum/go-ethereum/blob/v1.10.26/core/error.go#L48
pub fn error_due_to_low_nonce(error: &RPCError) -> bool {
    // Expecting a ServerError with default value (-32000) when nonce used is too low:
    // Rpc(Error { code: ServerError(-32000), message: "nonce too low", data: None })
    // https://github.com/ethereum/go-ethereum/blob/v1.10.26/rpc/json.go#L109-L123
    if error.code == ErrorCode::ServerError(-32000_i64) {
        let error_msg = error.to_string().to_lowercase();
        return error_msg.contains("the tx doesn't have the correct nonce") ||
            error_msg.contains("nonce too low")
    }
    false
}

/// True when the anyhow chain wraps a web3 RPC error caused by a stale nonce.
pub fn is_low_nonce_error(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<web3::Error>(),
        Some(web3::Error::Rpc(rpc_error)) if error_due_to_low_nonce(rpc_error)
    )
}

pub fn parse_secret_key(private_key: &str) -> anyhow::Result<SecretKey> {
    let bytes = hex::decode(private_key.trim().trim_start_matches("0x"))
        .context("Private key is not valid hex")?;
    ensure!(bytes.len() == 32, "Private key must be 32 bytes, got {}", bytes.len());
    SecretKey::from_slice(&bytes).context("Private key is not a valid secp256k1 secret key")
}

// Based and refactored from: https://github.com/tomusdrw/rust-web3/blob/v0.18.0/src/signing.rs#L151-L172

/// Gets the address of a public key.
///
/// The public address is defined as the low 20 bytes of the keccak hash of
/// the public key. Note that the public key returned from the `secp256k1`
/// crate is 65 bytes long, that is because it is prefixed by `0x04` to
/// indicate an uncompressed public key; this first byte is ignored when
/// computing the hash.
pub fn public_key_address(public_key: &PublicKey) -> Address {
    let uncompressed_key_flag = 0x04;
    let ethereum_address_start_index = 12;
    let public_key = public_key.serialize_uncompressed();

    debug_assert_eq!(public_key[0], uncompressed_key_flag);
    let hash = keccak256(&public_key[1..]);

    Address::from_slice(&hash[ethereum_address_start_index..])
}

/// Gets the public address of a private key.
pub fn secret_key_address(key: &SecretKey) -> Address {
    let secp: Secp256k1<All> = Secp256k1::new();
    let public_key = PublicKey::from_secret_key(&secp, key);
    public_key_address(&public_key)
}

#[cfg(test)]
#[path = "tests/test_web3_utils.rs"]
mod test_web3_utils;
