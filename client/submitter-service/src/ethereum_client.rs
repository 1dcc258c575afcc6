// Copyright (C) 2022 Aventus Network Services (UK) Ltd.

use crate::{
    chain::{ReceiptLog, TargetChain, TargetReceipt},
    web3_utils::{
        build_call_request, build_raw_transaction, get_chain_id, get_tx_receipt,
        is_low_nonce_error, secret_key_address, send_raw_transaction, setup_web3_connection,
        Web3Data,
    },
};
use anyhow::Context;
use async_trait::async_trait;
use futures::lock::Mutex;
use secp256k1::SecretKey;
use web3::types::{Address, TransactionReceipt, H256, U256};

/// Signs and sends transactions to the target chain with a single key, keeping a local nonce.
pub struct EthereumClient {
    web3_data: Mutex<Web3Data>,
    signer_key: SecretKey,
    signer_address: Address,
}

impl EthereumClient {
    pub fn new(eth_node_url: &str, signer_key: SecretKey) -> anyhow::Result<Self> {
        let mut web3_data = Web3Data::new();
        web3_data.web3 = setup_web3_connection(eth_node_url);
        if web3_data.web3.is_none() {
            anyhow::bail!("Unable to set up a web3 connection to {}", eth_node_url);
        }

        Ok(Self {
            web3_data: Mutex::new(web3_data),
            signer_address: secret_key_address(&signer_key),
            signer_key,
        })
    }

    async fn sign_and_send(
        &self,
        web3_data: &mut Web3Data,
        to: Address,
        data: &[u8],
        value: U256,
    ) -> anyhow::Result<H256> {
        let tx = build_raw_transaction(web3_data, &self.signer_address, to, data, value).await?;
        let web3 = web3_data.get_web3_instance()?;
        let signed_tx = web3.accounts().sign_transaction(tx, &self.signer_key).await?;

        send_raw_transaction(web3, signed_tx.raw_transaction).await
    }
}

#[async_trait]
impl TargetChain for EthereumClient {
    fn signer_address(&self) -> Address {
        self.signer_address
    }

    async fn chain_id(&self) -> anyhow::Result<u64> {
        let web3_data = self.web3_data.lock().await;
        get_chain_id(web3_data.get_web3_instance()?).await
    }

    async fn call(&self, to: Address, data: Vec<u8>) -> anyhow::Result<Vec<u8>> {
        let web3_data = self.web3_data.lock().await;
        let web3 = web3_data.get_web3_instance()?;
        let result = web3
            .eth()
            .call(build_call_request(to, &data), None)
            .await
            .with_context(|| format!("Error calling contract {:?}", to))?;
        Ok(result.0)
    }

    async fn send_transaction(
        &self,
        to: Address,
        data: Vec<u8>,
        value: U256,
    ) -> anyhow::Result<H256> {
        let mut web3_data = self.web3_data.lock().await;

        let tx_hash = match self.sign_and_send(&mut web3_data, to, &data, value).await {
            Ok(tx_hash) => tx_hash,
            Err(error) if is_low_nonce_error(&error) => {
                log::warn!("💔 submitter: nonce too low, refreshing it and resending: {:?}", error);
                web3_data.get_nonce(&self.signer_address, true).await?;
                self.sign_and_send(&mut web3_data, to, &data, value).await?
            },
            Err(error) => return Err(error),
        };

        web3_data.increment_nonce()?;
        Ok(tx_hash)
    }

    async fn transaction_receipt(&self, tx_hash: H256) -> anyhow::Result<Option<TargetReceipt>> {
        let web3_data = self.web3_data.lock().await;
        let receipt = get_tx_receipt(web3_data.get_web3_instance()?, tx_hash).await?;
        Ok(receipt.map(to_target_receipt))
    }

    async fn reset_nonce(&self) {
        self.web3_data.lock().await.clear_nonce();
    }
}

fn to_target_receipt(receipt: TransactionReceipt) -> TargetReceipt {
    TargetReceipt {
        transaction_hash: receipt.transaction_hash,
        block_number: receipt.block_number.map(|n| n.as_u64()),
        status: receipt.status.map(|s| s.as_u64()),
        logs: receipt
            .logs
            .into_iter()
            .map(|log| ReceiptLog { address: log.address, topics: log.topics })
            .collect(),
    }
}

#[cfg(test)]
#[path = "tests/test_ethereum_client.rs"]
mod test_ethereum_client;
