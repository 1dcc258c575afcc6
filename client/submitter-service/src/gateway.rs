// Copyright (C) 2022 Aventus Network Services (UK) Ltd.

use crate::{
    chain::{TargetChain, TargetReceipt},
    shutdown::ShutdownSignal,
    timer::SubmissionTimer,
};
use anyhow::Context;
use sp_submitter_common::{
    contract::{
        decode_address, decode_bytes, encode_build_new_validator_set_message_for_era,
        encode_send_new_validator_set_for_era, encode_validator_set_submitter, event_topic,
    },
    TargetEra,
};
use std::{sync::Arc, time::Duration};
use web3::types::{Address, H256, U256};

pub const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub contract: Address,
    pub dry_run: bool,
    /// Topic 0 of the event whose presence in the receipt proves the message was queued.
    pub confirmation_topic: H256,
    pub receipt_timeout: Duration,
    pub poll_interval: Duration,
}

impl GatewayConfig {
    pub fn new(
        contract: Address,
        dry_run: bool,
        confirmation_event: &str,
        receipt_timeout: Duration,
    ) -> Self {
        Self {
            contract,
            dry_run,
            confirmation_topic: event_topic(confirmation_event),
            receipt_timeout,
            poll_interval: DEFAULT_RECEIPT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmissionAttempt {
    pub target_era: TargetEra,
    pub execution_fee: u128,
    pub relayer_fee: u128,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionFailure {
    Reverted { tx_hash: H256 },
    ReceiptTimeout { tx_hash: H256 },
    MissingConfirmationEvent { tx_hash: H256 },
    Rpc(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Mined, successful and carrying the confirmation event.
    Confirmed { tx_hash: H256 },
    /// Nothing was sent. `payload` is the message the contract would have built.
    DryRun { payload: Vec<u8> },
    /// Shutdown arrived while waiting for the receipt. The transaction may still be mined.
    Abandoned { tx_hash: H256 },
    Failed(SubmissionFailure),
}

impl SubmissionOutcome {
    /// Whether the ticker may consider the era handled.
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Confirmed { .. } | SubmissionOutcome::DryRun { .. })
    }
}

/// Everything the submitter does on the target chain goes through here.
pub struct TargetChainGateway<T: TargetChain + ?Sized> {
    target: Arc<T>,
    config: GatewayConfig,
    shutdown: ShutdownSignal,
}

impl<T: TargetChain + ?Sized> TargetChainGateway<T> {
    pub fn new(target: Arc<T>, config: GatewayConfig, shutdown: ShutdownSignal) -> Self {
        Self { target, config, shutdown }
    }

    pub fn signer_address(&self) -> Address {
        self.target.signer_address()
    }

    pub async fn chain_id(&self) -> anyhow::Result<u64> {
        self.target.chain_id().await
    }

    /// Address the contract accepts validator set submissions from.
    pub async fn get_authorized_submitter(&self) -> anyhow::Result<Address> {
        let result = self
            .target
            .call(self.config.contract, encode_validator_set_submitter())
            .await
            .context("Error reading validatorSetSubmitter")?;
        Ok(decode_address(&result)?)
    }

    pub async fn submit(&self, attempt: SubmissionAttempt) -> SubmissionOutcome {
        let _timer = SubmissionTimer::new(format!(
            "submitter: submission of the validator set for era {}",
            attempt.target_era
        ));

        if attempt.target_era == 0 {
            return SubmissionOutcome::Failed(SubmissionFailure::Rpc(
                "Era 0 can not be submitted".to_string(),
            ))
        }

        if self.config.dry_run {
            return self.dry_run(attempt.target_era).await
        }

        let Some(value) = attempt.execution_fee.checked_add(attempt.relayer_fee) else {
            return SubmissionOutcome::Failed(SubmissionFailure::Rpc(format!(
                "Fees overflow: {} + {}",
                attempt.execution_fee, attempt.relayer_fee
            )))
        };

        let data = encode_send_new_validator_set_for_era(
            attempt.target_era,
            attempt.execution_fee,
            attempt.relayer_fee,
        );
        let tx_hash =
            match self.target.send_transaction(self.config.contract, data, U256::from(value)).await
            {
                Ok(tx_hash) => tx_hash,
                Err(e) => {
                    log::error!(
                        "💔 submitter: sending validator set for era {} failed: {:?}",
                        attempt.target_era,
                        e
                    );
                    self.target.reset_nonce().await;
                    return SubmissionOutcome::Failed(SubmissionFailure::Rpc(format!("{:?}", e)))
                },
            };

        log::info!(
            "⛓️  submitter: validator set for era {} sent in tx {:?}, waiting for receipt",
            attempt.target_era,
            tx_hash
        );

        let outcome = self.await_outcome(tx_hash).await;
        if !outcome.is_success() {
            self.target.reset_nonce().await;
        }
        outcome
    }

    /// Success requires both a successful status and the confirmation event among the logs.
    pub fn adjudicate_receipt(&self, receipt: &TargetReceipt) -> SubmissionOutcome {
        let tx_hash = receipt.transaction_hash;
        if !receipt.succeeded() {
            log::error!(
                "💔 submitter: tx {:?} reverted in block {:?} (status {:?})",
                tx_hash,
                receipt.block_number,
                receipt.status
            );
            return SubmissionOutcome::Failed(SubmissionFailure::Reverted { tx_hash })
        }

        let confirmation = receipt
            .logs
            .iter()
            .find(|log| log.topics.first() == Some(&self.config.confirmation_topic));

        match confirmation {
            Some(event) => {
                log::info!(
                    "⛓️  submitter: tx {:?} confirmed in block {:?}, event emitted by {:?}",
                    tx_hash,
                    receipt.block_number,
                    event.address
                );
                SubmissionOutcome::Confirmed { tx_hash }
            },
            None => {
                log::error!(
                    "💔 submitter: tx {:?} succeeded in block {:?} without the confirmation event {:?}",
                    tx_hash,
                    receipt.block_number,
                    self.config.confirmation_topic
                );
                SubmissionOutcome::Failed(SubmissionFailure::MissingConfirmationEvent { tx_hash })
            },
        }
    }

    async fn dry_run(&self, target_era: TargetEra) -> SubmissionOutcome {
        let result = self
            .target
            .call(self.config.contract, encode_build_new_validator_set_message_for_era(target_era))
            .await
            .and_then(|raw| Ok(decode_bytes(&raw)?));

        match result {
            Ok(payload) => {
                log::info!(
                    "⛓️  submitter: [dry run] validator set message for era {}: 0x{}",
                    target_era,
                    hex::encode(&payload)
                );
                SubmissionOutcome::DryRun { payload }
            },
            Err(e) => {
                log::error!(
                    "💔 submitter: [dry run] building the message for era {} failed: {:?}",
                    target_era,
                    e
                );
                SubmissionOutcome::Failed(SubmissionFailure::Rpc(format!("{:?}", e)))
            },
        }
    }

    async fn await_outcome(&self, tx_hash: H256) -> SubmissionOutcome {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => {
                log::warn!("💔 submitter: shutting down before tx {:?} was mined", tx_hash);
                SubmissionOutcome::Abandoned { tx_hash }
            },
            receipt = tokio::time::timeout(self.config.receipt_timeout, self.poll_receipt(tx_hash)) => {
                match receipt {
                    Ok(receipt) => self.adjudicate_receipt(&receipt),
                    Err(_) => SubmissionOutcome::Failed(SubmissionFailure::ReceiptTimeout { tx_hash }),
                }
            },
        }
    }

    async fn poll_receipt(&self, tx_hash: H256) -> TargetReceipt {
        loop {
            match self.target.transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => return receipt,
                Ok(None) => {},
                Err(e) => log::warn!("💔 submitter: error reading receipt of {:?}: {:?}", tx_hash, e),
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}

#[cfg(test)]
#[path = "tests/test_gateway.rs"]
mod test_gateway;
