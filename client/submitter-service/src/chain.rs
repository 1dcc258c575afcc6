// Copyright (C) 2022 Aventus Network Services (UK) Ltd.

//! The two ledgers the submitter observes and acts on.

use async_trait::async_trait;
use futures::Stream;
use sp_submitter_common::{EraDescriptor, EraIndex, ExternalIndex, SessionIndex};
use std::pin::Pin;
use web3::types::{Address, H256, U256};

/// A session observed at a finalized block. Era reads for the session are made at `block_hash`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FinalizedSession {
    pub block_hash: H256,
    pub session: SessionIndex,
}

/// Finalized sessions, each session index distinct from the previous one.
pub type SessionStream =
    Pin<Box<dyn Stream<Item = anyhow::Result<FinalizedSession>> + Send + 'static>>;

/// Read access to the Substrate chain whose validator set is being bridged.
///
/// Storage reads take the hash of the block they are made at, so that every read of a tick sees
/// the same finalized state.
#[async_trait]
pub trait SourceChain: Send + Sync {
    async fn finalized_head(&self) -> anyhow::Result<H256>;

    /// `None` until the first era has been activated.
    async fn active_era(&self, at: H256) -> anyhow::Result<Option<EraDescriptor>>;

    /// `None` when the bridge has never confirmed an era.
    async fn external_index(&self, at: H256) -> anyhow::Result<Option<ExternalIndex>>;

    async fn era_start_session(
        &self,
        era: EraIndex,
        at: H256,
    ) -> anyhow::Result<Option<SessionIndex>>;

    async fn sessions_per_era(&self) -> anyhow::Result<SessionIndex>;

    /// Ends when the underlying connection is lost. Callers subscribe again to resume.
    async fn subscribe_finalized_sessions(&self) -> anyhow::Result<SessionStream>;
}

/// A log entry of a target chain receipt, reduced to what confirmation needs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReceiptLog {
    pub address: Address,
    pub topics: Vec<H256>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TargetReceipt {
    pub transaction_hash: H256,
    pub block_number: Option<u64>,
    /// `Some(1)` for success, `Some(0)` for a revert.
    pub status: Option<u64>,
    pub logs: Vec<ReceiptLog>,
}

impl TargetReceipt {
    pub fn succeeded(&self) -> bool {
        self.status == Some(1)
    }
}

/// Signing access to the Ethereum chain hosting the service manager contract.
#[async_trait]
pub trait TargetChain: Send + Sync {
    /// Address every transaction is signed with.
    fn signer_address(&self) -> Address;

    async fn chain_id(&self) -> anyhow::Result<u64>;

    /// Read-only contract call, returns the raw ABI encoded result.
    async fn call(&self, to: Address, data: Vec<u8>) -> anyhow::Result<Vec<u8>>;

    /// Signs and broadcasts a transaction, returning its hash as soon as the node accepts it.
    async fn send_transaction(&self, to: Address, data: Vec<u8>, value: U256)
        -> anyhow::Result<H256>;

    /// `None` while the transaction is pending.
    async fn transaction_receipt(&self, tx_hash: H256) -> anyhow::Result<Option<TargetReceipt>>;

    /// Drops any locally cached nonce so the next transaction reads it from the chain.
    async fn reset_nonce(&self);
}
