// Copyright (C) 2022 Aventus Network Services (UK) Ltd.

use secp256k1::SecretKey;
use std::{sync::Arc, time::Duration};
use web3::types::Address;

pub mod chain;
pub mod era_oracle;
pub mod error;
pub mod ethereum_client;
pub mod gateway;
pub mod shutdown;
pub mod substrate_rpc;
pub mod supervisor;
pub mod ticker;
pub mod timer;
pub mod web3_utils;

use crate::{
    era_oracle::EraOracle,
    ethereum_client::EthereumClient,
    gateway::{GatewayConfig, TargetChainGateway},
    shutdown::ShutdownSignal,
    substrate_rpc::SubstrateRpcClient,
    supervisor::SupervisorLoop,
    ticker::{SubmissionFees, SubmissionTicker},
};
pub use crate::web3_utils::{public_key_address, secret_key_address};
pub use sp_submitter_common as common;

/// Configuration resolved once at startup. Never changes for the lifetime of the process.
#[derive(Clone)]
pub struct SubmitterConfig {
    pub source_rpc_url: String,
    pub eth_node_url: String,
    pub signer_key: SecretKey,
    pub service_manager_address: Address,
    pub execution_fee: u128,
    pub relayer_fee: u128,
    pub network: String,
    pub dry_run: bool,
    pub confirmation_event: String,
    pub receipt_timeout: Duration,
}

impl SubmitterConfig {
    pub fn signer_address(&self) -> Address {
        secret_key_address(&self.signer_key)
    }
}

/// Connects to both chains, runs the startup self-check and then drives submissions until
/// `shutdown` fires. Any error returned here should terminate the process.
pub async fn start(config: SubmitterConfig, shutdown: ShutdownSignal) -> anyhow::Result<()> {
    log::info!(
        "⛓️  validator-set-submitter: starting on network {} for contract {:?} (signer {:?}, dry run: {})",
        config.network,
        config.service_manager_address,
        config.signer_address(),
        config.dry_run,
    );

    let source = Arc::new(
        SubstrateRpcClient::new(&config.source_rpc_url)
            .await
            .map_err(|e| error::StartupError::SourceChainUnreachable(format!("{:?}", e)))?,
    );
    let target = Arc::new(
        EthereumClient::new(&config.eth_node_url, config.signer_key)
            .map_err(|e| error::StartupError::TargetChainUnreachable(format!("{:?}", e)))?,
    );

    let gateway = TargetChainGateway::new(
        target,
        GatewayConfig::new(
            config.service_manager_address,
            config.dry_run,
            &config.confirmation_event,
            config.receipt_timeout,
        ),
        shutdown.clone(),
    );
    let ticker = SubmissionTicker::new(
        EraOracle::new(Arc::clone(&source)),
        gateway,
        SubmissionFees { execution_fee: config.execution_fee, relayer_fee: config.relayer_fee },
    );

    let supervisor = SupervisorLoop::new(source, ticker, shutdown);
    supervisor.self_check().await?;
    supervisor.run().await
}

#[cfg(test)]
#[path = "tests/mock.rs"]
mod mock;
