// Copyright (C) 2022 Aventus Network Services (UK) Ltd.

use clap::Parser;
use std::path::PathBuf;

/// Watches the source chain and submits each new era's validator set to the service manager
/// contract on Ethereum.
///
/// Every option can also be set in the JSON config file. Command line flags win over environment
/// variables, which win over the file.
#[derive(Debug, Default, Parser)]
#[command(name = "validator-set-submitter", version, about)]
pub struct Cli {
    /// JSON config file
    #[arg(long, env = "SUBMITTER_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// WebSocket URL of a source chain node
    #[arg(long = "source-rpc-url", env = "SOURCE_RPC_URL", value_name = "WS URL")]
    pub source_rpc_url: Option<String>,

    /// URL for connecting with an ethereum node
    #[arg(long = "ethereum-node-url", env = "ETHEREUM_NODE_URL", value_name = "ETH URL")]
    pub eth_node_url: Option<String>,

    /// Hex encoded secp256k1 key of the authorized validator set submitter
    #[arg(long, env = "SUBMITTER_PRIVATE_KEY", hide_env_values = true, value_name = "HEX")]
    pub private_key: Option<String>,

    /// Service manager contract. Read from the deployment manifest when omitted.
    #[arg(long, env = "SERVICE_MANAGER_ADDRESS", value_name = "ADDRESS")]
    pub service_manager_address: Option<String>,

    /// Directory holding one `<network>.json` deployment manifest per network
    #[arg(long, value_name = "PATH")]
    pub deployments_dir: Option<PathBuf>,

    /// Execution fee paid with each submission, in ether
    #[arg(long, value_name = "ETH")]
    pub execution_fee: Option<String>,

    /// Relayer fee paid with each submission, in ether
    #[arg(long, value_name = "ETH")]
    pub relayer_fee: Option<String>,

    #[arg(long, env = "NETWORK")]
    pub network: Option<String>,

    /// Build the validator set message but never send a transaction
    #[arg(long)]
    pub dry_run: bool,

    /// Canonical signature of the event that confirms a submission
    #[arg(long, value_name = "SIGNATURE")]
    pub confirmation_event: Option<String>,

    #[arg(long, value_name = "SECONDS")]
    pub receipt_timeout_secs: Option<u64>,
}
