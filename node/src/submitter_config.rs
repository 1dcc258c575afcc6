// Copyright (C) 2022 Aventus Network Services (UK) Ltd.

use crate::cli::Cli;
use serde::Deserialize;
use sp_submitter_common::{
    amount::{parse_native_amount, AmountError},
    contract::OUTBOUND_MESSAGE_ACCEPTED,
    DEFAULT_EXECUTION_FEE, DEFAULT_NETWORK, DEFAULT_RECEIPT_TIMEOUT_SECS, DEFAULT_RELAYER_FEE,
};
use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};
use submitter_service::{web3_utils::parse_secret_key, SubmitterConfig};
use web3::types::Address;

pub const DEFAULT_SOURCE_RPC_URL: &str = "ws://127.0.0.1:9944";
pub const DEFAULT_ETH_NODE_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_DEPLOYMENTS_DIR: &str = "./deployments";
const SERVICE_MANAGER_DEPLOYMENT: &str = "ServiceManager";

/// Contents of the optional JSON config file. Every key may be omitted.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileConfig {
    pub source_rpc_url: Option<String>,
    pub ethereum_node_url: Option<String>,
    pub private_key: Option<String>,
    pub service_manager_address: Option<String>,
    pub deployments_dir: Option<PathBuf>,
    pub execution_fee: Option<String>,
    pub relayer_fee: Option<String>,
    pub network: Option<String>,
    pub dry_run: Option<bool>,
    pub confirmation_event: Option<String>,
    pub receipt_timeout_secs: Option<u64>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    ConfigFile { path: PathBuf, reason: String },
    MissingPrivateKey,
    InvalidPrivateKey(String),
    InvalidAddress { field: &'static str, value: String },
    DeploymentManifest { path: PathBuf, reason: String },
    InvalidFee { field: &'static str, value: String, reason: AmountError },
    InvalidReceiptTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::ConfigFile { path, reason } =>
                write!(f, "Unable to load config file {}: {}", path.display(), reason),
            ConfigError::MissingPrivateKey => write!(
                f,
                "No signing key configured. Use --private-key, SUBMITTER_PRIVATE_KEY or privateKey"
            ),
            ConfigError::InvalidPrivateKey(reason) => write!(f, "Invalid private key: {}", reason),
            ConfigError::InvalidAddress { field, value } =>
                write!(f, "Invalid address for {}: {}", field, value),
            ConfigError::DeploymentManifest { path, reason } => write!(
                f,
                "Unable to read the service manager address from {}: {}",
                path.display(),
                reason
            ),
            ConfigError::InvalidFee { field, value, reason } =>
                write!(f, "Invalid {} {:?}: {}", field, value, reason),
            ConfigError::InvalidReceiptTimeout =>
                write!(f, "Receipt timeout must be at least one second"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize)]
struct DeploymentManifest {
    #[serde(rename = "ServiceManager")]
    service_manager: Option<String>,
}

pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ConfigFile { path: path.to_path_buf(), reason: e.to_string() })?;
    serde_json::from_str(&contents)
        .map_err(|e| ConfigError::ConfigFile { path: path.to_path_buf(), reason: e.to_string() })
}

/// Resolves the final configuration from the command line, the environment and the config file.
pub fn resolve(cli: Cli) -> Result<SubmitterConfig, ConfigError> {
    let file = match &cli.config {
        Some(path) => load_file_config(path)?,
        None => FileConfig::default(),
    };
    resolve_with_file(cli, file)
}

pub fn resolve_with_file(cli: Cli, file: FileConfig) -> Result<SubmitterConfig, ConfigError> {
    let private_key =
        cli.private_key.or(file.private_key).ok_or(ConfigError::MissingPrivateKey)?;
    let signer_key = parse_secret_key(&private_key)
        .map_err(|e| ConfigError::InvalidPrivateKey(format!("{:#}", e)))?;

    let network = cli.network.or(file.network).unwrap_or_else(|| DEFAULT_NETWORK.to_string());

    let service_manager_address =
        match cli.service_manager_address.or(file.service_manager_address) {
            Some(address) => parse_address("service manager address", &address)?,
            None => {
                let deployments_dir = cli
                    .deployments_dir
                    .or(file.deployments_dir)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DEPLOYMENTS_DIR));
                read_deployed_service_manager(&deployments_dir, &network)?
            },
        };

    let execution_fee = parse_fee(
        "execution fee",
        cli.execution_fee.or(file.execution_fee).as_deref().unwrap_or(DEFAULT_EXECUTION_FEE),
    )?;
    let relayer_fee = parse_fee(
        "relayer fee",
        cli.relayer_fee.or(file.relayer_fee).as_deref().unwrap_or(DEFAULT_RELAYER_FEE),
    )?;

    let receipt_timeout_secs = cli
        .receipt_timeout_secs
        .or(file.receipt_timeout_secs)
        .unwrap_or(DEFAULT_RECEIPT_TIMEOUT_SECS);
    if receipt_timeout_secs == 0 {
        return Err(ConfigError::InvalidReceiptTimeout)
    }

    Ok(SubmitterConfig {
        source_rpc_url: cli
            .source_rpc_url
            .or(file.source_rpc_url)
            .unwrap_or_else(|| DEFAULT_SOURCE_RPC_URL.to_string()),
        eth_node_url: cli
            .eth_node_url
            .or(file.ethereum_node_url)
            .unwrap_or_else(|| DEFAULT_ETH_NODE_URL.to_string()),
        signer_key,
        service_manager_address,
        execution_fee,
        relayer_fee,
        network,
        dry_run: cli.dry_run || file.dry_run.unwrap_or(false),
        confirmation_event: cli
            .confirmation_event
            .or(file.confirmation_event)
            .unwrap_or_else(|| OUTBOUND_MESSAGE_ACCEPTED.to_string()),
        receipt_timeout: Duration::from_secs(receipt_timeout_secs),
    })
}

/// Path of the deployment manifest of `network`.
pub fn manifest_path(deployments_dir: &Path, network: &str) -> PathBuf {
    deployments_dir.join(format!("{}.json", network))
}

fn read_deployed_service_manager(
    deployments_dir: &Path,
    network: &str,
) -> Result<Address, ConfigError> {
    let path = manifest_path(deployments_dir, network);
    let manifest_error =
        |reason: String| ConfigError::DeploymentManifest { path: path.clone(), reason };

    let contents = std::fs::read_to_string(&path).map_err(|e| manifest_error(e.to_string()))?;
    let manifest: DeploymentManifest =
        serde_json::from_str(&contents).map_err(|e| manifest_error(e.to_string()))?;
    let address = manifest
        .service_manager
        .ok_or_else(|| manifest_error(format!("no {} entry", SERVICE_MANAGER_DEPLOYMENT)))?;

    log::debug!("service manager {} read from {}", address, path.display());
    parse_address("deployed service manager address", &address)
}

fn parse_address(field: &'static str, value: &str) -> Result<Address, ConfigError> {
    let invalid = || ConfigError::InvalidAddress { field, value: value.to_string() };
    let bytes = hex::decode(value.trim().trim_start_matches("0x")).map_err(|_| invalid())?;
    if bytes.len() != Address::len_bytes() {
        return Err(invalid())
    }
    Ok(Address::from_slice(&bytes))
}

fn parse_fee(field: &'static str, value: &str) -> Result<u128, ConfigError> {
    parse_native_amount(value).map_err(|reason| ConfigError::InvalidFee {
        field,
        value: value.to_string(),
        reason,
    })
}

#[cfg(test)]
#[path = "tests/test_submitter_config.rs"]
mod test_submitter_config;
