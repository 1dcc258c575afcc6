// Copyright (C) 2022 Aventus Network Services (UK) Ltd.

//! Source chain access over the Substrate JSON-RPC WebSocket interface.

use crate::chain::{FinalizedSession, SessionStream, SourceChain};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use codec::Decode;
use frame_metadata::{RuntimeMetadata, RuntimeMetadataPrefixed};
use futures::{future, StreamExt};
use jsonrpsee::{
    core::client::{ClientT, SubscriptionClientT},
    rpc_params,
    ws_client::{WsClient, WsClientBuilder},
};
use serde::Deserialize;
use sp_submitter_common::{
    storage::{
        self, active_era_key, current_session_index_key, eras_start_session_index_key,
        external_index_key, from_rpc_bytes, to_rpc_key,
    },
    EraDescriptor, EraIndex, ExternalIndex, SessionIndex,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use web3::types::H256;

const SUBSCRIBE_FINALIZED_HEADS: &str = "chain_subscribeFinalizedHeads";
const UNSUBSCRIBE_FINALIZED_HEADS: &str = "chain_unsubscribeFinalizedHeads";

#[derive(Debug, Deserialize)]
struct FinalizedHeader {
    number: String,
}

impl FinalizedHeader {
    fn block_number(&self) -> anyhow::Result<u64> {
        u64::from_str_radix(self.number.trim_start_matches("0x"), 16)
            .with_context(|| format!("Invalid block number in header: {}", self.number))
    }
}

/// Source chain client. The WebSocket connection is rebuilt on the next request once it drops.
#[derive(Debug)]
pub struct SubstrateRpcClient {
    url: String,
    client: RwLock<Arc<WsClient>>,
    sessions_per_era: SessionIndex,
}

impl SubstrateRpcClient {
    /// Connects and reads the runtime constants the submitter depends on.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let client = Arc::new(connect(url).await?);

        let sessions_per_era = read_sessions_per_era(&client).await?;
        log::info!(
            "⛓️  submitter: connected to source chain {}, {} sessions per era",
            url,
            sessions_per_era
        );

        Ok(Self { url: url.to_string(), client: RwLock::new(client), sessions_per_era })
    }

    /// The current connection, reconnecting first if the previous one was lost.
    async fn connection(&self) -> anyhow::Result<Arc<WsClient>> {
        {
            let client = self.client.read().await;
            if client.is_connected() {
                return Ok(Arc::clone(&client))
            }
        }

        let mut client = self.client.write().await;
        if !client.is_connected() {
            log::warn!("💔 submitter: connection to source chain {} lost, reconnecting", self.url);
            *client = Arc::new(connect(&self.url).await?);
            log::info!("⛓️  submitter: reconnected to source chain {}", self.url);
        }
        Ok(Arc::clone(&client))
    }

    async fn storage_at<T: Decode>(&self, key: &[u8], at: H256) -> anyhow::Result<Option<T>> {
        get_storage(&*self.connection().await?, key, Some(at)).await
    }
}

#[async_trait]
impl SourceChain for SubstrateRpcClient {
    async fn finalized_head(&self) -> anyhow::Result<H256> {
        self.connection()
            .await?
            .request("chain_getFinalizedHead", rpc_params![])
            .await
            .context("Failed to get the finalized head")
    }

    async fn active_era(&self, at: H256) -> anyhow::Result<Option<EraDescriptor>> {
        self.storage_at(&active_era_key(), at).await
    }

    async fn external_index(&self, at: H256) -> anyhow::Result<Option<ExternalIndex>> {
        self.storage_at(&external_index_key(), at).await
    }

    async fn era_start_session(
        &self,
        era: EraIndex,
        at: H256,
    ) -> anyhow::Result<Option<SessionIndex>> {
        self.storage_at(&eras_start_session_index_key(era), at).await
    }

    async fn sessions_per_era(&self) -> anyhow::Result<SessionIndex> {
        Ok(self.sessions_per_era)
    }

    async fn subscribe_finalized_sessions(&self) -> anyhow::Result<SessionStream> {
        let client = self.connection().await?;
        let subscription = client
            .subscribe::<FinalizedHeader, _>(
                SUBSCRIBE_FINALIZED_HEADS,
                rpc_params![],
                UNSUBSCRIBE_FINALIZED_HEADS,
            )
            .await
            .context("Failed to subscribe to finalized heads")?;

        let sessions = subscription
            .then(move |header| {
                let client = Arc::clone(&client);
                async move {
                    let header = header.map_err(|e| anyhow!("Invalid finalized header: {:?}", e))?;
                    session_at(&client, &header).await
                }
            })
            .scan(None::<SessionIndex>, |last_seen, item| {
                let emitted = match item {
                    Ok(finalized) if *last_seen == Some(finalized.session) => None,
                    Ok(finalized) => {
                        *last_seen = Some(finalized.session);
                        Some(Ok(finalized))
                    },
                    Err(e) => Some(Err(e)),
                };
                future::ready(Some(emitted))
            })
            .filter_map(future::ready);

        Ok(Box::pin(sessions))
    }
}

async fn connect(url: &str) -> anyhow::Result<WsClient> {
    WsClientBuilder::default()
        .build(url)
        .await
        .with_context(|| format!("Failed to connect to source chain at {}", url))
}

async fn session_at(
    client: &WsClient,
    header: &FinalizedHeader,
) -> anyhow::Result<FinalizedSession> {
    let number = header.block_number()?;
    let block_hash: Option<H256> = client
        .request("chain_getBlockHash", rpc_params![number])
        .await
        .with_context(|| format!("Failed to get hash of finalized block {}", number))?;
    let block_hash =
        block_hash.with_context(|| format!("No hash known for finalized block {}", number))?;

    // CurrentIndex is a value query, absent means the genesis session
    let session = get_storage(client, &current_session_index_key(), Some(block_hash))
        .await?
        .unwrap_or_default();
    Ok(FinalizedSession { block_hash, session })
}

async fn get_storage<T: Decode>(
    client: &WsClient,
    key: &[u8],
    at: Option<H256>,
) -> anyhow::Result<Option<T>> {
    let raw: Option<String> = client
        .request("state_getStorage", rpc_params![to_rpc_key(key), at])
        .await
        .with_context(|| format!("Failed to read storage key {}", to_rpc_key(key)))?;

    raw.map(|value| {
        let bytes = from_rpc_bytes(&value)?;
        T::decode(&mut &bytes[..])
            .map_err(|e| anyhow!("Failed to decode storage value {}: {:?}", value, e))
    })
    .transpose()
}

async fn read_sessions_per_era(client: &WsClient) -> anyhow::Result<SessionIndex> {
    let raw: String = client
        .request("state_getMetadata", rpc_params![])
        .await
        .context("Failed to fetch runtime metadata")?;
    let metadata = decode_metadata(&from_rpc_bytes(&raw)?)?;
    let value = pallet_constant(
        &metadata,
        storage::EXTERNAL_VALIDATORS_PALLET,
        storage::SESSIONS_PER_ERA,
    )?;

    SessionIndex::decode(&mut &value[..]).map_err(|e| {
        anyhow!(
            "Failed to decode {}::{}: {:?}",
            storage::EXTERNAL_VALIDATORS_PALLET,
            storage::SESSIONS_PER_ERA,
            e
        )
    })
}

fn decode_metadata(bytes: &[u8]) -> anyhow::Result<RuntimeMetadata> {
    let prefixed = RuntimeMetadataPrefixed::decode(&mut &bytes[..])
        .map_err(|e| anyhow!("Failed to decode runtime metadata: {:?}", e))?;
    Ok(prefixed.1)
}

/// Raw SCALE value of a pallet constant.
fn pallet_constant(
    metadata: &RuntimeMetadata,
    pallet: &str,
    constant: &str,
) -> anyhow::Result<Vec<u8>> {
    let value = match metadata {
        RuntimeMetadata::V14(m) => m
            .pallets
            .iter()
            .find(|p| p.name == pallet)
            .and_then(|p| p.constants.iter().find(|c| c.name == constant))
            .map(|c| c.value.clone()),
        RuntimeMetadata::V15(m) => m
            .pallets
            .iter()
            .find(|p| p.name == pallet)
            .and_then(|p| p.constants.iter().find(|c| c.name == constant))
            .map(|c| c.value.clone()),
        other => return Err(anyhow!("Unsupported metadata version {}", other.version())),
    };

    value.with_context(|| format!("Constant {}::{} not found in metadata", pallet, constant))
}

#[cfg(test)]
#[path = "tests/test_substrate_rpc.rs"]
mod test_substrate_rpc;
