// Copyright (C) 2022 Aventus Network Services (UK) Ltd.

use crate::{
    chain::{FinalizedSession, SessionStream, SourceChain, TargetChain},
    error::StartupError,
    shutdown::ShutdownSignal,
    ticker::{SubmissionTicker, TickOutcome},
};
use futures::StreamExt;
use std::{sync::Arc, time::Duration};
use tokio::{sync::Mutex, task::JoinHandle};

pub const DEFAULT_RESUBSCRIBE_DELAY: Duration = Duration::from_secs(5);

/// Feeds finalized sessions to the ticker, one tick at a time.
///
/// Sessions that arrive while a tick is still running are dropped rather than queued: the next
/// session re-reads all state from the chains anyway.
pub struct SupervisorLoop<S, T>
where
    S: SourceChain + ?Sized + 'static,
    T: TargetChain + ?Sized + 'static,
{
    source: Arc<S>,
    ticker: Arc<Mutex<SubmissionTicker<S, T>>>,
    shutdown: ShutdownSignal,
    resubscribe_delay: Duration,
}

impl<S, T> SupervisorLoop<S, T>
where
    S: SourceChain + ?Sized + 'static,
    T: TargetChain + ?Sized + 'static,
{
    pub fn new(source: Arc<S>, ticker: SubmissionTicker<S, T>, shutdown: ShutdownSignal) -> Self {
        Self {
            source,
            ticker: Arc::new(Mutex::new(ticker)),
            shutdown,
            resubscribe_delay: DEFAULT_RESUBSCRIBE_DELAY,
        }
    }

    pub fn with_resubscribe_delay(mut self, resubscribe_delay: Duration) -> Self {
        self.resubscribe_delay = resubscribe_delay;
        self
    }

    pub fn ticker(&self) -> Arc<Mutex<SubmissionTicker<S, T>>> {
        Arc::clone(&self.ticker)
    }

    /// Verifies both chains answer and that the configured signer may submit validator sets.
    pub async fn self_check(&self) -> Result<(), StartupError> {
        let unreachable =
            |e: anyhow::Error| StartupError::SourceChainUnreachable(format!("{:?}", e));
        let finalized_head = self.source.finalized_head().await.map_err(unreachable)?;
        let active_era = self.source.active_era(finalized_head).await.map_err(unreachable)?;
        let sessions_per_era = self.source.sessions_per_era().await.map_err(unreachable)?;
        log::info!(
            "⛓️  submitter: source chain reachable, active era: {:?}, {} sessions per era",
            active_era,
            sessions_per_era
        );

        let ticker = self.ticker.lock().await;
        let gateway = ticker.gateway();

        let chain_id = gateway
            .chain_id()
            .await
            .map_err(|e| StartupError::TargetChainUnreachable(format!("{:?}", e)))?;
        log::info!("⛓️  submitter: target chain reachable, chain id {}", chain_id);

        let authorized = gateway
            .get_authorized_submitter()
            .await
            .map_err(|e| StartupError::AuthorizedSubmitterUnavailable(format!("{:?}", e)))?;
        let configured = gateway.signer_address();
        if authorized != configured {
            return Err(StartupError::UnauthorizedSigner { configured, authorized })
        }

        log::info!("⛓️  submitter: signer {:?} is the authorized submitter", configured);
        Ok(())
    }

    /// Runs until shutdown. Only a failure of the first subscription is returned as an error, a
    /// session stream that ends later is subscribed to again.
    pub async fn run(&self) -> anyhow::Result<()> {
        let mut sessions = Some(self.source.subscribe_finalized_sessions().await?);
        let mut in_flight: Option<JoinHandle<TickOutcome>> = None;

        while let Some(stream) = sessions.as_mut() {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                next = stream.next() => match next {
                    Some(Ok(finalized)) => {
                        if let Some(handle) = self.dispatch(finalized) {
                            in_flight = Some(handle);
                        }
                    },
                    Some(Err(e)) => {
                        log::error!("💔 submitter: error reading finalized session: {:?}", e);
                    },
                    None => {
                        log::warn!("💔 submitter: finalized session stream ended, resubscribing");
                        sessions = self.resubscribe().await;
                    },
                },
            }
        }

        log::info!("⛓️  submitter: shutting down");
        drop(sessions);
        if let Some(handle) = in_flight {
            match handle.await {
                Ok(outcome) => log::info!("⛓️  submitter: last tick finished: {:?}", outcome),
                Err(e) => log::error!("💔 submitter: last tick did not complete: {:?}", e),
            }
        }

        Ok(())
    }

    /// Subscribes again, retrying every `resubscribe_delay`. `None` once shutdown is requested.
    async fn resubscribe(&self) -> Option<SessionStream> {
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => return None,
                _ = tokio::time::sleep(self.resubscribe_delay) => {},
            }

            match self.source.subscribe_finalized_sessions().await {
                Ok(stream) => {
                    log::info!("⛓️  submitter: resubscribed to finalized sessions");
                    return Some(stream)
                },
                Err(e) => log::error!(
                    "💔 submitter: resubscribing to finalized sessions failed, retrying in {:?}: {:?}",
                    self.resubscribe_delay,
                    e
                ),
            }
        }
    }

    fn dispatch(&self, finalized: FinalizedSession) -> Option<JoinHandle<TickOutcome>> {
        let session = finalized.session;
        match Arc::clone(&self.ticker).try_lock_owned() {
            Ok(mut ticker) => Some(tokio::spawn(async move {
                let outcome = ticker.tick(finalized).await;
                log::debug!("submitter: session {} tick: {:?}", session, outcome);
                outcome
            })),
            Err(_) => {
                log::debug!("submitter: tick in progress, skipping session {}", session);
                None
            },
        }
    }
}

#[cfg(test)]
#[path = "tests/test_supervisor.rs"]
mod test_supervisor;
