// Copyright (C) 2022 Aventus Network Services (UK) Ltd.

use crate::{
    chain::{FinalizedSession, SourceChain, TargetChain},
    era_oracle::EraOracle,
    gateway::{SubmissionAttempt, SubmissionOutcome, TargetChainGateway},
};
use sp_submitter_common::TargetEra;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmissionFees {
    pub execution_fee: u128,
    pub relayer_fee: u128,
}

/// What a single tick decided.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No era is active yet.
    NotReady,
    AlreadyCaughtUp { target_era: TargetEra },
    NotYetEligible { target_era: TargetEra },
    Confirmed { target_era: TargetEra },
    Failed { target_era: TargetEra, outcome: SubmissionOutcome },
    /// A source chain read failed, nothing was submitted.
    Errored(String),
}

/// Decides, once per finalized session, whether the next era's validator set must be submitted.
///
/// `submitted_era` is the highest era known to be handled. It only moves forward, either
/// because a submission succeeded or because the bridge reports the era as already confirmed.
pub struct SubmissionTicker<S: SourceChain + ?Sized, T: TargetChain + ?Sized> {
    oracle: EraOracle<S>,
    gateway: TargetChainGateway<T>,
    fees: SubmissionFees,
    submitted_era: Option<TargetEra>,
}

impl<S: SourceChain + ?Sized, T: TargetChain + ?Sized> SubmissionTicker<S, T> {
    pub fn new(oracle: EraOracle<S>, gateway: TargetChainGateway<T>, fees: SubmissionFees) -> Self {
        Self { oracle, gateway, fees, submitted_era: None }
    }

    pub fn gateway(&self) -> &TargetChainGateway<T> {
        &self.gateway
    }

    pub fn submitted_era(&self) -> Option<TargetEra> {
        self.submitted_era
    }

    /// Every source chain read of the tick is made at `finalized.block_hash`.
    pub async fn tick(&mut self, finalized: FinalizedSession) -> TickOutcome {
        match self.evaluate(finalized).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!(
                    "💔 submitter: tick for session {} at block {:?} failed: {:?}",
                    finalized.session,
                    finalized.block_hash,
                    e
                );
                TickOutcome::Errored(format!("{:?}", e))
            },
        }
    }

    async fn evaluate(&mut self, finalized: FinalizedSession) -> anyhow::Result<TickOutcome> {
        let FinalizedSession { block_hash: at, session: current_session } = finalized;
        let Some(active_era) = self.oracle.active_era(at).await? else {
            log::debug!("submitter: no active era yet at session {}", current_session);
            return Ok(TickOutcome::NotReady)
        };
        let target_era = self.oracle.compute_target_era(&active_era);

        if matches!(self.submitted_era, Some(submitted) if submitted == target_era) {
            return Ok(TickOutcome::AlreadyCaughtUp { target_era })
        }

        let external_index = self.oracle.external_index(at).await?;
        if external_index >= target_era {
            log::info!(
                "⛓️  submitter: era {} already confirmed by the bridge (external index {})",
                target_era,
                external_index
            );
            self.raise_watermark(target_era);
            return Ok(TickOutcome::AlreadyCaughtUp { target_era })
        }

        if !self.oracle.is_last_session_of_era(&active_era, current_session, at).await? {
            return Ok(TickOutcome::NotYetEligible { target_era })
        }

        log::info!(
            "⛓️  submitter: session {} is the last of era {}, submitting validator set for era {}",
            current_session,
            active_era.index,
            target_era
        );
        let outcome = self
            .gateway
            .submit(SubmissionAttempt {
                target_era,
                execution_fee: self.fees.execution_fee,
                relayer_fee: self.fees.relayer_fee,
            })
            .await;

        if outcome.is_success() {
            self.raise_watermark(target_era);
            log::info!("⛓️  submitter: era {} handled: {:?}", target_era, outcome);
            Ok(TickOutcome::Confirmed { target_era })
        } else {
            log::error!("💔 submitter: submission for era {} failed: {:?}", target_era, outcome);
            Ok(TickOutcome::Failed { target_era, outcome })
        }
    }

    fn raise_watermark(&mut self, era: TargetEra) {
        if self.submitted_era.map_or(true, |submitted| submitted < era) {
            self.submitted_era = Some(era);
        }
    }
}

#[cfg(test)]
#[path = "tests/test_ticker.rs"]
mod test_ticker;
