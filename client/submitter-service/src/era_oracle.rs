// Copyright (C) 2022 Aventus Network Services (UK) Ltd.

use crate::chain::SourceChain;
use sp_submitter_common::{
    is_last_session, target_era_for, EraDescriptor, ExternalIndex, SessionIndex, TargetEra,
};
use std::sync::Arc;
use web3::types::H256;

/// Answers era questions about the source chain. Holds no state of its own.
pub struct EraOracle<S: SourceChain + ?Sized> {
    source: Arc<S>,
}

impl<S: SourceChain + ?Sized> EraOracle<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    pub async fn active_era(&self, at: H256) -> anyhow::Result<Option<EraDescriptor>> {
        self.source.active_era(at).await
    }

    /// Last era confirmed by the bridge, `0` when none has been.
    pub async fn external_index(&self, at: H256) -> anyhow::Result<ExternalIndex> {
        Ok(self.source.external_index(at).await?.unwrap_or_default())
    }

    pub fn compute_target_era(&self, active_era: &EraDescriptor) -> TargetEra {
        target_era_for(active_era.index)
    }

    /// Whether `current_session` is the final session of `active_era`. An era without a
    /// recorded start session is treated as not yet eligible.
    pub async fn is_last_session_of_era(
        &self,
        active_era: &EraDescriptor,
        current_session: SessionIndex,
        at: H256,
    ) -> anyhow::Result<bool> {
        let Some(start_session) = self.source.era_start_session(active_era.index, at).await?
        else {
            log::warn!(
                "💔 submitter: no start session recorded for era {}, treating session {} as not eligible",
                active_era.index,
                current_session
            );
            return Ok(false)
        };
        let sessions_per_era = self.source.sessions_per_era().await?;

        Ok(is_last_session(current_session, start_session, sessions_per_era))
    }
}

#[cfg(test)]
#[path = "tests/test_era_oracle.rs"]
mod test_era_oracle;
