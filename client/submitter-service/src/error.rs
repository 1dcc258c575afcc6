// Copyright (C) 2022 Aventus Network Services (UK) Ltd.

use std::{error, fmt};
use web3::types::Address;

/// Conditions under which the submitter refuses to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupError {
    SourceChainUnreachable(String),
    TargetChainUnreachable(String),
    AuthorizedSubmitterUnavailable(String),
    UnauthorizedSigner { configured: Address, authorized: Address },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StartupError::SourceChainUnreachable(e) => write!(f, "Source chain unreachable: {}", e),
            StartupError::TargetChainUnreachable(e) => write!(f, "Target chain unreachable: {}", e),
            StartupError::AuthorizedSubmitterUnavailable(e) =>
                write!(f, "Unable to read the authorized validator set submitter: {}", e),
            StartupError::UnauthorizedSigner { configured, authorized } => write!(
                f,
                "Signer {:?} is not the authorized validator set submitter {:?}",
                configured, authorized
            ),
        }
    }
}

impl error::Error for StartupError {}
