// src/errors.rs
//! Error types returned by registry operations.
//!
//! Every error is a local decision failure attributable to the caller (or to
//! the durable journal). No operation partially applies before failing.

use crate::contracts::access_control::AuthError;
use crate::models::{AccountId, Fingerprint};
use crate::storage::event_journal::JournalError;

/// Errors returned by mutating registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Caller lacks the role the action requires.
    #[error("caller 0x{caller:x} is not authorized for this action")]
    Unauthorized { caller: AccountId },

    /// Caller (or target account) is not on the issuer allow-list.
    #[error("account 0x{account:x} is not an approved issuer")]
    IssuerNotApproved { account: AccountId },

    /// Re-approval of an already approved issuer under the strict policy.
    #[error("account 0x{account:x} is already an approved issuer")]
    IssuerAlreadyApproved { account: AccountId },

    #[error("no credential recorded for fingerprint 0x{fingerprint:x}")]
    CredentialNotFound { fingerprint: Fingerprint },

    #[error("credential 0x{fingerprint:x} has been revoked")]
    CredentialAlreadyRevoked { fingerprint: Fingerprint },

    /// A different issuer tried to claim a fingerprint that is already owned.
    #[error("credential 0x{fingerprint:x} is owned by 0x{owner:x}, not 0x{caller:x}")]
    UnauthorizedReissuance {
        fingerprint: Fingerprint,
        owner: AccountId,
        caller: AccountId,
    },

    /// The zero account cannot be approved as an issuer.
    #[error("account 0x{account:x} cannot be used as an issuer")]
    InvalidAccount { account: AccountId },

    #[error(transparent)]
    Journal(#[from] JournalError),
}

impl RegistryError {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "Unauthorized",
            Self::IssuerNotApproved { .. } => "IssuerNotApproved",
            Self::IssuerAlreadyApproved { .. } => "IssuerAlreadyApproved",
            Self::CredentialNotFound { .. } => "CredentialNotFound",
            Self::CredentialAlreadyRevoked { .. } => "CredentialAlreadyRevoked",
            Self::UnauthorizedReissuance { .. } => "UnauthorizedReissuance",
            Self::InvalidAccount { .. } => "InvalidAccount",
            Self::Journal(_) => "JournalFailure",
        }
    }
}

impl From<AuthError> for RegistryError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized { caller } => Self::Unauthorized { caller },
            AuthError::IssuerNotApproved { caller } => Self::IssuerNotApproved { account: caller },
            AuthError::NotFound { fingerprint } => Self::CredentialNotFound { fingerprint },
        }
    }
}
