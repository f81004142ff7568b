// src/models/event.rs
//! Audit events emitted by the registry.
//!
//! Events are append-only. Each one is wrapped in an [`EventEnvelope`] that
//! carries its position in the journal, so indexers can replay them in order
//! and the registry can rebuild its state from them on startup.

use crate::models::credential::{AccountId, Fingerprint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A state transition recorded by the registry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RegistryEvent {
    /// An account was added to the issuer allow-list.
    IssuerApproved {
        issuer: AccountId,
        approver: AccountId,
    },

    /// An account was removed from the issuer allow-list.
    IssuerRevoked {
        issuer: AccountId,
        revoker: AccountId,
    },

    /// A credential was created, or its content pointer replaced by its issuer.
    CredentialIssued {
        fingerprint: Fingerprint,
        issuer: AccountId,
        content_pointer: String,
    },

    /// A credential was revoked. `issuer` is the record's owner, `revoked_by`
    /// the caller (the owner or the administrator).
    CredentialRevoked {
        fingerprint: Fingerprint,
        issuer: AccountId,
        revoked_by: AccountId,
    },
}

impl RegistryEvent {
    /// Short event name used in logs and wire responses.
    pub fn name(&self) -> &'static str {
        match self {
            Self::IssuerApproved { .. } => "IssuerApproved",
            Self::IssuerRevoked { .. } => "IssuerRevoked",
            Self::CredentialIssued { .. } => "CredentialIssued",
            Self::CredentialRevoked { .. } => "CredentialRevoked",
        }
    }
}

/// An event together with its journal ordering.
///
/// # Fields
/// - `sequence`: position in the journal, starting at 1 with no gaps
/// - `recorded_at`: time the event was appended
/// - `event`: the transition itself
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EventEnvelope {
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub event: RegistryEvent,
}
