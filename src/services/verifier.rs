// src/services/verifier.rs
//! Credential verification service.
//!
//! Answers read-only queries against the registry. Validity is recomputed on
//! every call from the current record and the current issuer allow-list, so
//! removing an issuer invalidates every credential it ever issued without any
//! record being touched.

use crate::contracts::credential_registry::CredentialRegistry;
use crate::contracts::registry_state::RegistryState;
use crate::models::{AccountId, CredentialDetails, EventEnvelope, Fingerprint, Verification};
use std::sync::Arc;

/// Read-only query engine over a shared [`CredentialRegistry`].
///
/// Queries are open to every caller and never pass through the access
/// control gate.
#[derive(Clone)]
pub struct Verifier {
    registry: Arc<CredentialRegistry>,
}

impl Verifier {
    pub fn new(registry: Arc<CredentialRegistry>) -> Self {
        Self { registry }
    }

    /// Verifies a document fingerprint.
    ///
    /// # Returns
    /// - `{ZERO_ACCOUNT, false, ""}` if the fingerprint was never issued
    /// - otherwise the record's issuer and pointer, with
    ///   `valid = !revoked && issuer is currently approved`
    pub fn verify(&self, fingerprint: &Fingerprint) -> Verification {
        self.get_details(fingerprint).into()
    }

    /// Same as [`Verifier::verify`] plus the revocation flag and creation time.
    pub fn get_details(&self, fingerprint: &Fingerprint) -> CredentialDetails {
        self.registry.read(|state| evaluate(state, fingerprint))
    }

    /// Checks the issuer allow-list.
    ///
    /// # Arguments
    /// * `account` - Account to look up
    ///
    /// # Returns
    /// `true` if `account` is currently an approved issuer.
    pub fn is_approved_issuer(&self, account: &AccountId) -> bool {
        self.registry.read(|state| state.is_approved_issuer(account))
    }

    /// Lists the issuer allow-list.
    ///
    /// # Returns
    /// Currently approved issuers in ascending address order.
    pub fn list_approved_issuers(&self) -> Vec<AccountId> {
        self.registry.read(|state| state.approved_issuers().copied().collect())
    }

    /// Audit events after `sequence`, for indexers catching up.
    pub fn events_since(&self, sequence: u64) -> Vec<EventEnvelope> {
        self.registry.events_since(sequence)
    }
}

fn evaluate(state: &RegistryState, fingerprint: &Fingerprint) -> CredentialDetails {
    match state.record(fingerprint) {
        None => CredentialDetails::unknown(),
        Some(record) => CredentialDetails {
            issuer: record.issuer,
            valid: !record.revoked && state.is_approved_issuer(&record.issuer),
            revoked: record.revoked,
            content_pointer: record.content_pointer.clone(),
            created_at: Some(record.created_at),
        },
    }
}
