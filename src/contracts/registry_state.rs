// src/contracts/registry_state.rs
//! Registry state and its transition function.
//!
//! [`RegistryState`] holds the issuer allow-list and every credential record.
//! It changes in two steps that the owning [`CredentialRegistry`] runs under
//! one write lock:
//!
//! 1. [`RegistryState::decide`] authorizes the caller, checks ownership and
//!    revocation, and produces the event the command would emit (or `None`
//!    for a no-op).
//! 2. [`RegistryState::apply`] folds a journaled event into the state. The
//!    same function rebuilds state when the journal is replayed on startup,
//!    so live transitions and replay cannot drift apart.
//!
//! [`CredentialRegistry`]: crate::contracts::credential_registry::CredentialRegistry

use crate::contracts::access_control::{AccessControl, Action};
use crate::errors::RegistryError;
use crate::models::{
    AccountId, CredentialRecord, EventEnvelope, Fingerprint, RegistryEvent, ZERO_ACCOUNT,
};
use crate::storage::event_journal::JournalError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// How the registry treats approval requests that would not change anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalPolicy {
    /// Setting an issuer to the state it already has succeeds silently and
    /// emits no event.
    #[default]
    Idempotent,
    /// Re-approving fails with `IssuerAlreadyApproved`; removing an account
    /// that is not approved fails with `IssuerNotApproved`.
    Strict,
}

/// Mutating request, paired with a caller when executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetIssuerApproval {
        issuer: AccountId,
        approved: bool,
    },
    IssueCredential {
        fingerprint: Fingerprint,
        content_pointer: String,
    },
    RevokeCredential {
        fingerprint: Fingerprint,
    },
}

/// In-memory registry state: administrator, issuer allow-list and records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryState {
    administrator: AccountId,
    policy: ApprovalPolicy,
    issuers: BTreeSet<AccountId>,
    credentials: HashMap<Fingerprint, CredentialRecord>,
    last_sequence: u64,
}

impl RegistryState {
    /// Creates an empty registry governed by `administrator`.
    pub fn new(administrator: AccountId, policy: ApprovalPolicy) -> Self {
        Self {
            administrator,
            policy,
            issuers: BTreeSet::new(),
            credentials: HashMap::new(),
            last_sequence: 0,
        }
    }

    /// Account allowed to manage the issuer allow-list.
    pub fn administrator(&self) -> AccountId {
        self.administrator
    }

    /// How redundant approval toggles are treated.
    pub fn policy(&self) -> ApprovalPolicy {
        self.policy
    }

    /// Whether `account` is currently on the issuer allow-list.
    pub fn is_approved_issuer(&self, account: &AccountId) -> bool {
        self.issuers.contains(account)
    }

    /// Approved issuers in ascending address order.
    pub fn approved_issuers(&self) -> impl Iterator<Item = &AccountId> {
        self.issuers.iter()
    }

    /// Looks up the stored record for `fingerprint`.
    ///
    /// # Arguments
    /// * `fingerprint` - Hash identifying the credential
    ///
    /// # Returns
    /// The record, revoked or not, or `None` if it was never issued.
    pub fn record(&self, fingerprint: &Fingerprint) -> Option<&CredentialRecord> {
        self.credentials.get(fingerprint)
    }

    pub fn credential_count(&self) -> usize {
        self.credentials.len()
    }

    /// Sequence number of the last applied event, 0 for an empty registry.
    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    /// Decides the outcome of `command` issued by `caller`.
    ///
    /// # Returns
    /// - `Ok(Some(event))` when the command changes state
    /// - `Ok(None)` for an approval no-op under [`ApprovalPolicy::Idempotent`]
    /// - `Err` when the caller is refused or the record forbids the change
    ///
    /// Ownership of a fingerprint is checked here, in the same step that
    /// produces the event, so no other layer can approve a reissuance the
    /// transition would not.
    pub fn decide(
        &self,
        caller: AccountId,
        command: &Command,
    ) -> Result<Option<RegistryEvent>, RegistryError> {
        let gate = AccessControl::new(self);
        match command {
            Command::SetIssuerApproval { issuer, approved } => {
                gate.authorize(caller, Action::ManageIssuers)?;
                let issuer = *issuer;
                match (*approved, self.issuers.contains(&issuer)) {
                    (true, false) if issuer == ZERO_ACCOUNT => {
                        Err(RegistryError::InvalidAccount { account: issuer })
                    }
                    (true, false) => Ok(Some(RegistryEvent::IssuerApproved {
                        issuer,
                        approver: caller,
                    })),
                    (false, true) => Ok(Some(RegistryEvent::IssuerRevoked {
                        issuer,
                        revoker: caller,
                    })),
                    (true, true) => match self.policy {
                        ApprovalPolicy::Idempotent => Ok(None),
                        ApprovalPolicy::Strict => {
                            Err(RegistryError::IssuerAlreadyApproved { account: issuer })
                        }
                    },
                    (false, false) => match self.policy {
                        ApprovalPolicy::Idempotent => Ok(None),
                        ApprovalPolicy::Strict => {
                            Err(RegistryError::IssuerNotApproved { account: issuer })
                        }
                    },
                }
            }
            Command::IssueCredential {
                fingerprint,
                content_pointer,
            } => {
                gate.authorize(caller, Action::IssueOrUpdate(*fingerprint))?;
                if let Some(record) = self.credentials.get(fingerprint) {
                    if record.issuer != caller {
                        return Err(RegistryError::UnauthorizedReissuance {
                            fingerprint: *fingerprint,
                            owner: record.issuer,
                            caller,
                        });
                    }
                    if record.revoked {
                        return Err(RegistryError::CredentialAlreadyRevoked {
                            fingerprint: *fingerprint,
                        });
                    }
                }
                Ok(Some(RegistryEvent::CredentialIssued {
                    fingerprint: *fingerprint,
                    issuer: caller,
                    content_pointer: content_pointer.clone(),
                }))
            }
            Command::RevokeCredential { fingerprint } => {
                gate.authorize(caller, Action::Revoke(*fingerprint))?;
                let record = self.credentials.get(fingerprint).ok_or(
                    RegistryError::CredentialNotFound {
                        fingerprint: *fingerprint,
                    },
                )?;
                if record.revoked {
                    return Err(RegistryError::CredentialAlreadyRevoked {
                        fingerprint: *fingerprint,
                    });
                }
                Ok(Some(RegistryEvent::CredentialRevoked {
                    fingerprint: *fingerprint,
                    issuer: record.issuer,
                    revoked_by: caller,
                }))
            }
        }
    }

    /// Folds a journaled event into the state.
    ///
    /// Events must arrive in sequence order without gaps. An event that
    /// contradicts the current state (approving an approved issuer, touching
    /// a record owned by someone else, reviving a revoked record) is rejected
    /// and leaves the state untouched.
    pub fn apply(&mut self, envelope: &EventEnvelope) -> Result<(), JournalError> {
        let expected = self.last_sequence + 1;
        if envelope.sequence != expected {
            return Err(JournalError::SequenceGap {
                expected,
                found: envelope.sequence,
            });
        }
        let inconsistent = |reason: &str| JournalError::Inconsistent {
            sequence: envelope.sequence,
            reason: reason.to_string(),
        };

        match &envelope.event {
            RegistryEvent::IssuerApproved { issuer, .. } => {
                if !self.issuers.insert(*issuer) {
                    return Err(inconsistent("issuer approved twice"));
                }
            }
            RegistryEvent::IssuerRevoked { issuer, .. } => {
                if !self.issuers.remove(issuer) {
                    return Err(inconsistent("revoked issuer was not approved"));
                }
            }
            RegistryEvent::CredentialIssued {
                fingerprint,
                issuer,
                content_pointer,
            } => {
                if !self.issuers.contains(issuer) {
                    return Err(inconsistent("credential issued by unapproved account"));
                }
                match self.credentials.get_mut(fingerprint) {
                    Some(record) if record.issuer == *issuer && !record.revoked => {
                        record.content_pointer = content_pointer.clone();
                    }
                    Some(_) => {
                        return Err(inconsistent("reissuance of foreign or revoked credential"))
                    }
                    None => {
                        self.credentials.insert(
                            *fingerprint,
                            CredentialRecord::new(
                                *issuer,
                                content_pointer.clone(),
                                envelope.recorded_at,
                            ),
                        );
                    }
                }
            }
            RegistryEvent::CredentialRevoked {
                fingerprint,
                issuer,
                ..
            } => match self.credentials.get_mut(fingerprint) {
                Some(record) if record.issuer == *issuer && !record.revoked => {
                    record.revoked = true;
                }
                _ => return Err(inconsistent("revocation of missing or revoked credential")),
            },
        }

        self.last_sequence = envelope.sequence;
        Ok(())
    }
}
