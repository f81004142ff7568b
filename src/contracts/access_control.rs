// src/contracts/access_control.rs
//! Access control gate.
//!
//! Evaluates a caller against the administrator role and the issuer
//! allow-list before any mutation is applied. The gate only reads registry
//! state; it never changes it.

use crate::contracts::registry_state::RegistryState;
use crate::models::{AccountId, Fingerprint};

/// Mutation a caller is asking to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Add or remove accounts on the issuer allow-list.
    ManageIssuers,
    /// Create a credential or replace its content pointer.
    IssueOrUpdate(Fingerprint),
    /// Revoke an existing credential.
    Revoke(Fingerprint),
}

/// Reason the gate refused an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("caller 0x{caller:x} lacks the required role")]
    Unauthorized { caller: AccountId },

    #[error("caller 0x{caller:x} is not an approved issuer")]
    IssuerNotApproved { caller: AccountId },

    #[error("no credential recorded for fingerprint 0x{fingerprint:x}")]
    NotFound { fingerprint: Fingerprint },
}

/// Read-only view over registry state used to authorize callers.
pub struct AccessControl<'a> {
    state: &'a RegistryState,
}

impl<'a> AccessControl<'a> {
    pub fn new(state: &'a RegistryState) -> Self {
        Self { state }
    }

    /// Decides whether `caller` may perform `action` against current state.
    ///
    /// # Rules
    /// - `ManageIssuers`: administrator only
    /// - `IssueOrUpdate`: caller must be an approved issuer right now
    /// - `Revoke`: administrator or the record's issuer; the record must exist
    ///
    /// Ownership of an existing record is not checked for `IssueOrUpdate`;
    /// that belongs to the issuance transition itself.
    pub fn authorize(&self, caller: AccountId, action: Action) -> Result<(), AuthError> {
        match action {
            Action::ManageIssuers => {
                if caller == self.state.administrator() {
                    Ok(())
                } else {
                    Err(AuthError::Unauthorized { caller })
                }
            }
            Action::IssueOrUpdate(_) => {
                if self.state.is_approved_issuer(&caller) {
                    Ok(())
                } else {
                    Err(AuthError::IssuerNotApproved { caller })
                }
            }
            Action::Revoke(fingerprint) => {
                let record = self
                    .state
                    .record(&fingerprint)
                    .ok_or(AuthError::NotFound { fingerprint })?;
                if caller == self.state.administrator() || caller == record.issuer {
                    Ok(())
                } else {
                    Err(AuthError::Unauthorized { caller })
                }
            }
        }
    }
}
