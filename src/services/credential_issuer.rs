// src/services/credential_issuer.rs
//! Credential Issuer Service
//!
//! Mutating entry points of the registry: issuer allow-list management for
//! the administrator, and credential issuance and revocation for issuers.
//! Every call carries the caller's account, which the transport has already
//! authenticated.

use crate::contracts::credential_registry::CredentialRegistry;
use crate::contracts::registry_state::Command;
use crate::errors::RegistryError;
use crate::models::{AccountId, EventEnvelope, Fingerprint};
use std::sync::Arc;

/// Service for managing issuers and credentials in the registry.
///
/// Each method returns the audit event it produced, or `None` when the call
/// was an accepted no-op (an approval toggle that changed nothing).
#[derive(Clone)]
pub struct CredentialIssuer {
    registry: Arc<CredentialRegistry>,
}

impl CredentialIssuer {
    pub fn new(registry: Arc<CredentialRegistry>) -> Self {
        Self { registry }
    }

    /// Adds `issuer` to or removes it from the allow-list.
    ///
    /// # Arguments
    /// * `caller` - Must be the administrator
    /// * `issuer` - Account whose approval changes
    /// * `approved` - Target approval state
    ///
    /// # Returns
    /// The `IssuerApproved`/`IssuerRevoked` event on an actual flip. Whether a
    /// redundant call is a silent no-op or an error depends on the registry's
    /// approval policy.
    pub fn set_issuer_approval(
        &self,
        caller: AccountId,
        issuer: AccountId,
        approved: bool,
    ) -> Result<Option<EventEnvelope>, RegistryError> {
        self.registry
            .execute(caller, Command::SetIssuerApproval { issuer, approved })
    }

    pub fn approve_issuer(
        &self,
        caller: AccountId,
        issuer: AccountId,
    ) -> Result<Option<EventEnvelope>, RegistryError> {
        self.set_issuer_approval(caller, issuer, true)
    }

    pub fn revoke_issuer(
        &self,
        caller: AccountId,
        issuer: AccountId,
    ) -> Result<Option<EventEnvelope>, RegistryError> {
        self.set_issuer_approval(caller, issuer, false)
    }

    /// Issues a credential, or replaces the content pointer of one the caller
    /// already owns.
    ///
    /// # Arguments
    /// * `caller` - Must be an approved issuer
    /// * `fingerprint` - 32-byte document hash
    /// * `content_pointer` - External content locator, empty for none
    ///
    /// # Errors
    /// - `IssuerNotApproved` if the caller is not currently approved
    /// - `UnauthorizedReissuance` if another issuer owns the fingerprint
    /// - `CredentialAlreadyRevoked` if the caller's record was revoked
    pub fn issue_credential(
        &self,
        caller: AccountId,
        fingerprint: Fingerprint,
        content_pointer: impl Into<String>,
    ) -> Result<Option<EventEnvelope>, RegistryError> {
        self.registry.execute(
            caller,
            Command::IssueCredential {
                fingerprint,
                content_pointer: content_pointer.into(),
            },
        )
    }

    /// Revokes a credential. Allowed for its issuer and the administrator.
    ///
    /// # Errors
    /// - `CredentialNotFound` if the fingerprint has no record
    /// - `Unauthorized` if the caller is neither owner nor administrator
    /// - `CredentialAlreadyRevoked` if it is already revoked
    pub fn revoke_credential(
        &self,
        caller: AccountId,
        fingerprint: Fingerprint,
    ) -> Result<Option<EventEnvelope>, RegistryError> {
        self.registry
            .execute(caller, Command::RevokeCredential { fingerprint })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::registry_state::ApprovalPolicy;
    use crate::models::RegistryEvent;
    use ethers_core::types::{Address, H256};

    fn admin() -> AccountId {
        Address::repeat_byte(0xad)
    }

    fn service(policy: ApprovalPolicy) -> CredentialIssuer {
        CredentialIssuer::new(Arc::new(CredentialRegistry::in_memory(admin(), policy)))
    }

    #[test]
    fn test_only_administrator_manages_issuers() {
        let issuer_service = service(ApprovalPolicy::Idempotent);
        let issuer = Address::repeat_byte(0x01);
        issuer_service.approve_issuer(admin(), issuer).unwrap();

        let err = issuer_service
            .approve_issuer(issuer, Address::repeat_byte(0x02))
            .unwrap_err();
        assert_eq!(err.code(), "Unauthorized");
    }

    #[test]
    fn test_unapproved_account_cannot_issue() {
        let issuer_service = service(ApprovalPolicy::Idempotent);
        let err = issuer_service
            .issue_credential(Address::repeat_byte(0x01), H256::repeat_byte(0x01), "cidA")
            .unwrap_err();
        assert_eq!(err.code(), "IssuerNotApproved");
    }

    #[test]
    fn test_strict_policy_rejects_second_approval() {
        let issuer_service = service(ApprovalPolicy::Strict);
        let issuer = Address::repeat_byte(0x01);
        assert!(issuer_service.approve_issuer(admin(), issuer).unwrap().is_some());
        let err = issuer_service.approve_issuer(admin(), issuer).unwrap_err();
        assert_eq!(err.code(), "IssuerAlreadyApproved");
    }

    #[test]
    fn test_issue_and_revoke_emit_events() {
        let issuer_service = service(ApprovalPolicy::Idempotent);
        let issuer = Address::repeat_byte(0x01);
        let fingerprint = H256::repeat_byte(0x05);
        issuer_service.approve_issuer(admin(), issuer).unwrap();

        let issued = issuer_service
            .issue_credential(issuer, fingerprint, "cidA")
            .unwrap()
            .unwrap();
        assert_eq!(issued.sequence, 2);
        assert_eq!(
            issued.event,
            RegistryEvent::CredentialIssued {
                fingerprint,
                issuer,
                content_pointer: "cidA".to_string(),
            }
        );

        let revoked = issuer_service
            .revoke_credential(issuer, fingerprint)
            .unwrap()
            .unwrap();
        assert_eq!(revoked.sequence, 3);
        assert_eq!(revoked.event.name(), "CredentialRevoked");
    }

    #[test]
    fn test_deapproved_owner_cannot_update_pointer() {
        let issuer_service = service(ApprovalPolicy::Idempotent);
        let issuer = Address::repeat_byte(0x01);
        let fingerprint = H256::repeat_byte(0x06);
        issuer_service.approve_issuer(admin(), issuer).unwrap();
        issuer_service
            .issue_credential(issuer, fingerprint, "cidA")
            .unwrap();
        issuer_service.revoke_issuer(admin(), issuer).unwrap();

        let err = issuer_service
            .issue_credential(issuer, fingerprint, "cidB")
            .unwrap_err();
        assert_eq!(err.code(), "IssuerNotApproved");

        // Ownership survives de-approval: the former issuer may still revoke.
        assert!(issuer_service
            .revoke_credential(issuer, fingerprint)
            .unwrap()
            .is_some());
    }
}
