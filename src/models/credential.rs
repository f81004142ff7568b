// src/models/credential.rs
//! Credential record data model.
//!
//! Defines the on-registry representation of an issued credential, keyed by
//! the 32-byte fingerprint of the document it attests to, together with the
//! read-only views handed out by the query engine.

use chrono::{DateTime, Utc};
use ethers_core::types::{Address, H160, H256};
use serde::{Deserialize, Serialize};

/// Account identifier of a caller, issuer or administrator (20-byte address).
pub type AccountId = Address;

/// Content hash of a document, computed by the caller outside the registry.
pub type Fingerprint = H256;

/// The all-zero account. Reported as the issuer of fingerprints the registry
/// has never seen.
pub const ZERO_ACCOUNT: AccountId = H160([0u8; 20]);

/// A credential bound to a document fingerprint.
///
/// # Fields
/// - `issuer`: account that created the record, never changes
/// - `revoked`: one-way flag, `false` until revoked
/// - `content_pointer`: opaque locator of external content (e.g. an IPFS CID)
/// - `created_at`: time of first issuance
///
/// # Lifecycle
/// A record is created by the first successful issuance, may have its
/// `content_pointer` replaced by its issuer while unrevoked, and is frozen
/// once revoked. Records are never deleted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Account that issued the credential
    pub issuer: AccountId,

    /// Whether the credential has been revoked
    pub revoked: bool,

    /// Opaque content locator, empty when there is no external content
    /// Example: "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi"
    pub content_pointer: String,

    /// Timestamp of the first issuance
    pub created_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Creates a fresh, unrevoked record.
    pub fn new(issuer: AccountId, content_pointer: String, created_at: DateTime<Utc>) -> Self {
        Self {
            issuer,
            revoked: false,
            content_pointer,
            created_at,
        }
    }
}

/// Result of a `verify` query.
///
/// An unknown fingerprint and a revoked credential both read `valid == false`;
/// the two are told apart by `issuer`, which is [`ZERO_ACCOUNT`] only for
/// unknown fingerprints.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub issuer: AccountId,
    pub valid: bool,
    pub content_pointer: String,
}

impl Verification {
    /// The sentinel returned for fingerprints with no record.
    pub fn unknown() -> Self {
        Self {
            issuer: ZERO_ACCOUNT,
            valid: false,
            content_pointer: String::new(),
        }
    }

    /// Returns `true` when the fingerprint has never been issued.
    pub fn is_unknown(&self) -> bool {
        self.issuer == ZERO_ACCOUNT
    }
}

/// Result of a `getDetails` query: the verification view plus the raw
/// revocation flag and the creation time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CredentialDetails {
    pub issuer: AccountId,
    pub valid: bool,
    pub revoked: bool,
    pub content_pointer: String,
    /// `None` for unknown fingerprints
    pub created_at: Option<DateTime<Utc>>,
}

impl CredentialDetails {
    pub fn unknown() -> Self {
        Self {
            issuer: ZERO_ACCOUNT,
            valid: false,
            revoked: false,
            content_pointer: String::new(),
            created_at: None,
        }
    }
}

impl From<CredentialDetails> for Verification {
    fn from(details: CredentialDetails) -> Self {
        Self {
            issuer: details.issuer,
            valid: details.valid,
            content_pointer: details.content_pointer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_sentinel_uses_zero_account() {
        let verification = Verification::unknown();
        assert!(verification.is_unknown());
        assert!(!verification.valid);
        assert!(verification.content_pointer.is_empty());
        assert_eq!(ZERO_ACCOUNT, Address::zero());
    }

    #[test]
    fn test_new_record_starts_unrevoked() {
        let issuer = Address::repeat_byte(0x11);
        let record = CredentialRecord::new(issuer, "cidA".to_string(), Utc::now());
        assert!(!record.revoked);
        assert_eq!(record.issuer, issuer);
    }

    #[test]
    fn test_details_convert_to_verification() {
        let issuer = Address::repeat_byte(0x22);
        let details = CredentialDetails {
            issuer,
            valid: true,
            revoked: false,
            content_pointer: "cidB".to_string(),
            created_at: Some(Utc::now()),
        };
        let verification = Verification::from(details);
        assert_eq!(verification.issuer, issuer);
        assert!(verification.valid);
        assert_eq!(verification.content_pointer, "cidB");
        assert!(!verification.is_unknown());
    }
}
