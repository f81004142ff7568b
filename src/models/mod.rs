// src/models/mod.rs
//! Data structures shared by the registry, its journal and its services.

pub mod credential;
pub mod event;

pub use credential::{
    AccountId, CredentialDetails, CredentialRecord, Fingerprint, Verification, ZERO_ACCOUNT,
};
pub use event::{EventEnvelope, RegistryEvent};
