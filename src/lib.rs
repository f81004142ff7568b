// src/lib.rs

//! # Credential Registry
//!
//! Authoritative registry of document credentials. Tracks which accounts may
//! issue credentials, binds a 32-byte document fingerprint to its issuer and
//! an optional content pointer, and answers verification queries that combine
//! per-credential and per-issuer status.
//!
//! ## Architecture Overview
//! 1. **Contracts**: registry state, transition rules and the access control gate
//! 2. **Storage**: append-only event journal the state is rebuilt from
//! 3. **Services**: credential issuance, verification and the JSON-lines command server
//! 4. **Settings**: layered configuration for the binary

pub mod contracts;  // Registry state machine and access control
pub mod errors;     // Registry error types
pub mod models;     // Data structures
pub mod services;   // Issuer, verifier and command server
pub mod settings;   // Runtime configuration
pub mod storage;    // Event journal

pub use contracts::credential_registry::CredentialRegistry;
pub use contracts::registry_state::ApprovalPolicy;
pub use errors::RegistryError;
