// src/services/mod.rs
//! Role-facing services over the registry.

pub mod command_server;
pub mod credential_issuer;
pub mod verifier;
