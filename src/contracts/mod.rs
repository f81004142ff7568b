// src/contracts/mod.rs
//! The registry "contract": state, transition rules and access control.

pub mod access_control;
pub mod credential_registry;
pub mod registry_state;
