// src/storage/mod.rs
//! Durable storage for registry events.

pub mod event_journal;
