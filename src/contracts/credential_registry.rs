// src/contracts/credential_registry.rs
//! Credential Registry.
//!
//! Hosts the registry state behind a single-writer lock together with the
//! durable event journal. Every mutation runs decide, append and apply while
//! holding the write lock, so:
//! - mutations are serialized against each other
//! - readers never observe a half-applied transition
//! - a failed journal append leaves the state untouched

use crate::contracts::registry_state::{ApprovalPolicy, Command, RegistryState};
use crate::errors::RegistryError;
use crate::models::{AccountId, EventEnvelope};
use crate::storage::event_journal::{EventJournal, MemoryJournal};
use chrono::Utc;
use log::{debug, info};
use parking_lot::RwLock;

struct Inner {
    state: RegistryState,
    journal: Box<dyn EventJournal>,
}

/// Credential registry with an append-only audit journal.
///
/// Shared between services as `Arc<CredentialRegistry>`.
pub struct CredentialRegistry {
    inner: RwLock<Inner>,
}

impl CredentialRegistry {
    /// Opens a registry over `journal`, replaying every recorded event.
    ///
    /// # Arguments
    /// * `administrator` - Account allowed to manage the issuer allow-list
    /// * `policy` - How redundant approval requests are treated
    /// * `journal` - Durable event store; may already contain events
    ///
    /// # Errors
    /// Returns `RegistryError::Journal` if a recorded event contradicts the
    /// state rebuilt from the events before it.
    pub fn open(
        administrator: AccountId,
        policy: ApprovalPolicy,
        journal: Box<dyn EventJournal>,
    ) -> Result<Self, RegistryError> {
        let mut state = RegistryState::new(administrator, policy);
        for envelope in journal.entries() {
            state.apply(envelope)?;
        }
        info!(
            "credential registry opened: {} events replayed, {} credentials, administrator 0x{:x}, {:?} approval policy",
            state.last_sequence(),
            state.credential_count(),
            administrator,
            policy
        );
        Ok(Self {
            inner: RwLock::new(Inner { state, journal }),
        })
    }

    /// Creates an empty registry backed by a [`MemoryJournal`].
    pub fn in_memory(administrator: AccountId, policy: ApprovalPolicy) -> Self {
        Self {
            inner: RwLock::new(Inner {
                state: RegistryState::new(administrator, policy),
                journal: Box::new(MemoryJournal::new()),
            }),
        }
    }

    /// Executes a mutating command on behalf of `caller`.
    ///
    /// # Returns
    /// - `Ok(Some(envelope))` with the journaled event when state changed
    /// - `Ok(None)` when the command was an accepted no-op
    pub fn execute(
        &self,
        caller: AccountId,
        command: Command,
    ) -> Result<Option<EventEnvelope>, RegistryError> {
        let mut guard = self.inner.write();
        let Inner { state, journal } = &mut *guard;

        let event = match state.decide(caller, &command) {
            Ok(Some(event)) => event,
            Ok(None) => {
                debug!("no-op command from 0x{:x}: {:?}", caller, command);
                return Ok(None);
            }
            Err(err) => {
                debug!("rejected command from 0x{:x}: {}", caller, err);
                return Err(err);
            }
        };

        let envelope = journal.append(event, Utc::now())?;
        state.apply(&envelope)?;

        info!(
            "#{} {} by 0x{:x}",
            envelope.sequence,
            envelope.event.name(),
            caller
        );
        Ok(Some(envelope))
    }

    /// Runs `query` against a consistent snapshot of the state.
    pub fn read<R>(&self, query: impl FnOnce(&RegistryState) -> R) -> R {
        query(&self.inner.read().state)
    }

    /// Clones the current state.
    pub fn snapshot(&self) -> RegistryState {
        self.read(RegistryState::clone)
    }

    /// Journaled events with a sequence number greater than `sequence`.
    pub fn events_since(&self, sequence: u64) -> Vec<EventEnvelope> {
        self.inner.read().journal.events_since(sequence)
    }
}
