// src/storage/event_journal.rs
//! Append-only journal of registry events.
//!
//! The journal is the durable half of the registry: every state change is
//! appended here before it becomes visible, and the in-memory state is rebuilt
//! from the journal on startup.
//!
//! Two implementations are provided:
//! - [`MemoryJournal`] keeps events in a vector (tests, ephemeral deployments)
//! - [`FileJournal`] writes one JSON document per line and fsyncs each append
//!
//! # File format
//! ```text
//! {"sequence":1,"recorded_at":"2026-01-01T00:00:00Z","event":{"type":"IssuerApproved",...}}
//! {"sequence":2,...}
//! ```
//! Sequences start at 1 and have no gaps. A trailing line without a newline
//! is a write that was interrupted by a crash; it is truncated on open.

use crate::models::{EventEnvelope, RegistryEvent};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Errors from journal operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("event journal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("event journal serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A complete line in the middle of the journal could not be parsed.
    #[error("event journal line {line} is corrupt: {reason}")]
    Corrupt { line: usize, reason: String },

    #[error("event journal sequence gap: expected {expected}, found {found}")]
    SequenceGap { expected: u64, found: u64 },

    /// A well-formed event contradicts the registry state built so far.
    #[error("event {sequence} is inconsistent with registry state: {reason}")]
    Inconsistent { sequence: u64, reason: String },
}

/// Durable, ordered store of registry events.
///
/// Implementations assign sequence numbers; callers never choose them.
pub trait EventJournal: Send + Sync {
    /// Appends `event` and returns it wrapped with its sequence number.
    ///
    /// When this returns `Err` the event is not part of the journal.
    fn append(
        &mut self,
        event: RegistryEvent,
        recorded_at: DateTime<Utc>,
    ) -> Result<EventEnvelope, JournalError>;

    /// All events in sequence order.
    fn entries(&self) -> &[EventEnvelope];

    /// Events with a sequence number strictly greater than `sequence`.
    fn events_since(&self, sequence: u64) -> Vec<EventEnvelope> {
        let entries = self.entries();
        // Sequences are dense and start at 1, so entry `n` sits at index `n - 1`.
        let start = usize::try_from(sequence).unwrap_or(usize::MAX).min(entries.len());
        entries[start..].to_vec()
    }

    /// Sequence number of the last appended event, 0 when empty.
    fn last_sequence(&self) -> u64 {
        self.entries().last().map_or(0, |entry| entry.sequence)
    }
}

/// Journal that lives only in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryJournal {
    entries: Vec<EventEnvelope>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventJournal for MemoryJournal {
    fn append(
        &mut self,
        event: RegistryEvent,
        recorded_at: DateTime<Utc>,
    ) -> Result<EventEnvelope, JournalError> {
        let envelope = EventEnvelope {
            sequence: self.last_sequence() + 1,
            recorded_at,
            event,
        };
        self.entries.push(envelope.clone());
        Ok(envelope)
    }

    fn entries(&self) -> &[EventEnvelope] {
        &self.entries
    }
}

/// JSON-lines journal backed by a file.
///
/// Keeps a copy of every entry in memory so reads never touch the disk.
#[derive(Debug)]
pub struct FileJournal {
    path: PathBuf,
    file: File,
    /// Length of the file up to the end of the last committed line.
    committed_len: u64,
    entries: Vec<EventEnvelope>,
}

impl FileJournal {
    /// Opens (or creates) the journal at `path` and loads its entries.
    ///
    /// # Recovery
    /// - A torn trailing line is truncated away and logged
    /// - An unparseable complete line fails with [`JournalError::Corrupt`]
    /// - Out-of-order sequences fail with [`JournalError::SequenceGap`]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, JournalError> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;

        let mut entries: Vec<EventEnvelope> = Vec::new();
        let mut offset = 0usize;
        let mut torn_at = None;

        // Split on raw bytes: a torn tail may end inside a multi-byte character.
        for (index, line) in contents.split_inclusive(|byte| *byte == b'\n').enumerate() {
            if line.last() != Some(&b'\n') {
                torn_at = Some(offset);
                break;
            }
            offset += line.len();

            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let envelope: EventEnvelope =
                serde_json::from_slice(line).map_err(|err| JournalError::Corrupt {
                    line: index + 1,
                    reason: err.to_string(),
                })?;
            let expected = entries.last().map_or(0, |entry| entry.sequence) + 1;
            if envelope.sequence != expected {
                return Err(JournalError::SequenceGap {
                    expected,
                    found: envelope.sequence,
                });
            }
            entries.push(envelope);
        }

        let committed_len = offset as u64;
        if let Some(torn_offset) = torn_at {
            warn!(
                "truncating torn tail of event journal {} at byte {}",
                path.display(),
                torn_offset
            );
            file.set_len(committed_len)?;
            file.sync_all()?;
        }

        debug!(
            "opened event journal {} with {} entries",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            file,
            committed_len,
            entries,
        })
    }
}

impl EventJournal for FileJournal {
    fn append(
        &mut self,
        event: RegistryEvent,
        recorded_at: DateTime<Utc>,
    ) -> Result<EventEnvelope, JournalError> {
        let envelope = EventEnvelope {
            sequence: self.last_sequence() + 1,
            recorded_at,
            event,
        };
        let mut line = serde_json::to_string(&envelope)?;
        line.push('\n');

        let written = self
            .file
            .write_all(line.as_bytes())
            .and_then(|()| self.file.sync_data());
        if let Err(err) = written {
            // Drop any partial line so the next append starts on a clean boundary.
            if let Err(rollback) = self.file.set_len(self.committed_len) {
                warn!(
                    "failed to roll back partial write in {}: {}",
                    self.path.display(),
                    rollback
                );
            }
            return Err(err.into());
        }

        self.committed_len += line.len() as u64;
        self.entries.push(envelope.clone());
        Ok(envelope)
    }

    fn entries(&self) -> &[EventEnvelope] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers_core::types::{Address, H256};
    use std::fs;

    fn approved(byte: u8) -> RegistryEvent {
        RegistryEvent::IssuerApproved {
            issuer: Address::repeat_byte(byte),
            approver: Address::repeat_byte(0xad),
        }
    }

    #[test]
    fn test_memory_journal_assigns_dense_sequences() {
        let mut journal = MemoryJournal::new();
        assert_eq!(journal.last_sequence(), 0);
        let first = journal.append(approved(1), Utc::now()).unwrap();
        let second = journal.append(approved(2), Utc::now()).unwrap();
        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);

        let since = journal.events_since(1);
        assert_eq!(since, vec![second]);
        assert!(journal.events_since(10).is_empty());
        assert_eq!(journal.events_since(0).len(), 2);
    }

    #[test]
    fn test_file_journal_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        let written = {
            let mut journal = FileJournal::open(&path).unwrap();
            journal.append(approved(1), Utc::now()).unwrap();
            journal
                .append(
                    RegistryEvent::CredentialIssued {
                        fingerprint: H256::repeat_byte(0x01),
                        issuer: Address::repeat_byte(1),
                        content_pointer: "cidA".to_string(),
                    },
                    Utc::now(),
                )
                .unwrap();
            journal.entries().to_vec()
        };

        let reopened = FileJournal::open(&path).unwrap();
        assert_eq!(reopened.entries(), written.as_slice());
        assert_eq!(reopened.last_sequence(), 2);
    }

    #[test]
    fn test_file_journal_truncates_torn_tail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        {
            let mut journal = FileJournal::open(&path).unwrap();
            journal.append(approved(1), Utc::now()).unwrap();
        }
        let intact_len = fs::metadata(&path).unwrap().len();

        let mut contents = fs::read_to_string(&path).unwrap();
        contents.push_str("{\"sequence\":2,\"recorded_at\":\"2026-");
        fs::write(&path, contents).unwrap();

        let mut journal = FileJournal::open(&path).unwrap();
        assert_eq!(journal.last_sequence(), 1);
        assert_eq!(fs::metadata(&path).unwrap().len(), intact_len);

        let next = journal.append(approved(2), Utc::now()).unwrap();
        assert_eq!(next.sequence, 2);
        drop(journal);
        assert_eq!(FileJournal::open(&path).unwrap().entries().len(), 2);
    }

    #[test]
    fn test_file_journal_truncates_tail_torn_inside_multibyte_character() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        {
            let mut journal = FileJournal::open(&path).unwrap();
            journal.append(approved(1), Utc::now()).unwrap();
        }
        let intact_len = fs::metadata(&path).unwrap().len();

        // "diplôme" cut after the first byte of "ô".
        let mut contents = fs::read(&path).unwrap();
        contents.extend_from_slice(b"{\"sequence\":2,\"content_pointer\":\"dipl");
        contents.push(0xC3);
        fs::write(&path, contents).unwrap();

        let mut journal = FileJournal::open(&path).unwrap();
        assert_eq!(journal.last_sequence(), 1);
        assert_eq!(fs::metadata(&path).unwrap().len(), intact_len);

        let pointer = RegistryEvent::CredentialIssued {
            fingerprint: H256::repeat_byte(0x01),
            issuer: Address::repeat_byte(1),
            content_pointer: "diplôme".to_string(),
        };
        journal.append(pointer.clone(), Utc::now()).unwrap();
        drop(journal);

        let reopened = FileJournal::open(&path).unwrap();
        assert_eq!(reopened.entries().len(), 2);
        assert_eq!(reopened.entries()[1].event, pointer);
    }

    #[test]
    fn test_file_journal_rejects_corrupt_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        {
            let mut journal = FileJournal::open(&path).unwrap();
            journal.append(approved(1), Utc::now()).unwrap();
        }
        let mut contents = fs::read_to_string(&path).unwrap();
        contents.push_str("not json\n");
        fs::write(&path, contents).unwrap();

        let err = FileJournal::open(&path).unwrap_err();
        assert!(matches!(err, JournalError::Corrupt { line: 2, .. }));
    }

    #[test]
    fn test_file_journal_rejects_sequence_gap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let envelope = EventEnvelope {
            sequence: 3,
            recorded_at: Utc::now(),
            event: approved(1),
        };
        let line = format!("{}\n", serde_json::to_string(&envelope).unwrap());
        fs::write(&path, line).unwrap();

        let err = FileJournal::open(&path).unwrap_err();
        assert!(matches!(
            err,
            JournalError::SequenceGap {
                expected: 1,
                found: 3
            }
        ));
    }
}
