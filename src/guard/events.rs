//! Audit events for policy mutations
//!
//! The free-text note given to an admin call lives only here, never in
//! the policy store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::io::AsyncWriteExt;

use super::policy::PolicyKey;
use crate::error::Result;

/// What happened to the key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyAction {
    Approved,
    Removed,
}

impl std::fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyAction::Approved => write!(f, "Approved"),
            PolicyAction::Removed => write!(f, "Removed"),
        }
    }
}

/// One emitted audit event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyEvent {
    /// Monotonic sequence number within one guard instance
    pub seq: u64,
    /// Event name, e.g. `CallSiteApproved`
    pub event: String,
    pub action: PolicyAction,
    pub key: PolicyKey,
    pub note: String,
    pub at: DateTime<Utc>,
}

/// In-memory event log
#[derive(Debug, Default)]
pub struct EventLog {
    next_seq: u64,
    events: Vec<PolicyEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event and return it
    pub fn record(&mut self, action: PolicyAction, key: PolicyKey, note: &str) -> &PolicyEvent {
        let event = PolicyEvent {
            seq: self.next_seq,
            event: format!("{}{}", key.kind(), action),
            action,
            key,
            note: note.to_string(),
            at: Utc::now(),
        };
        self.next_seq += 1;
        self.events.push(event);
        &self.events[self.events.len() - 1]
    }

    pub fn events(&self) -> &[PolicyEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drain buffered events; sequence numbers keep counting
    pub fn take(&mut self) -> Vec<PolicyEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Append events to a JSON-lines audit file, creating it if needed
pub async fn append_jsonl<P: AsRef<Path>>(path: P, events: &[PolicyEvent]) -> Result<()> {
    if events.is_empty() {
        return Ok(());
    }

    let mut buf = String::new();
    for event in events {
        buf.push_str(&serde_json::to_string(event)?);
        buf.push('\n');
    }

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.as_ref())
        .await?;
    file.write_all(buf.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::Address;

    #[test]
    fn test_event_names() {
        let mut log = EventLog::new();
        let key = PolicyKey::WithdrawDestination {
            address: Address::new([7; 20]),
        };

        assert_eq!(
            log.record(PolicyAction::Approved, key, "treasury").event,
            "WithdrawDestinationApproved"
        );
        assert_eq!(
            log.record(PolicyAction::Removed, key, "rotated").event,
            "WithdrawDestinationRemoved"
        );
        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[1].note, "rotated");
    }

    #[test]
    fn test_take_keeps_sequence() {
        let mut log = EventLog::new();
        let key = PolicyKey::Asset {
            address: Address::new([1; 20]),
        };
        log.record(PolicyAction::Approved, key, "");
        let drained = log.take();
        assert_eq!(drained.len(), 1);
        assert!(log.is_empty());

        assert_eq!(log.record(PolicyAction::Removed, key, "").seq, 1);
    }

    #[tokio::test]
    async fn test_append_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        let mut log = EventLog::new();
        let key = PolicyKey::Sender {
            address: Address::new([2; 20]),
        };
        log.record(PolicyAction::Approved, key, "hot wallet");
        append_jsonl(&path, &log.take()).await.unwrap();
        log.record(PolicyAction::Removed, key, "retired");
        append_jsonl(&path, &log.take()).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<PolicyEvent> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].event, "SenderApproved");
        assert_eq!(lines[1].note, "retired");
    }
}
