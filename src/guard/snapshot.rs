//! Policy snapshot persistence (policy.json)
//!
//! Snapshots hold membership only; audit notes stay in the event log.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use super::policy::{PolicyKey, PolicyStore};
use super::Guard;
use crate::abi::{Address, Selector};
use crate::error::{Error, Result};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Serialized call-site entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSiteRecord {
    pub target: Address,
    pub selector: Selector,
}

/// Policy file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySnapshot {
    /// Snapshot format version
    #[serde(default = "default_version")]
    pub version: String,

    pub governance: Address,

    #[serde(default)]
    pub call_sites: Vec<CallSiteRecord>,

    #[serde(default)]
    pub assets: Vec<Address>,

    #[serde(default)]
    pub senders: Vec<Address>,

    #[serde(default)]
    pub withdraw_destinations: Vec<Address>,

    #[serde(default)]
    pub approval_destinations: Vec<Address>,
}

fn default_version() -> String {
    SNAPSHOT_VERSION.to_string()
}

impl PolicySnapshot {
    /// Every allow-list entry as a key
    pub fn keys(&self) -> Vec<PolicyKey> {
        let mut keys: Vec<PolicyKey> = self
            .call_sites
            .iter()
            .map(|c| PolicyKey::CallSite {
                target: c.target,
                selector: c.selector,
            })
            .collect();
        keys.extend(self.assets.iter().map(|&address| PolicyKey::Asset { address }));
        keys.extend(self.senders.iter().map(|&address| PolicyKey::Sender { address }));
        keys.extend(
            self.withdraw_destinations
                .iter()
                .map(|&address| PolicyKey::WithdrawDestination { address }),
        );
        keys.extend(
            self.approval_destinations
                .iter()
                .map(|&address| PolicyKey::ApprovalDestination { address }),
        );
        keys
    }
}

impl Guard {
    /// Capture the current policy
    pub fn snapshot(&self) -> PolicySnapshot {
        let policy = self.policy();
        PolicySnapshot {
            version: default_version(),
            governance: policy.governance(),
            call_sites: policy
                .call_sites()
                .map(|(target, selector)| CallSiteRecord { target, selector })
                .collect(),
            assets: policy.assets().collect(),
            senders: policy.senders().collect(),
            withdraw_destinations: policy.withdraw_destinations().collect(),
            approval_destinations: policy.approval_destinations().collect(),
        }
    }

    /// Rebuild a guard from a snapshot. No events are emitted.
    pub fn from_snapshot(snapshot: &PolicySnapshot) -> Result<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::UnsupportedSnapshotVersion(snapshot.version.clone()));
        }

        let mut store = PolicyStore::new(snapshot.governance);
        for key in snapshot.keys() {
            store.set(&key, true);
        }
        Ok(Guard::with_policy(store))
    }
}

/// Load a guard from a policy file
pub async fn load<P: AsRef<Path>>(path: P) -> Result<Guard> {
    let path = path.as_ref();
    if !tokio::fs::try_exists(path).await? {
        return Err(Error::PolicyNotFound(path.display().to_string()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let snapshot: PolicySnapshot = serde_json::from_str(&content)?;
    let guard = Guard::from_snapshot(&snapshot)?;

    debug!(
        "Loaded policy from {} ({} call sites)",
        path.display(),
        guard.policy().call_site_count()
    );
    Ok(guard)
}

/// Write the guard's policy to a file
pub async fn save<P: AsRef<Path>>(guard: &Guard, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let json = serde_json::to_string_pretty(&guard.snapshot())?;
    tokio::fs::write(path, json).await?;

    info!("Saved policy to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::SELECTORS;

    const OWNER: Address = Address::new([0x01; 20]);

    fn populated() -> Guard {
        let mut guard = Guard::new(OWNER);
        guard.whitelist_token(OWNER, Address::new([0xaa; 20]), "").unwrap();
        guard.whitelist_router(OWNER, Address::new([0x52; 20]), "").unwrap();
        guard.allow_sender(OWNER, Address::new([0x5e; 20]), "").unwrap();
        guard.allow_asset(OWNER, Address::new([0xaa; 20]), "").unwrap();
        guard
            .allow_withdraw_destination(OWNER, Address::new([0x7e; 20]), "")
            .unwrap();
        guard
    }

    #[test]
    fn test_snapshot_restores_policy() {
        let guard = populated();
        let restored = Guard::from_snapshot(&guard.snapshot()).unwrap();

        assert_eq!(restored.policy(), guard.policy());
        assert!(restored.events().is_empty());
    }

    #[test]
    fn test_snapshot_excludes_notes() {
        let mut guard = Guard::new(OWNER);
        guard
            .allow_sender(OWNER, Address::new([0x5e; 20]), "secret memo")
            .unwrap();
        let json = serde_json::to_string(&guard.snapshot()).unwrap();
        assert!(!json.contains("secret memo"));
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut snapshot = Guard::new(OWNER).snapshot();
        snapshot.version = "9.9".to_string();
        assert!(matches!(
            Guard::from_snapshot(&snapshot),
            Err(Error::UnsupportedSnapshotVersion(_))
        ));
    }

    #[test]
    fn test_minimal_snapshot_json() {
        let json = r#"{
            "governance": "0x0101010101010101010101010101010101010101",
            "call_sites": [
                { "target": "0x5252525252525252525252525252525252525252", "selector": "0x8803dbee" }
            ]
        }"#;
        let snapshot: PolicySnapshot = serde_json::from_str(json).unwrap();
        let guard = Guard::from_snapshot(&snapshot).unwrap();

        assert_eq!(guard.owner(), OWNER);
        assert!(guard.policy().is_allowed_call_site(
            Address::new([0x52; 20]),
            SELECTORS::SWAP_TOKENS_FOR_EXACT_TOKENS
        ));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("policy.json");

        let guard = populated();
        save(&guard, &path).await.unwrap();
        let loaded = load(&path).await.unwrap();

        assert_eq!(loaded.policy(), guard.policy());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load(dir.path().join("nope.json")).await;
        assert!(matches!(result, Err(Error::PolicyNotFound(_))));
    }
}
