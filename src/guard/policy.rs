//! Policy store: the governance identity and the allow-lists
//!
//! Every list is fail-closed: a key that was never allowed, or was
//! removed, reads as "not allowed". Lists are only written through the
//! admin API on [`super::Guard`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::abi::{Address, Selector};

/// Which allow-list a key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    CallSite,
    Asset,
    Sender,
    WithdrawDestination,
    ApprovalDestination,
}

impl ListKind {
    pub const ALL: [ListKind; 5] = [
        ListKind::CallSite,
        ListKind::Asset,
        ListKind::Sender,
        ListKind::WithdrawDestination,
        ListKind::ApprovalDestination,
    ];
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListKind::CallSite => write!(f, "CallSite"),
            ListKind::Asset => write!(f, "Asset"),
            ListKind::Sender => write!(f, "Sender"),
            ListKind::WithdrawDestination => write!(f, "WithdrawDestination"),
            ListKind::ApprovalDestination => write!(f, "ApprovalDestination"),
        }
    }
}

/// A single allow-list entry key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyKey {
    CallSite { target: Address, selector: Selector },
    Asset { address: Address },
    Sender { address: Address },
    WithdrawDestination { address: Address },
    ApprovalDestination { address: Address },
}

impl PolicyKey {
    pub fn kind(&self) -> ListKind {
        match self {
            PolicyKey::CallSite { .. } => ListKind::CallSite,
            PolicyKey::Asset { .. } => ListKind::Asset,
            PolicyKey::Sender { .. } => ListKind::Sender,
            PolicyKey::WithdrawDestination { .. } => ListKind::WithdrawDestination,
            PolicyKey::ApprovalDestination { .. } => ListKind::ApprovalDestination,
        }
    }

    /// Build a single-address key; call sites need a selector instead
    pub fn for_address(kind: ListKind, address: Address) -> Option<Self> {
        match kind {
            ListKind::CallSite => None,
            ListKind::Asset => Some(PolicyKey::Asset { address }),
            ListKind::Sender => Some(PolicyKey::Sender { address }),
            ListKind::WithdrawDestination => Some(PolicyKey::WithdrawDestination { address }),
            ListKind::ApprovalDestination => Some(PolicyKey::ApprovalDestination { address }),
        }
    }
}

impl std::fmt::Display for PolicyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyKey::CallSite { target, selector } => write!(f, "{} {}", target, selector),
            PolicyKey::Asset { address }
            | PolicyKey::Sender { address }
            | PolicyKey::WithdrawDestination { address }
            | PolicyKey::ApprovalDestination { address } => write!(f, "{}", address),
        }
    }
}

/// Governance identity plus the five allow-lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyStore {
    governance: Address,
    call_sites: BTreeSet<(Address, Selector)>,
    assets: BTreeSet<Address>,
    senders: BTreeSet<Address>,
    withdraw_destinations: BTreeSet<Address>,
    approval_destinations: BTreeSet<Address>,
}

impl PolicyStore {
    /// Empty store owned by `governance`
    pub fn new(governance: Address) -> Self {
        Self {
            governance,
            call_sites: BTreeSet::new(),
            assets: BTreeSet::new(),
            senders: BTreeSet::new(),
            withdraw_destinations: BTreeSet::new(),
            approval_destinations: BTreeSet::new(),
        }
    }

    pub fn governance(&self) -> Address {
        self.governance
    }

    pub fn is_governance(&self, address: Address) -> bool {
        self.governance == address
    }

    pub fn is_allowed_call_site(&self, target: Address, selector: Selector) -> bool {
        self.call_sites.contains(&(target, selector))
    }

    pub fn is_allowed_asset(&self, token: Address) -> bool {
        self.assets.contains(&token)
    }

    pub fn is_allowed_sender(&self, sender: Address) -> bool {
        self.senders.contains(&sender)
    }

    /// Trade receivers share the sender allow-list
    pub fn is_allowed_receiver(&self, receiver: Address) -> bool {
        self.is_allowed_sender(receiver)
    }

    pub fn is_allowed_withdraw_destination(&self, destination: Address) -> bool {
        self.withdraw_destinations.contains(&destination)
    }

    pub fn is_allowed_approval_destination(&self, destination: Address) -> bool {
        self.approval_destinations.contains(&destination)
    }

    /// Membership query for any key
    pub fn contains(&self, key: &PolicyKey) -> bool {
        match *key {
            PolicyKey::CallSite { target, selector } => self.is_allowed_call_site(target, selector),
            PolicyKey::Asset { address } => self.is_allowed_asset(address),
            PolicyKey::Sender { address } => self.is_allowed_sender(address),
            PolicyKey::WithdrawDestination { address } => {
                self.is_allowed_withdraw_destination(address)
            }
            PolicyKey::ApprovalDestination { address } => {
                self.is_allowed_approval_destination(address)
            }
        }
    }

    /// Number of currently allowed call sites
    pub fn call_site_count(&self) -> usize {
        self.call_sites.len()
    }

    pub fn call_sites(&self) -> impl Iterator<Item = (Address, Selector)> + '_ {
        self.call_sites.iter().copied()
    }

    pub fn assets(&self) -> impl Iterator<Item = Address> + '_ {
        self.assets.iter().copied()
    }

    pub fn senders(&self) -> impl Iterator<Item = Address> + '_ {
        self.senders.iter().copied()
    }

    pub fn withdraw_destinations(&self) -> impl Iterator<Item = Address> + '_ {
        self.withdraw_destinations.iter().copied()
    }

    pub fn approval_destinations(&self) -> impl Iterator<Item = Address> + '_ {
        self.approval_destinations.iter().copied()
    }

    /// Set or clear exactly one entry. Returns whether the stored state changed.
    pub(crate) fn set(&mut self, key: &PolicyKey, allowed: bool) -> bool {
        fn apply<T: Ord>(set: &mut BTreeSet<T>, item: T, allowed: bool) -> bool {
            if allowed {
                set.insert(item)
            } else {
                set.remove(&item)
            }
        }

        match *key {
            PolicyKey::CallSite { target, selector } => {
                apply(&mut self.call_sites, (target, selector), allowed)
            }
            PolicyKey::Asset { address } => apply(&mut self.assets, address, allowed),
            PolicyKey::Sender { address } => apply(&mut self.senders, address, allowed),
            PolicyKey::WithdrawDestination { address } => {
                apply(&mut self.withdraw_destinations, address, allowed)
            }
            PolicyKey::ApprovalDestination { address } => {
                apply(&mut self.approval_destinations, address, allowed)
            }
        }
    }
}
