//! Call authorization guard
//!
//! Sits between a semi-trusted hot wallet and the vault it trades for.
//! Every call the hot wallet wants to forward is checked against a
//! governance-maintained policy before it may execute.
//!
//! # Architecture
//!
//! ```text
//! authorize → sender check → call-site check → selector dispatch → argument validator
//!                                                                        ↓
//! admin API / provisioning ────────────────────────────────────→ PolicyStore
//! ```
//!
//! # Security
//!
//! - Fail-closed: anything not explicitly allowed is denied
//! - Only the governance identity can change the policy
//! - Only three call shapes are understood; any other selector is denied
//!   even on an allowed call site

pub mod admin;
pub mod dispatch;
pub mod events;
pub mod policy;
pub mod provision;
pub mod snapshot;
pub mod validate;

pub use dispatch::GuardedCall;
pub use events::{EventLog, PolicyAction, PolicyEvent};
pub use policy::{ListKind, PolicyKey, PolicyStore};
pub use snapshot::PolicySnapshot;

use tracing::debug;

use crate::abi::{match_selector, Address, KnownFunction};
use crate::error::GuardViolation;

use dispatch::read_selector;

/// Successful authorization outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorized {
    /// Governance identity, no checks applied
    GovernanceBypass,
    /// Call passed all checks for this shape
    Call(KnownFunction),
}

/// Policy store plus its audit trail
#[derive(Debug)]
pub struct Guard {
    store: PolicyStore,
    events: EventLog,
}

impl Guard {
    /// Create a guard with empty allow-lists owned by `governance`
    pub fn new(governance: Address) -> Self {
        Self::with_policy(PolicyStore::new(governance))
    }

    pub(crate) fn with_policy(store: PolicyStore) -> Self {
        Self {
            store,
            events: EventLog::new(),
        }
    }

    /// Read-only view of the policy
    pub fn policy(&self) -> &PolicyStore {
        &self.store
    }

    /// Governance identity
    pub fn owner(&self) -> Address {
        self.store.governance()
    }

    /// Events emitted since creation or the last `take_events`
    pub fn events(&self) -> &[PolicyEvent] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<PolicyEvent> {
        self.events.take()
    }

    /// Decide whether `sender` may forward `data` to `target`.
    ///
    /// Pure with respect to the policy: repeated calls with the same
    /// policy and inputs give the same answer.
    pub fn authorize(
        &self,
        sender: Address,
        target: Address,
        data: &[u8],
    ) -> Result<Authorized, GuardViolation> {
        let result = self.check(sender, target, data);
        match &result {
            Ok(outcome) => debug!(%sender, %target, ?outcome, "Call authorized"),
            Err(violation) => debug!(
                %sender,
                %target,
                kind = violation.kind(),
                "Call rejected: {}",
                violation
            ),
        }
        result
    }

    fn check(
        &self,
        sender: Address,
        target: Address,
        data: &[u8],
    ) -> Result<Authorized, GuardViolation> {
        if self.store.is_governance(sender) {
            return Ok(Authorized::GovernanceBypass);
        }

        if !self.store.is_allowed_sender(sender) {
            return Err(GuardViolation::SenderNotAllowed(sender));
        }

        let selector = read_selector(data)?;
        if !self.store.is_allowed_call_site(target, selector) {
            return Err(GuardViolation::CallSiteNotAllowed { target, selector });
        }

        let function = match_selector(selector).ok_or(GuardViolation::UnknownSelector(selector))?;
        let call = GuardedCall::decode(function, data)?;
        call.validate(&self.store)?;

        Ok(Authorized::Call(function))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{
        approveCall, swapTokensForExactTokensCall, transferCall, Selector, SELECTORS, U256,
    };
    use alloy_sol_types::SolCall;

    const GOV: Address = Address::new([0x01; 20]);
    const S: Address = Address::new([0x5e; 20]);
    const R: Address = Address::new([0x52; 20]);
    const A: Address = Address::new([0xaa; 20]);
    const B: Address = Address::new([0xbb; 20]);
    const C: Address = Address::new([0xcc; 20]);

    fn swap_payload(path: Vec<Address>, to: Address) -> Vec<u8> {
        swapTokensForExactTokensCall {
            amountOut: U256::from(1u64),
            amountInMax: U256::from(2u64),
            path,
            to,
            deadline: U256::from(9999u64),
        }
        .abi_encode()
    }

    fn swap_setup() -> Guard {
        let mut guard = Guard::new(GOV);
        guard.allow_sender(GOV, S, "hot wallet").unwrap();
        guard
            .allow_call_site(GOV, R, SELECTORS::SWAP_TOKENS_FOR_EXACT_TOKENS, "router")
            .unwrap();
        guard.allow_asset(GOV, A, "A").unwrap();
        guard.allow_asset(GOV, B, "B").unwrap();
        guard
    }

    #[test]
    fn test_swap_scenario_succeeds() {
        let guard = swap_setup();
        assert_eq!(
            guard.authorize(S, R, &swap_payload(vec![A, B], S)),
            Ok(Authorized::Call(KnownFunction::SwapTokensForExactTokens))
        );
    }

    #[test]
    fn test_swap_scenario_unlisted_token_out() {
        let guard = swap_setup();
        assert_eq!(
            guard.authorize(S, R, &swap_payload(vec![A, C], S)),
            Err(GuardViolation::AssetNotAllowed(C))
        );
    }

    #[test]
    fn test_swap_failure_order() {
        let mut guard = Guard::new(GOV);
        let payload = swap_payload(vec![A, B], S);
        let selector = SELECTORS::SWAP_TOKENS_FOR_EXACT_TOKENS;

        assert_eq!(
            guard.authorize(S, R, &payload),
            Err(GuardViolation::SenderNotAllowed(S))
        );

        guard.allow_sender(GOV, S, "").unwrap();
        assert_eq!(
            guard.authorize(S, R, &payload),
            Err(GuardViolation::CallSiteNotAllowed { target: R, selector })
        );

        guard.allow_call_site(GOV, R, selector, "").unwrap();
        let stranger = Address::new([0x99; 20]);
        assert_eq!(
            guard.authorize(S, R, &swap_payload(vec![A, B], stranger)),
            Err(GuardViolation::ReceiverNotAllowed(stranger))
        );
        assert_eq!(
            guard.authorize(S, R, &payload),
            Err(GuardViolation::AssetNotAllowed(A))
        );

        guard.allow_asset(GOV, A, "").unwrap();
        assert_eq!(
            guard.authorize(S, R, &payload),
            Err(GuardViolation::AssetNotAllowed(B))
        );

        guard.allow_asset(GOV, B, "").unwrap();
        assert!(guard.authorize(S, R, &payload).is_ok());
    }

    #[test]
    fn test_governance_bypass() {
        let guard = Guard::new(GOV);
        assert_eq!(
            guard.authorize(GOV, R, &swap_payload(vec![C], C)),
            Ok(Authorized::GovernanceBypass)
        );
        assert_eq!(
            guard.authorize(GOV, C, &[0xff]),
            Ok(Authorized::GovernanceBypass)
        );
    }

    #[test]
    fn test_unknown_selector_on_allowed_call_site() {
        let mut guard = Guard::new(GOV);
        // transferFrom(address,address,uint256)
        let transfer_from = Selector::new([0x23, 0xb8, 0x72, 0xdd]);
        guard.allow_sender(GOV, S, "").unwrap();
        guard.allow_call_site(GOV, A, transfer_from, "").unwrap();

        let mut payload = transfer_from.to_vec();
        payload.extend_from_slice(&[0u8; 96]);
        assert_eq!(
            guard.authorize(S, A, &payload),
            Err(GuardViolation::UnknownSelector(transfer_from))
        );
    }

    #[test]
    fn test_transfer_and_approve() {
        let mut guard = Guard::new(GOV);
        let treasury = Address::new([0x7e; 20]);
        guard.allow_sender(GOV, S, "").unwrap();
        guard.whitelist_token(GOV, A, "").unwrap();
        guard.whitelist_router(GOV, R, "").unwrap();

        let transfer = transferCall {
            to: treasury,
            amount: U256::from(10u64),
        }
        .abi_encode();
        assert_eq!(
            guard.authorize(S, A, &transfer),
            Err(GuardViolation::WithdrawDestinationNotAllowed(treasury))
        );
        guard.allow_withdraw_destination(GOV, treasury, "").unwrap();
        assert_eq!(
            guard.authorize(S, A, &transfer),
            Ok(Authorized::Call(KnownFunction::Transfer))
        );

        let approve_router = approveCall {
            spender: R,
            amount: U256::MAX,
        }
        .abi_encode();
        assert_eq!(
            guard.authorize(S, A, &approve_router),
            Ok(Authorized::Call(KnownFunction::Approve))
        );

        let approve_stranger = approveCall {
            spender: C,
            amount: U256::from(1u64),
        }
        .abi_encode();
        assert_eq!(
            guard.authorize(S, A, &approve_stranger),
            Err(GuardViolation::ApprovalDestinationNotAllowed(C))
        );

        // Token call sites do not extend to other tokens
        assert_eq!(
            guard.authorize(S, B, &approve_router),
            Err(GuardViolation::CallSiteNotAllowed {
                target: B,
                selector: SELECTORS::APPROVE
            })
        );
    }

    #[test]
    fn test_short_payload_after_sender_check() {
        let mut guard = Guard::new(GOV);
        assert_eq!(
            guard.authorize(S, R, &[0x88]),
            Err(GuardViolation::SenderNotAllowed(S))
        );
        guard.allow_sender(GOV, S, "").unwrap();
        assert!(matches!(
            guard.authorize(S, R, &[0x88]),
            Err(GuardViolation::MalformedCallData(_))
        ));
    }

    #[test]
    fn test_dirty_address_padding_is_malformed() {
        let mut guard = Guard::new(GOV);
        guard.allow_sender(GOV, S, "").unwrap();
        guard.whitelist_token(GOV, A, "").unwrap();
        guard.allow_approval_destination(GOV, R, "").unwrap();

        let mut payload = approveCall {
            spender: R,
            amount: U256::from(1u64),
        }
        .abi_encode();
        assert!(guard.authorize(S, A, &payload).is_ok());

        // Same low 20 bytes, non-zero upper padding
        payload[4 + 11] = 0x01;
        assert!(matches!(
            guard.authorize(S, A, &payload),
            Err(GuardViolation::MalformedCallData(_))
        ));
    }

    #[test]
    fn test_authorize_is_repeatable() {
        let guard = swap_setup();
        let payload = swap_payload(vec![A, C], S);
        let first = guard.authorize(S, R, &payload);
        for _ in 0..3 {
            assert_eq!(guard.authorize(S, R, &payload), first);
        }
        assert_eq!(guard.events().len(), 4);
    }
}
