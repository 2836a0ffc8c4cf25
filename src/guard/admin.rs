//! Governance-only mutations of the policy store
//!
//! Every call either fails with `Unauthorized` and changes nothing, or
//! touches exactly one entry and emits one event. Repeating an allow or a
//! remove is a state no-op that still emits its event.

use tracing::info;

use crate::abi::{Address, Selector};
use crate::error::GuardViolation;

use super::events::PolicyAction;
use super::policy::PolicyKey;
use super::Guard;

impl Guard {
    fn ensure_governance(&self, caller: Address) -> Result<(), GuardViolation> {
        if !self.policy().is_governance(caller) {
            return Err(GuardViolation::Unauthorized(caller));
        }
        Ok(())
    }

    /// Mark `key` as allowed and emit `<Kind>Approved`
    pub fn allow(
        &mut self,
        caller: Address,
        key: PolicyKey,
        note: &str,
    ) -> Result<(), GuardViolation> {
        self.apply(caller, key, PolicyAction::Approved, note)
    }

    /// Revert `key` to the default deny and emit `<Kind>Removed`
    pub fn remove(
        &mut self,
        caller: Address,
        key: PolicyKey,
        note: &str,
    ) -> Result<(), GuardViolation> {
        self.apply(caller, key, PolicyAction::Removed, note)
    }

    fn apply(
        &mut self,
        caller: Address,
        key: PolicyKey,
        action: PolicyAction,
        note: &str,
    ) -> Result<(), GuardViolation> {
        self.ensure_governance(caller)?;

        let changed = self.store.set(&key, action == PolicyAction::Approved);
        let event = self.events.record(action, key, note);
        info!(
            event = %event.event,
            key = %key,
            note = %note,
            changed,
            "Policy updated"
        );
        Ok(())
    }

    pub fn allow_call_site(
        &mut self,
        caller: Address,
        target: Address,
        selector: Selector,
        note: &str,
    ) -> Result<(), GuardViolation> {
        self.allow(caller, PolicyKey::CallSite { target, selector }, note)
    }

    pub fn remove_call_site(
        &mut self,
        caller: Address,
        target: Address,
        selector: Selector,
        note: &str,
    ) -> Result<(), GuardViolation> {
        self.remove(caller, PolicyKey::CallSite { target, selector }, note)
    }

    pub fn allow_asset(
        &mut self,
        caller: Address,
        token: Address,
        note: &str,
    ) -> Result<(), GuardViolation> {
        self.allow(caller, PolicyKey::Asset { address: token }, note)
    }

    pub fn remove_asset(
        &mut self,
        caller: Address,
        token: Address,
        note: &str,
    ) -> Result<(), GuardViolation> {
        self.remove(caller, PolicyKey::Asset { address: token }, note)
    }

    pub fn allow_sender(
        &mut self,
        caller: Address,
        sender: Address,
        note: &str,
    ) -> Result<(), GuardViolation> {
        self.allow(caller, PolicyKey::Sender { address: sender }, note)
    }

    pub fn remove_sender(
        &mut self,
        caller: Address,
        sender: Address,
        note: &str,
    ) -> Result<(), GuardViolation> {
        self.remove(caller, PolicyKey::Sender { address: sender }, note)
    }

    pub fn allow_withdraw_destination(
        &mut self,
        caller: Address,
        destination: Address,
        note: &str,
    ) -> Result<(), GuardViolation> {
        self.allow(caller, PolicyKey::WithdrawDestination { address: destination }, note)
    }

    pub fn remove_withdraw_destination(
        &mut self,
        caller: Address,
        destination: Address,
        note: &str,
    ) -> Result<(), GuardViolation> {
        self.remove(caller, PolicyKey::WithdrawDestination { address: destination }, note)
    }

    pub fn allow_approval_destination(
        &mut self,
        caller: Address,
        destination: Address,
        note: &str,
    ) -> Result<(), GuardViolation> {
        self.allow(caller, PolicyKey::ApprovalDestination { address: destination }, note)
    }

    pub fn remove_approval_destination(
        &mut self,
        caller: Address,
        destination: Address,
        note: &str,
    ) -> Result<(), GuardViolation> {
        self.remove(caller, PolicyKey::ApprovalDestination { address: destination }, note)
    }
}
