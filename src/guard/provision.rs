//! Batch provisioning for common integrations

use crate::abi::{Address, SELECTORS};
use crate::error::GuardViolation;

use super::Guard;

impl Guard {
    /// Allow `transfer` and `approve` on a token contract
    pub fn whitelist_token(
        &mut self,
        caller: Address,
        token: Address,
        note: &str,
    ) -> Result<(), GuardViolation> {
        self.allow_call_site(caller, token, SELECTORS::TRANSFER, note)?;
        self.allow_call_site(caller, token, SELECTORS::APPROVE, note)
    }

    /// Allow the fixed-output swap on a router and approvals towards it
    pub fn whitelist_router(
        &mut self,
        caller: Address,
        router: Address,
        note: &str,
    ) -> Result<(), GuardViolation> {
        self.allow_call_site(caller, router, SELECTORS::SWAP_TOKENS_FOR_EXACT_TOKENS, note)?;
        self.allow_approval_destination(caller, router, note)
    }
}
