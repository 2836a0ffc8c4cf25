//! Selector dispatch
//!
//! Splits a payload into selector and arguments and decodes the
//! arguments for one of the known call shapes. Unknown selectors are
//! rejected outright, even when their call site is allowed.

use crate::abi::calls::decode_call;
use crate::abi::{
    approveCall, match_selector, split_selector, swapTokensForExactTokensCall, transferCall,
    KnownFunction, Selector,
};
use crate::error::GuardViolation;

use super::policy::PolicyStore;
use super::validate;

/// Decoded guarded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardedCall {
    Swap(swapTokensForExactTokensCall),
    Transfer(transferCall),
    Approve(approveCall),
}

impl GuardedCall {
    /// Parse a full payload (selector included)
    pub fn parse(data: &[u8]) -> Result<Self, GuardViolation> {
        let selector = read_selector(data)?;
        let function = match_selector(selector).ok_or(GuardViolation::UnknownSelector(selector))?;
        Self::decode(function, data)
    }

    /// Decode a full payload already matched to `function`
    pub fn decode(function: KnownFunction, data: &[u8]) -> Result<Self, GuardViolation> {
        match function {
            KnownFunction::SwapTokensForExactTokens => {
                let call: swapTokensForExactTokensCall = decode_call(data)?;
                if call.path.is_empty() {
                    return Err(GuardViolation::MalformedCallData(
                        "swap path is empty".to_string(),
                    ));
                }
                Ok(GuardedCall::Swap(call))
            }
            KnownFunction::Transfer => Ok(GuardedCall::Transfer(decode_call(data)?)),
            KnownFunction::Approve => Ok(GuardedCall::Approve(decode_call(data)?)),
        }
    }

    pub fn function(&self) -> KnownFunction {
        match self {
            GuardedCall::Swap(_) => KnownFunction::SwapTokensForExactTokens,
            GuardedCall::Transfer(_) => KnownFunction::Transfer,
            GuardedCall::Approve(_) => KnownFunction::Approve,
        }
    }

    /// Run the argument validator for this call shape
    pub fn validate(&self, policy: &PolicyStore) -> Result<(), GuardViolation> {
        match self {
            GuardedCall::Swap(call) => validate::validate_swap(policy, call),
            GuardedCall::Transfer(call) => validate::validate_transfer(policy, call),
            GuardedCall::Approve(call) => validate::validate_approve(policy, call),
        }
    }
}

/// Read the 4-byte selector
pub fn read_selector(data: &[u8]) -> Result<Selector, GuardViolation> {
    split_selector(data).map(|(selector, _)| selector).ok_or_else(|| {
        GuardViolation::MalformedCallData(format!(
            "payload of {} bytes has no selector",
            data.len()
        ))
    })
}
