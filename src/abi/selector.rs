//! Function selectors for the guarded call shapes
//!
//! # How selectors are calculated
//! A selector is the first 4 bytes of Keccak-256 over the canonical
//! function signature, e.g. `keccak256("transfer(address,uint256)")[0..4]`.
//! The constants below come from the `sol!` bindings; the tests cross-check
//! them against the hash and against the well-known values.

use alloy_primitives::keccak256;
use alloy_sol_types::SolCall;

use super::calls::{approveCall, swapTokensForExactTokensCall, transferCall};
use super::types::Selector;

/// Selectors of the functions the guard knows how to decode.
#[allow(non_snake_case)]
pub mod SELECTORS {
    use super::{approveCall, swapTokensForExactTokensCall, transferCall, Selector, SolCall};

    /// swapTokensForExactTokens(uint256,uint256,address[],address,uint256)
    pub const SWAP_TOKENS_FOR_EXACT_TOKENS: Selector =
        Selector::new(swapTokensForExactTokensCall::SELECTOR);

    /// transfer(address,uint256)
    pub const TRANSFER: Selector = Selector::new(transferCall::SELECTOR);

    /// approve(address,uint256)
    pub const APPROVE: Selector = Selector::new(approveCall::SELECTOR);
}

/// The closed set of call shapes the guard accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownFunction {
    /// Router swap with a fixed output amount
    SwapTokensForExactTokens,
    /// Plain token transfer
    Transfer,
    /// Token spending approval
    Approve,
}

impl KnownFunction {
    pub const ALL: [KnownFunction; 3] = [
        KnownFunction::SwapTokensForExactTokens,
        KnownFunction::Transfer,
        KnownFunction::Approve,
    ];

    /// Canonical signature string
    pub fn signature(&self) -> &'static str {
        match self {
            KnownFunction::SwapTokensForExactTokens => swapTokensForExactTokensCall::SIGNATURE,
            KnownFunction::Transfer => transferCall::SIGNATURE,
            KnownFunction::Approve => approveCall::SIGNATURE,
        }
    }

    pub fn selector(&self) -> Selector {
        match self {
            KnownFunction::SwapTokensForExactTokens => SELECTORS::SWAP_TOKENS_FOR_EXACT_TOKENS,
            KnownFunction::Transfer => SELECTORS::TRANSFER,
            KnownFunction::Approve => SELECTORS::APPROVE,
        }
    }
}

impl std::fmt::Display for KnownFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KnownFunction::SwapTokensForExactTokens => write!(f, "swapTokensForExactTokens"),
            KnownFunction::Transfer => write!(f, "transfer"),
            KnownFunction::Approve => write!(f, "approve"),
        }
    }
}

/// Map a selector onto a known call shape
pub fn match_selector(selector: Selector) -> Option<KnownFunction> {
    match selector.0 {
        swapTokensForExactTokensCall::SELECTOR => Some(KnownFunction::SwapTokensForExactTokens),
        transferCall::SELECTOR => Some(KnownFunction::Transfer),
        approveCall::SELECTOR => Some(KnownFunction::Approve),
        _ => None,
    }
}

/// Calculate a selector from a function signature
pub fn calculate_selector(signature: &str) -> Selector {
    Selector::from_slice(&keccak256(signature.as_bytes())[..4])
}
