//! `sol!` bindings for the guarded call shapes
//!
//! The generated `*Call` structs carry the selector, the canonical
//! signature and the ABI layout. Decoding always runs in validating mode so
//! non-canonical words (dirty address padding, out-of-range offsets) are
//! rejected instead of silently truncated.

use alloy_sol_types::{sol, SolCall};

use crate::error::GuardViolation;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IUniswapV2Router {
        function swapTokensForExactTokens(
            uint256 amountOut,
            uint256 amountInMax,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amounts);
    }

    #[derive(Debug, PartialEq, Eq)]
    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

pub use IERC20::{approveCall, transferCall};
pub use IUniswapV2Router::swapTokensForExactTokensCall;

/// Decode a full payload (selector included) as `C`
pub fn decode_call<C: SolCall>(data: &[u8]) -> Result<C, GuardViolation> {
    C::abi_decode_validate(data)
        .map_err(|e| GuardViolation::MalformedCallData(format!("{}: {}", C::SIGNATURE, e)))
}
