//! Argument validators
//!
//! Each validator checks where value can flow, never how much: amounts
//! and deadlines are left to the caller's own risk controls.

use crate::abi::{approveCall, swapTokensForExactTokensCall, transferCall};
use crate::error::GuardViolation;

use super::policy::PolicyStore;

/// Receiver first, then tokenIn (`path[0]`), then tokenOut (`path[last]`)
pub fn validate_swap(
    policy: &PolicyStore,
    args: &swapTokensForExactTokensCall,
) -> Result<(), GuardViolation> {
    if !policy.is_allowed_receiver(args.to) {
        return Err(GuardViolation::ReceiverNotAllowed(args.to));
    }

    let (token_in, token_out) = match (args.path.first(), args.path.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => {
            return Err(GuardViolation::MalformedCallData(
                "swap path is empty".to_string(),
            ))
        }
    };

    if !policy.is_allowed_asset(token_in) {
        return Err(GuardViolation::AssetNotAllowed(token_in));
    }

    if !policy.is_allowed_asset(token_out) {
        return Err(GuardViolation::AssetNotAllowed(token_out));
    }

    Ok(())
}

pub fn validate_transfer(policy: &PolicyStore, args: &transferCall) -> Result<(), GuardViolation> {
    if !policy.is_allowed_withdraw_destination(args.to) {
        return Err(GuardViolation::WithdrawDestinationNotAllowed(args.to));
    }
    Ok(())
}

pub fn validate_approve(policy: &PolicyStore, args: &approveCall) -> Result<(), GuardViolation> {
    if !policy.is_allowed_approval_destination(args.spender) {
        return Err(GuardViolation::ApprovalDestinationNotAllowed(args.spender));
    }
    Ok(())
}
