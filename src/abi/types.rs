//! Primitive ABI types: addresses, function selectors and 256-bit words

pub use alloy_primitives::{Address, U256};

use alloy_primitives::{hex, FixedBytes};

use crate::error::Error;

/// 4-byte function selector
pub type Selector = FixedBytes<4>;

/// Split a call payload into its selector and argument block
pub fn split_selector(data: &[u8]) -> Option<(Selector, &[u8])> {
    if data.len() < 4 {
        return None;
    }
    let (selector, args) = data.split_at(4);
    Some((Selector::from_slice(selector), args))
}

/// Decode a 0x-prefixed (or bare) hex string into bytes
pub fn decode_hex(s: &str) -> Result<Vec<u8>, Error> {
    Ok(hex::decode(s.trim())?)
}
