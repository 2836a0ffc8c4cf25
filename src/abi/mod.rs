//! Call payload codec
//!
//! A guarded payload is `selector (4 bytes) || ABI-encoded arguments`.
//! Only the three call shapes in [`KnownFunction`] are understood; the
//! guard rejects everything else before looking at arguments. Argument
//! layout is handled by the `sol!` bindings in [`calls`].

pub mod calls;
pub mod selector;
pub mod types;

// Re-export commonly used types
pub use calls::{approveCall, swapTokensForExactTokensCall, transferCall};
pub use selector::{calculate_selector, match_selector, KnownFunction, SELECTORS};
pub use types::{decode_hex, split_selector, Address, Selector, U256};
