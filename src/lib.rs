//! Hot-Wallet Call Guard Library
//!
//! Authorization guard for calls a trading hot wallet makes on behalf of
//! a vault: only allow-listed routers, tokens and destinations pass.

pub mod abi;
pub mod cli;
pub mod config;
pub mod error;
pub mod guard;

// Re-export commonly used types
pub use abi::{Address, Selector};
pub use config::Config;
pub use error::{Error, GuardViolation, Result};
pub use guard::{Authorized, Guard};
