//! Error types for the guard

use thiserror::Error;

use crate::abi::{Address, Selector};

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Reason a guarded call or a policy mutation was rejected.
///
/// Every variant is terminal: the forwarded call must not execute and no
/// policy state has changed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardViolation {
    #[error("Caller {0} is not the governance identity")]
    Unauthorized(Address),

    #[error("Sender {0} is not allowed")]
    SenderNotAllowed(Address),

    #[error("Call site {target} {selector} is not allowed")]
    CallSiteNotAllowed { target: Address, selector: Selector },

    #[error("Receiver {0} is not allowed")]
    ReceiverNotAllowed(Address),

    #[error("Asset {0} is not allowed")]
    AssetNotAllowed(Address),

    #[error("Withdraw destination {0} is not allowed")]
    WithdrawDestinationNotAllowed(Address),

    #[error("Approval destination {0} is not allowed")]
    ApprovalDestinationNotAllowed(Address),

    #[error("Unknown function selector {0}")]
    UnknownSelector(Selector),

    #[error("Malformed call data: {0}")]
    MalformedCallData(String),
}

impl GuardViolation {
    /// Stable kind name, independent of the offending key
    pub fn kind(&self) -> &'static str {
        match self {
            GuardViolation::Unauthorized(_) => "Unauthorized",
            GuardViolation::SenderNotAllowed(_) => "SenderNotAllowed",
            GuardViolation::CallSiteNotAllowed { .. } => "CallSiteNotAllowed",
            GuardViolation::ReceiverNotAllowed(_) => "ReceiverNotAllowed",
            GuardViolation::AssetNotAllowed(_) => "AssetNotAllowed",
            GuardViolation::WithdrawDestinationNotAllowed(_) => "WithdrawDestinationNotAllowed",
            GuardViolation::ApprovalDestinationNotAllowed(_) => "ApprovalDestinationNotAllowed",
            GuardViolation::UnknownSelector(_) => "UnknownSelector",
            GuardViolation::MalformedCallData(_) => "MalformedCallData",
        }
    }

    /// Check if this violation came from the admin gate rather than a call check
    pub fn is_admin_violation(&self) -> bool {
        matches!(self, GuardViolation::Unauthorized(_))
    }
}

/// Main error type for the guard crate
#[derive(Error, Debug)]
pub enum Error {
    // Parse errors
    #[error("Invalid hex data: {0}")]
    InvalidHex(String),

    // Policy errors
    #[error(transparent)]
    Violation(#[from] GuardViolation),

    #[error("Policy file not found: {0}")]
    PolicyNotFound(String),

    #[error("Unsupported policy snapshot version: {0}")]
    UnsupportedSnapshotVersion(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl Error {
    /// The guard violation behind this error, if any
    pub fn violation(&self) -> Option<&GuardViolation> {
        match self {
            Error::Violation(v) => Some(v),
            _ => None,
        }
    }
}

// Conversion from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

// Conversion from I/O errors
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

impl From<alloy_primitives::hex::FromHexError> for Error {
    fn from(e: alloy_primitives::hex::FromHexError) -> Self {
        Error::InvalidHex(e.to_string())
    }
}
