use std::time::Duration;

use thiserror::Error;

/// Shown to the user when a failed write carries no reason of its own.
pub const GENERIC_FAILURE_REASON: &str =
    "Something went wrong while submitting your wave. Please try again.";

/// Errors raised by the wallet collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("wallet unavailable")]
    Unavailable,
    #[error("authorization rejected: {0}")]
    Rejected(String),
    #[error("wallet request failed: {0}")]
    Request(String),
}

/// Errors raised by the remote ledger client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("transaction rejected: {}", reason.as_deref().unwrap_or("<no reason>"))]
    Rejected { reason: Option<String> },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed ledger response: {0}")]
    Decode(String),

    #[error("timed out waiting for finalization after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("unknown event: {0}")]
    UnknownEvent(String),
}

impl LedgerError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: Some(reason.into()),
        }
    }

    /// Human-readable reason carried by the failure, if any.
    ///
    /// Only rejections and local timeouts carry a reason; transport level
    /// failures fall back to [`GENERIC_FAILURE_REASON`] at the call site.
    pub fn reason(&self) -> Option<String> {
        match self {
            Self::Rejected { reason } => reason
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
            Self::Timeout(_) => Some(self.to_string()),
            _ => None,
        }
    }

    pub fn reason_or_generic(&self) -> String {
        self.reason()
            .unwrap_or_else(|| GENERIC_FAILURE_REASON.to_string())
    }
}
