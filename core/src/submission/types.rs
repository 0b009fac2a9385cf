use serde::{Deserialize, Serialize};

/// Phase of the single outbound write.
///
/// `Dispatching` and `Broadcast` together make up the pending stretch:
/// `Dispatching` until the ledger accepts the write into its pending pool,
/// `Broadcast` while waiting for finalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Dispatching,
    Broadcast,
    Confirmed,
    Failed,
}

impl SubmissionPhase {
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Dispatching | Self::Broadcast)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dispatching => "dispatching",
            Self::Broadcast => "broadcast",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SubmissionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a consumer needs to render the submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionState {
    pub phase: SubmissionPhase,
    /// Message being written; cleared once the write is confirmed.
    pub draft: String,
    /// Reference the ledger assigned when accepting the write.
    pub pending_reference: Option<String>,
    /// Reference of the finalized write.
    pub reference: Option<String>,
    /// Why the write failed.
    pub reason: Option<String>,
}
