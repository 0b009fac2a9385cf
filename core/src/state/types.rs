//! Events emitted by the portal components.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::submission::SubmissionPhase;

#[derive(Debug, Clone, Serialize)]
pub enum PortalEvent {
    /// An identity became active for this session
    SessionAuthorized {
        address: String,
        restored: bool,
        timestamp: DateTime<Utc>,
    },
    /// The view was replaced with the ledger's full history
    HistoryLoaded {
        count: usize,
        timestamp: DateTime<Utc>,
    },
    /// History read failed; the view was left untouched
    HistoryLoadFailed {
        error: String,
        timestamp: DateTime<Utc>,
    },
    /// A live entry was appended to the view
    EntryAppended {
        address: String,
        timestamp: DateTime<Utc>,
    },
    /// A live entry was already present in the view
    DuplicateDropped {
        address: String,
        timestamp: DateTime<Utc>,
    },
    FeedReleased { timestamp: DateTime<Utc> },
    SubmissionPhaseChanged {
        old_phase: SubmissionPhase,
        new_phase: SubmissionPhase,
        timestamp: DateTime<Utc>,
    },
    SubmissionConfirmed {
        reference: String,
        timestamp: DateTime<Utc>,
    },
    SubmissionFailed {
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl PortalEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::SessionAuthorized { timestamp, .. }
            | Self::HistoryLoaded { timestamp, .. }
            | Self::HistoryLoadFailed { timestamp, .. }
            | Self::EntryAppended { timestamp, .. }
            | Self::DuplicateDropped { timestamp, .. }
            | Self::FeedReleased { timestamp }
            | Self::SubmissionPhaseChanged { timestamp, .. }
            | Self::SubmissionConfirmed { timestamp, .. }
            | Self::SubmissionFailed { timestamp, .. } => *timestamp,
        }
    }
}
