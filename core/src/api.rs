//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `waveportal_core::api` instead of reaching into internal modules.

pub use crate::config::{
    load_default, load_from_path, AppConfig, GatewayLedgerConfig, LedgerConfig, LedgerProvider,
    LoggingConfig, MemoryLedgerConfig, SubmissionConfig, SyncConfig, WalletConfig,
};
pub use crate::error::{CliError, LedgerError, WalletError, GENERIC_FAILURE_REASON};
pub use crate::ledger::{
    FinalizedWrite, LiveFeed, PendingWrite, RawWave, ReleaseGuard, Wallet, WaveLedger,
    NEW_WAVE_EVENT,
};
pub use crate::portal::WavePortal;
pub use crate::session::AccountSession;
pub use crate::state::{EventBus, PortalEvent};
pub use crate::submission::{
    SubmissionLifecycle, SubmissionPhase, SubmissionSettings, SubmissionState, SubmitRejected,
    ABANDONED_REASON,
};
pub use crate::sync::{EntrySynchronizer, EntryView, WaveEntry};
