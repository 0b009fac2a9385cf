pub mod traits;
pub mod types;

pub use traits::{Wallet, WaveLedger};
pub use types::{FinalizedWrite, LiveFeed, PendingWrite, RawWave, ReleaseGuard, NEW_WAVE_EVENT};
