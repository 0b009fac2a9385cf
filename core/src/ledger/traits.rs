use async_trait::async_trait;

use super::types::{LiveFeed, PendingWrite, RawWave};
use crate::error::{LedgerError, WalletError};

/// Client for the remote append-only wave log.
#[async_trait]
pub trait WaveLedger: Send + Sync {
    fn name(&self) -> &str;

    /// Reads every entry the ledger currently holds, oldest first.
    async fn read_all_entries(&self) -> Result<Vec<RawWave>, LedgerError>;

    /// Dispatches one write carrying `message`, bounded by `resource_ceiling`.
    async fn write_entry(
        &self,
        message: &str,
        resource_ceiling: u64,
    ) -> Result<PendingWrite, LedgerError>;

    async fn read_entry_count(&self) -> Result<u64, LedgerError>;

    /// Opens a push subscription for `event_name` notifications.
    async fn subscribe(&self, event_name: &str) -> Result<LiveFeed, LedgerError>;
}

/// Holder of user identities able to sign writes.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Identities already authorized for this client, without prompting.
    async fn authorized_identities(&self) -> Result<Vec<String>, WalletError>;

    /// Asks for authorization. May prompt the user.
    async fn request_authorization(&self) -> Result<Vec<String>, WalletError>;
}
