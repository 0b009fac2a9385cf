//! Account session: which wallet identity, if any, this client may act as.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;

use crate::error::WalletError;
use crate::ledger::Wallet;
use crate::state::{EventBus, PortalEvent};

pub struct AccountSession {
    wallet: Option<Arc<dyn Wallet>>,
    active: watch::Sender<Option<String>>,
    events: EventBus,
}

impl AccountSession {
    pub fn new(wallet: Option<Arc<dyn Wallet>>, events: EventBus) -> Self {
        let (active, _) = watch::channel(None);
        Self {
            wallet,
            active,
            events,
        }
    }

    /// Currently authorized address.
    pub fn active(&self) -> Option<String> {
        self.active.borrow().clone()
    }

    pub fn is_authorized(&self) -> bool {
        self.active.borrow().is_some()
    }

    pub fn watch(&self) -> watch::Receiver<Option<String>> {
        self.active.subscribe()
    }

    /// Silently picks up an identity the wallet already authorized.
    ///
    /// Never prompts and never errors: an absent wallet or an empty identity
    /// list leaves the session as it was.
    pub async fn restore(&self) -> Option<String> {
        let Some(wallet) = self.wallet.as_ref() else {
            tracing::warn!("No wallet available, session stays unauthorized");
            return self.active();
        };

        match wallet.authorized_identities().await {
            Ok(identities) => match first_identity(identities) {
                Some(address) => {
                    tracing::info!(address = %address, "Restored authorized account");
                    self.set_active(address, true);
                }
                None => tracing::warn!("No authorized account found"),
            },
            Err(err) => log_wallet_error("restore", &err),
        }

        self.active()
    }

    /// Explicitly requests authorization from the wallet.
    ///
    /// Rejection or an absent wallet is logged; the session keeps its
    /// previous state.
    pub async fn connect(&self) -> Option<String> {
        let Some(wallet) = self.wallet.as_ref() else {
            tracing::warn!("No wallet available, cannot connect");
            return self.active();
        };

        match wallet.request_authorization().await {
            Ok(identities) => match first_identity(identities) {
                Some(address) => {
                    tracing::info!(address = %address, "Connected");
                    self.set_active(address, false);
                }
                None => tracing::warn!("Wallet authorized no accounts"),
            },
            Err(err) => log_wallet_error("connect", &err),
        }

        self.active()
    }

    fn set_active(&self, address: String, restored: bool) {
        self.active.send_replace(Some(address.clone()));
        self.events.emit(PortalEvent::SessionAuthorized {
            address,
            restored,
            timestamp: Utc::now(),
        });
    }
}

fn first_identity(identities: Vec<String>) -> Option<String> {
    identities
        .into_iter()
        .map(|id| id.trim().to_string())
        .find(|id| !id.is_empty())
}

fn log_wallet_error(op: &str, err: &WalletError) {
    match err {
        WalletError::Unavailable => tracing::warn!(op = %op, "Wallet unavailable"),
        WalletError::Rejected(reason) => {
            tracing::warn!(op = %op, reason = %reason, "Wallet refused authorization")
        }
        WalletError::Request(msg) => tracing::error!(op = %op, error = %msg, "Wallet request failed"),
    }
}
