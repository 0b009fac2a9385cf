use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use waveportal_core::api::{Wallet, WalletConfig, WalletError};

/// Wallet holding a fixed set of configured identities.
///
/// Unless pre-authorized, identities are only reported after
/// `request_authorization` succeeded once.
pub struct LocalWallet {
    addresses: Vec<String>,
    authorized: AtomicBool,
}

impl LocalWallet {
    pub fn new(addresses: Vec<String>, pre_authorized: bool) -> Self {
        Self {
            addresses,
            authorized: AtomicBool::new(pre_authorized),
        }
    }

    pub fn from_config(cfg: &WalletConfig) -> Self {
        let addresses = cfg
            .addresses
            .iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        Self::new(addresses, cfg.pre_authorized)
    }
}

#[async_trait]
impl Wallet for LocalWallet {
    async fn authorized_identities(&self) -> Result<Vec<String>, WalletError> {
        if self.authorized.load(Ordering::SeqCst) {
            Ok(self.addresses.clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn request_authorization(&self) -> Result<Vec<String>, WalletError> {
        if self.addresses.is_empty() {
            return Err(WalletError::Rejected("no identities configured".into()));
        }
        self.authorized.store(true, Ordering::SeqCst);
        Ok(self.addresses.clone())
    }
}
