use std::sync::Arc;

use anyhow::Result;

use waveportal_core::api::{AppConfig, LedgerProvider, Wallet, WaveLedger};

use crate::ledger::{GatewayLedger, MemoryChain};
use crate::wallet::LocalWallet;

/// Wallet built from `[wallet]`, or `None` when no identity is configured.
pub fn build_wallet(cfg: &AppConfig) -> Option<Arc<dyn Wallet>> {
    signer_address(cfg)?;
    Some(Arc::new(LocalWallet::from_config(&cfg.wallet)))
}

/// Ledger client for `[ledger]`, signing as `signer`.
pub fn build_ledger(cfg: &AppConfig, signer: &str) -> Result<Arc<dyn WaveLedger>> {
    match &cfg.ledger.provider {
        LedgerProvider::Gateway(gw_cfg) => Ok(Arc::new(GatewayLedger::new(gw_cfg, signer)?)),
        LedgerProvider::Memory(mem_cfg) => Ok(Arc::new(MemoryChain::new(mem_cfg).connect(signer))),
    }
}

/// The identity writes are signed with: the first configured address.
pub fn signer_address(cfg: &AppConfig) -> Option<String> {
    cfg.wallet
        .addresses
        .iter()
        .map(|a| a.trim())
        .find(|a| !a.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use waveportal_core::api::{MemoryLedgerConfig, WalletConfig};

    #[test]
    fn no_addresses_means_no_wallet() {
        let cfg = AppConfig::default();
        assert!(build_wallet(&cfg).is_none());
        assert_eq!(signer_address(&cfg), None);
    }

    #[test]
    fn builds_memory_ledger() {
        let mut cfg = AppConfig::default();
        cfg.ledger.provider = LedgerProvider::Memory(MemoryLedgerConfig::default());
        cfg.wallet = WalletConfig {
            addresses: vec![" 0xA ".into()],
            pre_authorized: true,
        };
        let ledger = build_ledger(&cfg, "0xA").unwrap();
        assert_eq!(ledger.name(), "memory");
        assert!(build_wallet(&cfg).is_some());
        assert_eq!(signer_address(&cfg).as_deref(), Some("0xA"));
    }

    #[test]
    fn builds_gateway_ledger_by_default() {
        let ledger = build_ledger(&AppConfig::default(), "0xA").unwrap();
        assert_eq!(ledger.name(), "gateway");
    }
}
