//! Builds a portal from configuration and forwards its events to the log.

use std::sync::Arc;

use waveportal_core::api::{AppConfig, CliError, PortalEvent, WavePortal};
use waveportal_plugins::factory::{build_ledger, build_wallet, signer_address};

pub fn build_portal(cfg: &AppConfig) -> Result<Arc<WavePortal>, CliError> {
    let signer = signer_address(cfg).unwrap_or_default();
    let ledger = build_ledger(cfg, &signer)?;
    let wallet = build_wallet(cfg);
    if wallet.is_none() {
        tracing::warn!("No wallet address configured, waving is disabled");
    }
    let portal = Arc::new(WavePortal::new(cfg, wallet, Some(ledger)));
    spawn_event_logger(&portal);
    Ok(portal)
}

pub fn spawn_event_logger(portal: &WavePortal) {
    let mut event_rx = portal.events().subscribe();
    tokio::spawn(async move {
        while let Ok(event) = event_rx.recv().await {
            match event {
                PortalEvent::SessionAuthorized {
                    address, restored, ..
                } => {
                    tracing::debug!("Account {} authorized (restored={})", address, restored);
                }
                PortalEvent::HistoryLoaded { count, .. } => {
                    tracing::debug!("History loaded: {} waves", count);
                }
                PortalEvent::HistoryLoadFailed { error, .. } => {
                    tracing::warn!("History load failed: {}", error);
                }
                PortalEvent::DuplicateDropped { address, .. } => {
                    tracing::debug!("Dropped duplicate wave from {}", address);
                }
                PortalEvent::SubmissionPhaseChanged {
                    old_phase,
                    new_phase,
                    ..
                } => {
                    tracing::debug!("Submission {} -> {}", old_phase, new_phase);
                }
                PortalEvent::SubmissionFailed { reason, .. } => {
                    tracing::debug!("Submission failed: {}", reason);
                }
                _ => {}
            }
        }
    });
}
