//! Composition root wiring the session, the synchronizer and the submission
//! lifecycle around one event bus.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::ledger::{Wallet, WaveLedger};
use crate::session::AccountSession;
use crate::state::EventBus;
use crate::submission::{SubmissionLifecycle, SubmissionSettings, SubmissionState, SubmitRejected};
use crate::sync::{EntrySynchronizer, WaveEntry};

pub struct WavePortal {
    session: AccountSession,
    sync: EntrySynchronizer,
    submission: SubmissionLifecycle,
    events: EventBus,
    sync_started: AtomicBool,
}

impl WavePortal {
    pub fn new(
        cfg: &AppConfig,
        wallet: Option<Arc<dyn Wallet>>,
        ledger: Option<Arc<dyn WaveLedger>>,
    ) -> Self {
        let events = EventBus::new();
        Self {
            session: AccountSession::new(wallet, events.clone()),
            sync: EntrySynchronizer::new(ledger.clone(), cfg.sync.dedupe, events.clone()),
            submission: SubmissionLifecycle::new(
                ledger,
                SubmissionSettings::from(&cfg.submission),
                events.clone(),
            ),
            events,
            sync_started: AtomicBool::new(false),
        }
    }

    pub fn session(&self) -> &AccountSession {
        &self.session
    }

    pub fn sync(&self) -> &EntrySynchronizer {
        &self.sync
    }

    pub fn submission(&self) -> &SubmissionLifecycle {
        &self.submission
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Picks up an already authorized identity and, if there is one, starts
    /// synchronizing the log.
    pub async fn restore(&self) -> Option<String> {
        let address = self.session.restore().await?;
        self.start_sync().await;
        Some(address)
    }

    /// Asks the wallet for authorization and starts synchronizing on success.
    pub async fn connect(&self) -> Option<String> {
        let address = self.session.connect().await?;
        self.start_sync().await;
        Some(address)
    }

    /// Submits a wave as the active identity.
    pub async fn wave(&self, message: &str) -> Result<SubmissionState, SubmitRejected> {
        let address = self.session.active();
        self.submission.submit(message, address.as_deref()).await
    }

    pub fn reset(&self) -> bool {
        self.submission.reset()
    }

    pub fn entries(&self) -> Vec<WaveEntry> {
        self.sync.entries()
    }

    /// Releases the live feed. Safe to call on every exit path.
    pub fn teardown(&self) {
        if self.sync.unsubscribe() {
            tracing::debug!("Wave portal torn down");
        }
        self.sync_started.store(false, Ordering::SeqCst);
    }

    // The feed opens before the history read so entries finalized during the
    // read are not missed; the dedupe key absorbs the overlap.
    async fn start_sync(&self) {
        if self.sync_started.swap(true, Ordering::SeqCst) {
            return;
        }
        if !self.sync.subscribe(&self.session).await {
            tracing::warn!("Live feed unavailable, showing history only");
        }
        self.sync.load_history().await;
    }
}
