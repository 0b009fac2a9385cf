//! In-process wave log that behaves like the deployed wave contract.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::FutureExt;
use tokio::sync::broadcast;
use waveportal_core::api::{
    FinalizedWrite, LedgerError, LiveFeed, MemoryLedgerConfig, PendingWrite, RawWave, WaveLedger,
    NEW_WAVE_EVENT,
};

/// Flat cost of any write.
pub const BASE_WRITE_COST: u64 = 21_000;
/// Additional cost per message byte.
pub const BYTE_WRITE_COST: u64 = 16;

const FEED_CAPACITY: usize = 256;

pub fn intrinsic_cost(message: &str) -> u64 {
    BASE_WRITE_COST + BYTE_WRITE_COST * message.len() as u64
}

#[derive(Default)]
struct ChainState {
    waves: Vec<RawWave>,
    last_waved_at: HashMap<String, i64>,
}

/// Shared log. Every [`MemoryLedger`] handle connected to the same chain
/// sees the same waves and the same live feed.
pub struct MemoryChain {
    state: Mutex<ChainState>,
    feed: broadcast::Sender<RawWave>,
    block_time: Duration,
    cooldown_secs: i64,
    listeners: Arc<AtomicUsize>,
}

impl MemoryChain {
    pub fn new(cfg: &MemoryLedgerConfig) -> Arc<Self> {
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        Arc::new(Self {
            state: Mutex::new(ChainState::default()),
            feed,
            block_time: Duration::from_millis(cfg.block_time_ms),
            cooldown_secs: i64::try_from(cfg.cooldown_secs).unwrap_or(i64::MAX),
            listeners: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Handle that signs writes as `signer`.
    pub fn connect(self: &Arc<Self>, signer: impl Into<String>) -> MemoryLedger {
        MemoryLedger {
            chain: self.clone(),
            signer: signer.into(),
        }
    }

    pub fn total_waves(&self) -> u64 {
        self.lock().waves.len() as u64
    }

    /// Open live-feed registrations.
    pub fn listeners(&self) -> usize {
        self.listeners.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cooldown_reason(&self, signer: &str, now: i64) -> Option<String> {
        if self.cooldown_secs == 0 {
            return None;
        }
        let last = *self.lock().last_waved_at.get(signer)?;
        if last.saturating_add(self.cooldown_secs) < now {
            return None;
        }
        Some(if self.cooldown_secs % 60 == 0 {
            format!("Wait {}m", self.cooldown_secs / 60)
        } else {
            format!("Wait {}s", self.cooldown_secs)
        })
    }

    fn finalize(
        &self,
        signer: &str,
        message: String,
        resource_ceiling: u64,
        tx_hash: String,
    ) -> Result<FinalizedWrite, LedgerError> {
        if resource_ceiling < intrinsic_cost(&message) {
            return Err(LedgerError::rejected("out of gas"));
        }
        let now = Utc::now().timestamp();
        if let Some(reason) = self.cooldown_reason(signer, now) {
            return Err(LedgerError::rejected(reason));
        }

        let wave = RawWave::new(signer, now, message);
        {
            let mut state = self.lock();
            state.last_waved_at.insert(signer.to_string(), now);
            state.waves.push(wave.clone());
        }
        tracing::info!(sender = %signer, tx = %tx_hash, "{} has waved!", signer);
        // No receivers is fine; nobody is listening yet.
        let _ = self.feed.send(wave);
        Ok(FinalizedWrite { reference: tx_hash })
    }
}

/// Signer-bound handle onto a [`MemoryChain`].
#[derive(Clone)]
pub struct MemoryLedger {
    chain: Arc<MemoryChain>,
    signer: String,
}

impl MemoryLedger {
    pub fn signer(&self) -> &str {
        &self.signer
    }

    pub fn chain(&self) -> &Arc<MemoryChain> {
        &self.chain
    }
}

#[async_trait]
impl WaveLedger for MemoryLedger {
    fn name(&self) -> &str {
        "memory"
    }

    async fn read_all_entries(&self) -> Result<Vec<RawWave>, LedgerError> {
        Ok(self.chain.lock().waves.clone())
    }

    async fn write_entry(
        &self,
        message: &str,
        resource_ceiling: u64,
    ) -> Result<PendingWrite, LedgerError> {
        // Mirrors gas estimation: a write that would revert is refused up front.
        if let Some(reason) = self
            .chain
            .cooldown_reason(&self.signer, Utc::now().timestamp())
        {
            return Err(LedgerError::rejected(reason));
        }

        let tx_hash = format!("0x{}", uuid::Uuid::new_v4().simple());
        let chain = self.chain.clone();
        let signer = self.signer.clone();
        let message = message.to_string();
        let reference = tx_hash.clone();
        let finalization = async move {
            tokio::time::sleep(chain.block_time).await;
            chain.finalize(&signer, message, resource_ceiling, reference)
        }
        .boxed();

        Ok(PendingWrite::new(tx_hash, finalization))
    }

    async fn read_entry_count(&self) -> Result<u64, LedgerError> {
        Ok(self.chain.total_waves())
    }

    async fn subscribe(&self, event_name: &str) -> Result<LiveFeed, LedgerError> {
        if event_name != NEW_WAVE_EVENT {
            return Err(LedgerError::UnknownEvent(event_name.to_string()));
        }
        let rx = self.chain.feed.subscribe();
        let stream = futures::stream::unfold(rx, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(wave) => return Some((wave, rx)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Live feed lagged, notifications lost");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });

        let listeners = self.chain.listeners.clone();
        listeners.fetch_add(1, Ordering::SeqCst);
        Ok(LiveFeed::new(stream).with_release(move || {
            listeners.fetch_sub(1, Ordering::SeqCst);
        }))
    }
}
