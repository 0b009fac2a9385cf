use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::broadcast;

use waveportal_core::api::{
    FinalizedWrite, LedgerError, LiveFeed, PendingWrite, RawWave, Wallet, WalletError, WavePortal,
    WaveLedger, NEW_WAVE_EVENT,
};

/// Append-only log shared by every signer handle created from it.
pub struct SharedLog {
    waves: Mutex<Vec<RawWave>>,
    feed: broadcast::Sender<RawWave>,
    clock: AtomicUsize,
    pub listeners: Arc<AtomicUsize>,
}

impl SharedLog {
    pub fn new() -> Arc<Self> {
        let (feed, _) = broadcast::channel(64);
        Arc::new(Self {
            waves: Mutex::new(Vec::new()),
            feed,
            clock: AtomicUsize::new(1_000),
            listeners: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn signer(self: &Arc<Self>, address: &str) -> Arc<SignerLedger> {
        Arc::new(SignerLedger {
            log: self.clone(),
            address: address.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.waves.lock().unwrap().len()
    }

    fn append(&self, sender: &str, message: &str) -> String {
        let ts = self.clock.fetch_add(1, Ordering::SeqCst) as i64;
        let wave = RawWave::new(sender, ts, message);
        let mut waves = self.waves.lock().unwrap();
        waves.push(wave.clone());
        let _ = self.feed.send(wave);
        format!("0x{:064x}", waves.len())
    }
}

pub struct SignerLedger {
    log: Arc<SharedLog>,
    address: String,
}

#[async_trait]
impl WaveLedger for SignerLedger {
    fn name(&self) -> &str {
        "shared-log"
    }

    async fn read_all_entries(&self) -> Result<Vec<RawWave>, LedgerError> {
        Ok(self.log.waves.lock().unwrap().clone())
    }

    async fn write_entry(
        &self,
        message: &str,
        _resource_ceiling: u64,
    ) -> Result<PendingWrite, LedgerError> {
        let log = self.log.clone();
        let address = self.address.clone();
        let message = message.to_string();
        Ok(PendingWrite::new(
            "0xpending",
            async move {
                let reference = log.append(&address, &message);
                Ok(FinalizedWrite { reference })
            }
            .boxed(),
        ))
    }

    async fn read_entry_count(&self) -> Result<u64, LedgerError> {
        Ok(self.log.len() as u64)
    }

    async fn subscribe(&self, event_name: &str) -> Result<LiveFeed, LedgerError> {
        if event_name != NEW_WAVE_EVENT {
            return Err(LedgerError::UnknownEvent(event_name.to_string()));
        }
        let rx = self.log.feed.subscribe();
        let stream = futures::stream::unfold(rx, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(wave) => return Some((wave, rx)),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });
        let listeners = self.log.listeners.clone();
        listeners.fetch_add(1, Ordering::SeqCst);
        Ok(LiveFeed::new(stream).with_release(move || {
            listeners.fetch_sub(1, Ordering::SeqCst);
        }))
    }
}

pub struct UnlockedWallet(pub String);

#[async_trait]
impl Wallet for UnlockedWallet {
    async fn authorized_identities(&self) -> Result<Vec<String>, WalletError> {
        Ok(vec![self.0.clone()])
    }

    async fn request_authorization(&self) -> Result<Vec<String>, WalletError> {
        Ok(vec![self.0.clone()])
    }
}

pub fn wallet(address: &str) -> Option<Arc<dyn Wallet>> {
    Some(Arc::new(UnlockedWallet(address.to_string())))
}

pub async fn wait_for_entries(portal: &WavePortal, len: usize) {
    let mut rx = portal.sync().watch();
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|v| v.len() == len))
        .await
        .expect("view did not reach expected length")
        .expect("view channel closed");
}
