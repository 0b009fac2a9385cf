//! Scripted collaborators for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};

use crate::error::{LedgerError, WalletError};
use crate::ledger::{FinalizedWrite, LiveFeed, PendingWrite, RawWave, Wallet, WaveLedger};

/// What the next `write_entry` call does.
pub enum WriteScript {
    Finalize {
        pending: String,
        reference: String,
    },
    RejectDispatch(LedgerError),
    FailFinalization {
        pending: String,
        error: LedgerError,
    },
    /// Finalization resolves when the test sends on the paired channel.
    Gated {
        pending: String,
        gate: oneshot::Receiver<Result<FinalizedWrite, LedgerError>>,
    },
}

#[derive(Default)]
pub struct MockLedger {
    history: Mutex<Option<Result<Vec<RawWave>, LedgerError>>>,
    count: Mutex<Option<Result<u64, LedgerError>>>,
    write: Mutex<Option<WriteScript>>,
    live: Mutex<Option<mpsc::UnboundedSender<RawWave>>>,
    during_read: Mutex<Option<RawWave>>,
    pub writes: AtomicUsize,
    pub count_reads: AtomicUsize,
    pub subscriptions: AtomicUsize,
    pub releases: Arc<AtomicUsize>,
    pub last_ceiling: Mutex<Option<u64>>,
}

impl MockLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_history(&self, history: Result<Vec<RawWave>, LedgerError>) {
        *self.history.lock().unwrap() = Some(history);
    }

    pub fn set_count(&self, count: Result<u64, LedgerError>) {
        *self.count.lock().unwrap() = Some(count);
    }

    pub fn script_write(&self, script: WriteScript) {
        *self.write.lock().unwrap() = Some(script);
    }

    /// Gated write; returns the sender that settles finalization.
    pub fn gate_write(
        &self,
        pending: &str,
    ) -> oneshot::Sender<Result<FinalizedWrite, LedgerError>> {
        let (tx, rx) = oneshot::channel();
        self.script_write(WriteScript::Gated {
            pending: pending.to_string(),
            gate: rx,
        });
        tx
    }

    /// Makes the next history read push `raw` on the live feed after taking
    /// its snapshot, then yield long enough for the feed to deliver it.
    pub fn deliver_during_read(&self, raw: RawWave) {
        *self.during_read.lock().unwrap() = Some(raw);
    }

    /// Delivers a live notification to the open feed.
    pub fn push_live(&self, raw: RawWave) -> bool {
        match self.live.lock().unwrap().as_ref() {
            Some(tx) => tx.send(raw).is_ok(),
            None => false,
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WaveLedger for MockLedger {
    fn name(&self) -> &str {
        "mock"
    }

    async fn read_all_entries(&self) -> Result<Vec<RawWave>, LedgerError> {
        let snapshot = self
            .history
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(Vec::new()));
        let late = self.during_read.lock().unwrap().take();
        if let Some(raw) = late {
            self.push_live(raw);
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }
        snapshot
    }

    async fn write_entry(
        &self,
        _message: &str,
        resource_ceiling: u64,
    ) -> Result<PendingWrite, LedgerError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        *self.last_ceiling.lock().unwrap() = Some(resource_ceiling);
        let script = self
            .write
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| LedgerError::Unavailable("no scripted write".into()))?;

        match script {
            WriteScript::Finalize { pending, reference } => Ok(PendingWrite::new(
                pending,
                async move { Ok(FinalizedWrite { reference }) }.boxed(),
            )),
            WriteScript::RejectDispatch(err) => Err(err),
            WriteScript::FailFinalization { pending, error } => {
                Ok(PendingWrite::new(pending, async move { Err(error) }.boxed()))
            }
            WriteScript::Gated { pending, gate } => Ok(PendingWrite::new(
                pending,
                async move {
                    gate.await
                        .unwrap_or_else(|_| Err(LedgerError::Transport("gate dropped".into())))
                }
                .boxed(),
            )),
        }
    }

    async fn read_entry_count(&self) -> Result<u64, LedgerError> {
        self.count_reads.fetch_add(1, Ordering::SeqCst);
        self.count.lock().unwrap().clone().unwrap_or(Ok(0))
    }

    async fn subscribe(&self, event_name: &str) -> Result<LiveFeed, LedgerError> {
        if event_name != crate::ledger::NEW_WAVE_EVENT {
            return Err(LedgerError::UnknownEvent(event_name.to_string()));
        }
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        *self.live.lock().unwrap() = Some(tx);

        let releases = self.releases.clone();
        let stream =
            futures::stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|w| (w, rx)) });
        Ok(LiveFeed::new(stream).with_release(move || {
            releases.fetch_add(1, Ordering::SeqCst);
        }))
    }
}

pub struct MockWallet {
    pub identities: Vec<String>,
    pub pre_authorized: bool,
}

impl MockWallet {
    pub fn authorized(address: &str) -> Arc<Self> {
        Arc::new(Self {
            identities: vec![address.to_string()],
            pre_authorized: true,
        })
    }

    pub fn locked(address: &str) -> Arc<Self> {
        Arc::new(Self {
            identities: vec![address.to_string()],
            pre_authorized: false,
        })
    }
}

#[async_trait]
impl Wallet for MockWallet {
    async fn authorized_identities(&self) -> Result<Vec<String>, WalletError> {
        if self.pre_authorized {
            Ok(self.identities.clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn request_authorization(&self) -> Result<Vec<String>, WalletError> {
        Ok(self.identities.clone())
    }
}

pub fn raw(addr: &str, ts: i64, msg: &str) -> RawWave {
    RawWave::new(addr, ts, msg)
}
