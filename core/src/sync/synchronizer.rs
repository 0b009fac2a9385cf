use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::entry::WaveEntry;
use super::view::EntryView;
use crate::ledger::{RawWave, ReleaseGuard, WaveLedger, NEW_WAVE_EVENT};
use crate::session::AccountSession;
use crate::state::{EventBus, PortalEvent};

/// Keeps the client-side view of the wave log in step with the ledger.
///
/// One history read replaces the view; the live feed appends to it. The view
/// is only ever written by this type.
pub struct EntrySynchronizer {
    ledger: Option<Arc<dyn WaveLedger>>,
    view: Arc<watch::Sender<EntryView>>,
    feed: Mutex<Option<FeedTask>>,
    dedupe: bool,
    events: EventBus,
}

/// A running live-feed pump. Dropping it stops the pump and releases the
/// ledger listener.
struct FeedTask {
    pump: JoinHandle<()>,
    _guard: ReleaseGuard,
}

impl Drop for FeedTask {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

impl EntrySynchronizer {
    pub fn new(ledger: Option<Arc<dyn WaveLedger>>, dedupe: bool, events: EventBus) -> Self {
        let (view, _) = watch::channel(EntryView::default());
        Self {
            ledger,
            view: Arc::new(view),
            feed: Mutex::new(None),
            dedupe,
            events,
        }
    }

    /// Snapshot of the current view.
    pub fn entries(&self) -> Vec<WaveEntry> {
        self.view.borrow().entries().to_vec()
    }

    pub fn len(&self) -> usize {
        self.view.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.borrow().is_empty()
    }

    /// Receiver that is notified on every view change.
    pub fn watch(&self) -> watch::Receiver<EntryView> {
        self.view.subscribe()
    }

    pub fn is_subscribed(&self) -> bool {
        self.feed_slot()
            .as_ref()
            .is_some_and(|task| !task.pump.is_finished())
    }

    /// Reads the full log once and replaces the view with it.
    ///
    /// Live entries that arrived while the read was in flight and are missing
    /// from it stay in the view, behind the history. Returns the number of
    /// history entries loaded. Failures are logged and leave the view as it was.
    pub async fn load_history(&self) -> Option<usize> {
        let Some(ledger) = self.ledger.as_ref() else {
            tracing::warn!("No ledger available, wave history not loaded");
            return None;
        };

        // Live entries appended after this point may be newer than the read.
        let since = self.view.borrow().revision();
        let raws = match ledger.read_all_entries().await {
            Ok(raws) => raws,
            Err(err) => {
                tracing::error!(ledger = ledger.name(), error = %err, "Failed to load wave history");
                self.events.emit(PortalEvent::HistoryLoadFailed {
                    error: err.to_string(),
                    timestamp: Utc::now(),
                });
                return None;
            }
        };

        let entries: Vec<WaveEntry> = raws.into_iter().filter_map(convert).collect();
        let count = entries.len();
        let mut carried = 0;
        self.view
            .send_modify(|view| carried = view.replace(entries, since));

        tracing::debug!(count, carried, "Wave history loaded");
        self.events.emit(PortalEvent::HistoryLoaded {
            count,
            timestamp: Utc::now(),
        });
        Some(count)
    }

    /// Opens the live feed and starts appending its entries to the view.
    ///
    /// A no-op when the session is not authorized, the ledger is absent or a
    /// feed is already running. Returns whether a feed is running afterwards.
    pub async fn subscribe(&self, session: &AccountSession) -> bool {
        if !session.is_authorized() {
            tracing::debug!("Session not authorized, live feed not opened");
            return false;
        }
        if self.is_subscribed() {
            return true;
        }
        let Some(ledger) = self.ledger.as_ref() else {
            tracing::warn!("No ledger available, live feed not opened");
            return false;
        };

        let feed = match ledger.subscribe(NEW_WAVE_EVENT).await {
            Ok(feed) => feed,
            Err(err) => {
                tracing::error!(ledger = ledger.name(), error = %err, "Failed to open live feed");
                return false;
            }
        };

        let mut slot = self.feed_slot();
        if slot.as_ref().is_some_and(|task| !task.pump.is_finished()) {
            // Lost a race with a concurrent subscribe; `feed` is released on drop.
            return true;
        }

        let (mut stream, guard) = feed.into_parts();
        let view = self.view.clone();
        let events = self.events.clone();
        let dedupe = self.dedupe;
        let pump = tokio::spawn(async move {
            while let Some(raw) = stream.next().await {
                ingest_live(&view, raw, dedupe, &events);
            }
            tracing::debug!("Live feed closed by ledger");
        });

        // Replacing a finished task releases its listener.
        *slot = Some(FeedTask {
            pump,
            _guard: guard,
        });
        tracing::debug!(event = NEW_WAVE_EVENT, "Live feed opened");
        true
    }

    /// Releases the live feed. Returns whether a feed was released.
    pub fn unsubscribe(&self) -> bool {
        let released = self.feed_slot().take();
        match released {
            Some(task) => {
                drop(task);
                tracing::debug!(event = NEW_WAVE_EVENT, "Live feed released");
                self.events.emit(PortalEvent::FeedReleased {
                    timestamp: Utc::now(),
                });
                true
            }
            None => false,
        }
    }

    fn feed_slot(&self) -> MutexGuard<'_, Option<FeedTask>> {
        self.feed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn convert(raw: RawWave) -> Option<WaveEntry> {
    match WaveEntry::from_raw(raw) {
        Ok(entry) => Some(entry),
        Err(err) => {
            tracing::warn!(error = %err, "Skipping wave with invalid timestamp");
            None
        }
    }
}

fn ingest_live(view: &watch::Sender<EntryView>, raw: RawWave, dedupe: bool, events: &EventBus) {
    tracing::debug!(
        sender = %raw.sender,
        timestamp = raw.unix_seconds,
        message_len = raw.message.len(),
        "NewWave"
    );
    let Some(entry) = convert(raw) else {
        return;
    };
    let address = entry.address.clone();

    let mut appended = false;
    view.send_if_modified(|v| {
        appended = v.append(entry, dedupe);
        appended
    });

    let timestamp = Utc::now();
    if appended {
        events.emit(PortalEvent::EntryAppended { address, timestamp });
    } else {
        tracing::debug!(sender = %address, "Dropping live wave already in view");
        events.emit(PortalEvent::DuplicateDropped { address, timestamp });
    }
}
