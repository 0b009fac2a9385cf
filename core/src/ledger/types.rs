use futures::future::BoxFuture;
use futures::stream::{BoxStream, Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Event name the wave contract emits for every finalized entry.
pub const NEW_WAVE_EVENT: &str = "NewWave";

/// A wave record exactly as the ledger returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawWave {
    #[serde(rename = "waver")]
    pub sender: String,
    /// Seconds since the unix epoch, as recorded by the ledger.
    #[serde(rename = "timestamp")]
    pub unix_seconds: i64,
    pub message: String,
}

impl RawWave {
    pub fn new(sender: impl Into<String>, unix_seconds: i64, message: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            unix_seconds,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedWrite {
    pub reference: String,
}

/// A write accepted into the pending pool.
///
/// `reference` is known as soon as the ledger accepts the write; awaiting
/// `finalization` resolves once the write is final or has failed.
pub struct PendingWrite {
    pub reference: String,
    pub finalization: BoxFuture<'static, Result<FinalizedWrite, LedgerError>>,
}

impl PendingWrite {
    pub fn new(
        reference: impl Into<String>,
        finalization: BoxFuture<'static, Result<FinalizedWrite, LedgerError>>,
    ) -> Self {
        Self {
            reference: reference.into(),
            finalization,
        }
    }
}

impl std::fmt::Debug for PendingWrite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingWrite")
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}

type ReleaseHook = Box<dyn FnOnce() + Send + 'static>;

/// Runs a subscription's release hook exactly once, on [`ReleaseGuard::release`]
/// or on drop.
pub struct ReleaseGuard(Option<ReleaseHook>);

impl ReleaseGuard {
    pub fn release(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(hook) = self.0.take() {
            hook();
        }
    }
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.run();
    }
}

/// Push subscription to new-entry notifications.
///
/// The listener registration is released exactly once: on
/// [`LiveFeed::unsubscribe`] or when the feed (or its guard) is dropped.
pub struct LiveFeed {
    entries: BoxStream<'static, RawWave>,
    guard: ReleaseGuard,
}

impl std::fmt::Debug for LiveFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveFeed").finish_non_exhaustive()
    }
}

impl LiveFeed {
    pub fn new<S>(entries: S) -> Self
    where
        S: Stream<Item = RawWave> + Send + 'static,
    {
        Self {
            entries: entries.boxed(),
            guard: ReleaseGuard(None),
        }
    }

    pub fn with_release<F>(mut self, release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.guard = ReleaseGuard(Some(Box::new(release)));
        self
    }

    /// Next notification, or `None` once the ledger closed the feed.
    pub async fn next(&mut self) -> Option<RawWave> {
        self.entries.next().await
    }

    pub fn unsubscribe(self) {
        self.guard.release();
    }

    /// Splits the feed so the stream can be consumed elsewhere while the
    /// caller keeps ownership of the release.
    pub fn into_parts(self) -> (BoxStream<'static, RawWave>, ReleaseGuard) {
        (self.entries, self.guard)
    }
}
