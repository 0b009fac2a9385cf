use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::watch;

use super::transitions::SubmissionTransition;
use super::types::{SubmissionPhase, SubmissionState};
use crate::config::SubmissionConfig;
use crate::error::LedgerError;
use crate::ledger::{PendingWrite, WaveLedger};
use crate::state::{EventBus, PortalEvent};

/// Why `submit` refused to start. Rejections never touch the state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitRejected {
    #[error("a submission is already in phase {0}")]
    NotIdle(SubmissionPhase),
    #[error("no authorized address")]
    Unauthorized,
    #[error("no ledger available")]
    LedgerUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionSettings {
    /// Resource-consumption ceiling attached to every write.
    pub resource_ceiling: u64,
    pub finalization_timeout: Duration,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self::from(&SubmissionConfig::default())
    }
}

impl From<&SubmissionConfig> for SubmissionSettings {
    fn from(cfg: &SubmissionConfig) -> Self {
        Self {
            resource_ceiling: cfg.resource_ceiling,
            finalization_timeout: Duration::from_secs(cfg.finalization_timeout_secs.max(1)),
        }
    }
}

/// Reason recorded when a pending `submit` future is dropped.
pub const ABANDONED_REASON: &str =
    "Submission abandoned before it settled; the wave may still be mined.";

/// Held by `submit` from the slot claim until a terminal phase is written.
/// Dropping it earlier (the caller dropped the future) fails the slot so the
/// lifecycle can be reset.
struct SlotClaim<'a> {
    lifecycle: &'a SubmissionLifecycle,
    settled: bool,
}

impl Drop for SlotClaim<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        tracing::warn!(
            phase = %self.lifecycle.phase(),
            "Submission dropped while pending"
        );
        self.lifecycle.settle_failed(ABANDONED_REASON.to_string());
    }
}

/// Drives one write from user intent to confirmation or failure.
///
/// At most one write is in flight: `submit` claims the slot atomically and
/// every other caller is turned away until the slot is reset to `Idle`.
pub struct SubmissionLifecycle {
    ledger: Option<Arc<dyn WaveLedger>>,
    state: watch::Sender<SubmissionState>,
    settings: SubmissionSettings,
    events: EventBus,
}

impl SubmissionLifecycle {
    pub fn new(
        ledger: Option<Arc<dyn WaveLedger>>,
        settings: SubmissionSettings,
        events: EventBus,
    ) -> Self {
        let (state, _) = watch::channel(SubmissionState::default());
        Self {
            ledger,
            state,
            settings,
            events,
        }
    }

    pub fn settings(&self) -> SubmissionSettings {
        self.settings
    }

    pub fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.state.borrow().phase
    }

    pub fn watch(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    /// Submits `message` as a write signed by `authorized_address`.
    ///
    /// Empty messages are not refused here. Returns the settled state; write
    /// failures are reported through `SubmissionState::reason`, not as `Err`.
    #[tracing::instrument(
        name = "submission.submit",
        skip(self, message),
        fields(message_len = message.len())
    )]
    pub async fn submit(
        &self,
        message: &str,
        authorized_address: Option<&str>,
    ) -> Result<SubmissionState, SubmitRejected> {
        let Some(address) = authorized_address.map(str::trim).filter(|a| !a.is_empty()) else {
            tracing::warn!("Refusing to submit without an authorized address");
            return Err(SubmitRejected::Unauthorized);
        };
        let Some(ledger) = self.ledger.clone() else {
            tracing::warn!("No ledger available, wave not submitted");
            return Err(SubmitRejected::LedgerUnavailable);
        };

        let mut current = SubmissionPhase::Idle;
        let claimed = self.state.send_if_modified(|s| {
            current = s.phase;
            if s.phase != SubmissionPhase::Idle {
                return false;
            }
            *s = SubmissionState {
                phase: SubmissionPhase::Dispatching,
                draft: message.to_string(),
                ..SubmissionState::default()
            };
            true
        });
        if !claimed {
            tracing::warn!(phase = %current, "Submission already in progress, ignoring");
            return Err(SubmitRejected::NotIdle(current));
        }
        self.emit_phase_change(SubmissionPhase::Idle, SubmissionPhase::Dispatching);
        let mut claim = SlotClaim {
            lifecycle: self,
            settled: false,
        };

        tracing::debug!(
            from = %address,
            ledger = ledger.name(),
            resource_ceiling = self.settings.resource_ceiling,
            "Dispatching wave"
        );
        let PendingWrite {
            reference: pending_reference,
            finalization,
        } = match ledger
            .write_entry(message, self.settings.resource_ceiling)
            .await
        {
            Ok(pending) => pending,
            Err(err) => {
                self.fail(&err);
                claim.settled = true;
                return Ok(self.state());
            }
        };

        tracing::info!(tx = %pending_reference, "Mining...");
        self.transition(SubmissionPhase::Broadcast, |s| {
            s.pending_reference = Some(pending_reference.clone());
        });

        let timeout = self.settings.finalization_timeout;
        let finalized = match tokio::time::timeout(timeout, finalization).await {
            Ok(result) => result,
            Err(_) => Err(LedgerError::Timeout(timeout)),
        };

        match finalized {
            Ok(done) => {
                tracing::info!(tx = %done.reference, "Mined");
                self.transition(SubmissionPhase::Confirmed, |s| {
                    s.reference = Some(done.reference.clone());
                    s.draft.clear();
                });
                self.events.emit(PortalEvent::SubmissionConfirmed {
                    reference: done.reference,
                    timestamp: Utc::now(),
                });
                claim.settled = true;

                // Informational only; the outcome is already settled.
                match ledger.read_entry_count().await {
                    Ok(count) => tracing::info!(count, "Retrieved total wave count"),
                    Err(err) => tracing::warn!(error = %err, "Failed to read total wave count"),
                }
            }
            Err(err) => {
                self.fail(&err);
                claim.settled = true;
            }
        }

        Ok(self.state())
    }

    /// Returns a settled submission to `Idle`, clearing reference and reason.
    ///
    /// Returns `false` while a write is in flight.
    pub fn reset(&self) -> bool {
        let mut from = SubmissionPhase::Idle;
        let changed = self.state.send_if_modified(|s| {
            from = s.phase;
            if !s.phase.is_terminal() {
                return false;
            }
            s.phase = SubmissionPhase::Idle;
            s.pending_reference = None;
            s.reference = None;
            s.reason = None;
            true
        });

        if changed {
            self.emit_phase_change(from, SubmissionPhase::Idle);
        }
        changed || from == SubmissionPhase::Idle
    }

    /// Replaces the draft message. Editing a settled submission resets it
    /// first; edits are refused while a write is in flight.
    pub fn edit_draft(&self, text: &str) -> bool {
        if self.phase().is_pending() {
            return false;
        }
        if !self.reset() {
            return false;
        }
        self.state.send_if_modified(|s| {
            if s.phase != SubmissionPhase::Idle {
                return false;
            }
            s.draft = text.to_string();
            true
        })
    }

    fn fail(&self, err: &LedgerError) {
        let reason = err.reason_or_generic();
        tracing::error!(error = %err, reason = %reason, "Wave submission failed");
        self.settle_failed(reason);
    }

    fn settle_failed(&self, reason: String) {
        self.transition(SubmissionPhase::Failed, |s| {
            s.reason = Some(reason.clone());
        });
        self.events.emit(PortalEvent::SubmissionFailed {
            reason,
            timestamp: Utc::now(),
        });
    }

    fn transition<F>(&self, to: SubmissionPhase, apply: F) -> bool
    where
        F: FnOnce(&mut SubmissionState),
    {
        let mut from = to;
        let changed = self.state.send_if_modified(|s| {
            from = s.phase;
            if let Err(err) = SubmissionTransition::validate(s.phase, to) {
                tracing::error!(error = %err, "Rejected submission transition");
                return false;
            }
            s.phase = to;
            apply(s);
            true
        });

        if changed {
            self.emit_phase_change(from, to);
        }
        changed
    }

    fn emit_phase_change(&self, old_phase: SubmissionPhase, new_phase: SubmissionPhase) {
        tracing::debug!(from = %old_phase, to = %new_phase, "Submission phase changed");
        self.events.emit(PortalEvent::SubmissionPhaseChanged {
            old_phase,
            new_phase,
            timestamp: Utc::now(),
        });
    }
}
