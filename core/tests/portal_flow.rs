mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{wait_for_entries, wallet, SharedLog};
use pretty_assertions::assert_eq;
use waveportal_core::api::{AppConfig, SubmissionPhase, WaveLedger, WavePortal};

fn portal_for(log: &Arc<SharedLog>, address: &str) -> WavePortal {
    let ledger: Arc<dyn WaveLedger> = log.signer(address);
    WavePortal::new(&AppConfig::default(), wallet(address), Some(ledger))
}

#[tokio::test]
async fn two_portals_see_each_others_waves_once() {
    let log = SharedLog::new();
    let alice = portal_for(&log, "0xA");
    let bob = portal_for(&log, "0xB");

    alice.restore().await;
    bob.restore().await;

    let state = alice.wave("hi").await.unwrap();
    assert_eq!(state.phase, SubmissionPhase::Confirmed);
    wait_for_entries(&bob, 1).await;
    wait_for_entries(&alice, 1).await;

    let state = bob.wave("yo").await.unwrap();
    assert_eq!(state.phase, SubmissionPhase::Confirmed);
    wait_for_entries(&alice, 2).await;
    wait_for_entries(&bob, 2).await;

    let messages: Vec<_> = alice.entries().into_iter().map(|e| e.message).collect();
    assert_eq!(messages, vec!["hi", "yo"]);
    let senders: Vec<_> = bob.entries().into_iter().map(|e| e.address).collect();
    assert_eq!(senders, vec!["0xA", "0xB"]);
}

#[tokio::test]
async fn reload_after_live_entries_does_not_duplicate() {
    let log = SharedLog::new();
    let alice = portal_for(&log, "0xA");
    alice.restore().await;

    alice.wave("first").await.unwrap();
    alice.reset();
    alice.wave("second").await.unwrap();
    wait_for_entries(&alice, 2).await;

    assert_eq!(alice.sync().load_history().await, Some(2));
    assert_eq!(alice.entries().len(), 2);
}

#[tokio::test]
async fn teardown_releases_every_listener() {
    let log = SharedLog::new();
    let alice = portal_for(&log, "0xA");
    let bob = portal_for(&log, "0xB");
    alice.restore().await;
    bob.connect().await;
    assert_eq!(log.listeners.load(Ordering::SeqCst), 2);

    alice.teardown();
    assert_eq!(log.listeners.load(Ordering::SeqCst), 1);
    drop(bob);
    assert_eq!(log.listeners.load(Ordering::SeqCst), 0);
}
