use std::sync::Arc;
use std::time::Duration;

use waveportal_core::api::{
    AppConfig, CliError, MemoryLedgerConfig, SubmissionPhase, SubmissionState, WaveLedger,
    WavePortal,
};
use waveportal_plugins::ledger::MemoryChain;
use waveportal_plugins::wallet::LocalWallet;

use super::cli::DemoArgs;
use crate::app::spawn_event_logger;
use crate::render;

const OWNER: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
const RANDOM_PERSON: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

fn signer_portal(cfg: &AppConfig, chain: &Arc<MemoryChain>, address: &str) -> WavePortal {
    let ledger: Arc<dyn WaveLedger> = Arc::new(chain.connect(address));
    let wallet = Arc::new(LocalWallet::new(vec![address.to_string()], true));
    let portal = WavePortal::new(cfg, Some(wallet), Some(ledger));
    spawn_event_logger(&portal);
    portal
}

fn report(who: &str, state: &SubmissionState, explorer: &str) {
    match (state.phase, state.reference.as_deref()) {
        (SubmissionPhase::Confirmed, Some(reference)) => {
            println!("{who} waved: {}", render::tx_link(explorer, reference))
        }
        _ => println!(
            "{who} wave failed: {}",
            state.reason.as_deref().unwrap_or_default()
        ),
    }
}

/// Two signers wave on a fresh in-process chain, then the log is listed.
pub async fn run(cfg: &AppConfig, args: &DemoArgs) -> Result<i32, CliError> {
    let chain = MemoryChain::new(&MemoryLedgerConfig {
        block_time_ms: args.block_time_ms,
        cooldown_secs: args.cooldown_secs,
    });
    let explorer = cfg.explorer_base_url.as_str();
    let owner = signer_portal(cfg, &chain, OWNER);
    let random = signer_portal(cfg, &chain, RANDOM_PERSON);

    owner.restore().await;
    random.restore().await;
    println!("Chain started, owner {OWNER}");

    let outcome = async {
        let state = owner
            .wave("Initial commit")
            .await
            .map_err(|e| CliError::Command(e.to_string()))?;
        report("owner", &state, explorer);

        let state = random
            .wave("Wow this is pretty darn cool!")
            .await
            .map_err(|e| CliError::Command(e.to_string()))?;
        report("random person", &state, explorer);

        if args.cooldown_secs > 0 {
            random.reset();
            let state = random
                .wave("This should be handled by the cooldown")
                .await
                .map_err(|e| CliError::Command(e.to_string()))?;
            report("random person", &state, explorer);
        }

        let total = chain.total_waves() as usize;
        let mut view_rx = owner.sync().watch();
        let _ = tokio::time::timeout(
            Duration::from_secs(2),
            view_rx.wait_for(|view| view.len() >= total),
        )
        .await;

        println!("\n{}", render::entries(&owner.entries(), explorer));
        println!("\nTotal waves: ({})", total);
        Ok::<_, CliError>(0)
    }
    .await;

    owner.teardown();
    random.teardown();
    outcome
}
