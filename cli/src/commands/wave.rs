use waveportal_core::api::{CliError, SubmissionPhase, WavePortal};

use super::cli::WaveArgs;
use crate::render;

/// Authorizes, submits one wave and waits for the outcome.
///
/// Exit code 0 when mined, 1 when the write failed.
pub async fn run(portal: &WavePortal, args: &WaveArgs, explorer: &str) -> Result<i32, CliError> {
    let address = match portal.restore().await {
        Some(address) => Some(address),
        None => portal.connect().await,
    };
    let Some(address) = address else {
        return Err(CliError::Command(
            "no authorized account; set [wallet] addresses or --address".into(),
        ));
    };
    tracing::info!("Connected {}", address);

    let outcome = portal.wave(&args.message).await;
    portal.teardown();
    let state = outcome.map_err(|e| CliError::Command(e.to_string()))?;

    match state.phase {
        SubmissionPhase::Confirmed => {
            let reference = state.reference.unwrap_or_default();
            println!("Mined -- {}", render::tx_link(explorer, &reference));
            Ok(0)
        }
        _ => {
            eprintln!(
                "{}",
                state
                    .reason
                    .as_deref()
                    .unwrap_or(waveportal_core::api::GENERIC_FAILURE_REASON)
            );
            Ok(1)
        }
    }
}
