use waveportal_core::api::{CliError, WavePortal};

use crate::render;

/// Prints the history, then every new wave until Ctrl-C or the feed closes.
pub async fn run(portal: &WavePortal, explorer: &str) -> Result<i32, CliError> {
    let address = match portal.restore().await {
        Some(address) => Some(address),
        None => portal.connect().await,
    };
    if address.is_none() {
        // The live feed needs an authorized session; history alone still works.
        portal.sync().load_history().await;
    }

    let mut view_rx = portal.sync().watch();
    let mut printed = 0usize;
    let result = loop {
        let fresh = {
            let view = view_rx.borrow_and_update();
            if view.len() < printed {
                printed = 0;
            }
            let fresh = view.entries()[printed..].to_vec();
            printed = view.len();
            fresh
        };
        for entry in &fresh {
            println!("{}\n", render::entry(entry, explorer));
        }

        if !portal.sync().is_subscribed() {
            eprintln!("Live feed unavailable; showing history only.");
            break Ok(0);
        }

        tokio::select! {
            changed = view_rx.changed() => {
                if changed.is_err() {
                    break Ok(0);
                }
            }
            signal = tokio::signal::ctrl_c() => {
                break signal.map(|_| 0).map_err(CliError::from);
            }
        }
    };

    portal.teardown();
    result
}
