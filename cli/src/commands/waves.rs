use waveportal_core::api::{CliError, WavePortal};

use super::cli::WavesArgs;
use crate::render;

pub async fn run(portal: &WavePortal, args: &WavesArgs, explorer: &str) -> Result<i32, CliError> {
    let Some(count) = portal.sync().load_history().await else {
        return Err(CliError::Command("failed to load wave history".into()));
    };

    let entries = portal.entries();
    if args.json {
        for entry in &entries {
            let line = serde_json::to_string(entry).map_err(anyhow::Error::from)?;
            println!("{line}");
        }
    } else if entries.is_empty() {
        println!("No waves yet.");
    } else {
        println!("{}", render::entries(&entries, explorer));
        println!("\nTotal waves: {count}");
    }
    Ok(0)
}
