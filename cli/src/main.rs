use clap::Parser;
use waveportal_cli::{app, logging};
use waveportal_cli::commands::{cli, demo, watch, wave, waves};
use waveportal_core::api::{AppConfig, CliError, LedgerError};
use waveportal_core::config;

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let mut cfg = match args.config.as_deref() {
        Some(path) => config::load_from_path(path),
        None => config::load_default(),
    }
    .map_err(|e| CliError::Config(e.to_string()))?;
    if let Some(address) = args.address.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
        cfg.wallet.addresses.retain(|a| a != address);
        cfg.wallet.addresses.insert(0, address.to_string());
    }
    let _log = logging::init(&cfg.logging)?;

    dispatch(args.command, &cfg).await
}

fn exit_code_for_error(e: &CliError) -> i32 {
    // 0: success
    // 1: wave submitted but not mined (returned as a normal exit code)
    // 11: config error
    // 20: ledger / wallet / IO error
    // 50: internal/uncategorized
    match e {
        CliError::Config(_) => 11,
        CliError::Ledger(le) => match le {
            LedgerError::Decode(_) => 50,
            _ => 20,
        },
        CliError::Wallet(_) => 20,
        CliError::Io(_) => 20,
        CliError::Command(_) => 20,
        CliError::Anyhow(_) => 50,
    }
}

async fn dispatch(cmd: cli::Commands, cfg: &AppConfig) -> Result<i32, CliError> {
    let explorer = cfg.explorer_base_url.as_str();
    match cmd {
        cli::Commands::Waves(args) => {
            let portal = app::build_portal(cfg)?;
            waves::run(&portal, &args, explorer).await
        }
        cli::Commands::Wave(args) => {
            let portal = app::build_portal(cfg)?;
            wave::run(&portal, &args, explorer).await
        }
        cli::Commands::Watch => {
            let portal = app::build_portal(cfg)?;
            watch::run(&portal, explorer).await
        }
        cli::Commands::Demo(args) => demo::run(cfg, &args).await,
    }
}
