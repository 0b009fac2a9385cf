use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "waveportal", version, about = "Wave at the portal and watch others wave back")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to load instead of the default search path.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Identity to act as; takes precedence over `[wallet] addresses`.
    #[arg(long, global = true)]
    pub address: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print every wave recorded so far.
    Waves(WavesArgs),
    /// Submit a wave and wait until it is mined.
    Wave(WaveArgs),
    /// Print history, then follow new waves until Ctrl-C.
    Watch,
    /// Run two signers against an in-process chain.
    Demo(DemoArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct WavesArgs {
    /// Emit entries as JSON lines.
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct WaveArgs {
    pub message: String,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct DemoArgs {
    #[arg(long, default_value_t = 200)]
    pub block_time_ms: u64,

    /// Per-sender cooldown in seconds; a third wave exercises it when set.
    #[arg(long, default_value_t = 0)]
    pub cooldown_secs: u64,
}
