use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub ledger: LedgerConfig,

    #[serde(default)]
    pub wallet: WalletConfig,

    #[serde(default)]
    pub submission: SubmissionConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    /// Block explorer used for address and transaction links.
    #[serde(default = "default_explorer_base_url")]
    pub explorer_base_url: String,
}

fn default_explorer_base_url() -> String {
    "https://rinkeby.etherscan.io".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            ledger: LedgerConfig::default(),
            wallet: WalletConfig::default(),
            submission: SubmissionConfig::default(),
            sync: SyncConfig::default(),
            explorer_base_url: default_explorer_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "waveportal_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    false
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(flatten)]
    pub provider: LedgerProvider,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            provider: LedgerProvider::Gateway(GatewayLedgerConfig::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider")]
pub enum LedgerProvider {
    #[serde(rename = "gateway")]
    Gateway(GatewayLedgerConfig),
    #[serde(rename = "memory")]
    Memory(MemoryLedgerConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayLedgerConfig {
    #[serde(default = "default_gateway_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// How often receipts and the live feed are polled.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_gateway_url() -> String {
    "http://127.0.0.1:8787".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

impl Default for GatewayLedgerConfig {
    fn default() -> Self {
        Self {
            base_url: default_gateway_url(),
            api_key: String::new(),
            timeout_ms: default_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryLedgerConfig {
    /// Delay between dispatch and finalization.
    #[serde(default = "default_block_time_ms")]
    pub block_time_ms: u64,
    /// Minimum seconds between two waves from the same sender. 0 disables it.
    #[serde(default)]
    pub cooldown_secs: u64,
}

fn default_block_time_ms() -> u64 {
    500
}

impl Default for MemoryLedgerConfig {
    fn default() -> Self {
        Self {
            block_time_ms: default_block_time_ms(),
            cooldown_secs: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WalletConfig {
    /// Identities the local wallet holds. The first one signs writes.
    #[serde(default)]
    pub addresses: Vec<String>,
    /// Whether the identities are authorized without an explicit connect.
    #[serde(default)]
    pub pre_authorized: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Resource-consumption ceiling sent with every write.
    #[serde(default = "default_resource_ceiling")]
    pub resource_ceiling: u64,
    #[serde(default = "default_finalization_timeout_secs")]
    pub finalization_timeout_secs: u64,
}

fn default_resource_ceiling() -> u64 {
    300_000
}

fn default_finalization_timeout_secs() -> u64 {
    300
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            resource_ceiling: default_resource_ceiling(),
            finalization_timeout_secs: default_finalization_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Drop live entries whose key is already present in the view.
    ///
    /// The key is (sender, unix seconds, message). Two distinct waves with the
    /// same text from the same sender within one second share a key, so the
    /// live view shows them once until the next history load. Ledgers without
    /// a per-sender cooldown (the gateway) can produce such pairs; set this to
    /// `false` to keep every live notification.
    #[serde(default = "default_dedupe")]
    pub dedupe: bool,
}

fn default_dedupe() -> bool {
    true
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            dedupe: default_dedupe(),
        }
    }
}
