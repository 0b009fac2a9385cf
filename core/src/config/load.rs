use std::path::{Path, PathBuf};

use super::types::{AppConfig, LedgerProvider};

/// Get the default data directory: ~/.waveportal
pub fn get_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".waveportal"))
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)?;
    Ok(toml::from_str::<AppConfig>(&s)?)
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.waveportal/config.toml (highest)
    let data_dir = get_data_dir()?;
    let user_config = data_dir.join("config.toml");

    // Priority 2: ./config.toml (current directory)
    let local_config = Path::new("config.toml");

    let mut cfg = if user_config.exists() {
        load_from_path(&user_config)?
    } else if local_config.exists() {
        load_from_path(local_config)?
    } else {
        AppConfig::default()
    };

    if cfg.logging.file
        && cfg
            .logging
            .directory
            .as_deref()
            .map(|s| s.trim().is_empty())
            .unwrap_or(true)
    {
        cfg.logging.directory = Some(data_dir.join("logs").to_string_lossy().to_string());
    }

    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

// Environment variable overrides (Priority 0: highest)
fn apply_env_overrides(cfg: &mut AppConfig) {
    if let LedgerProvider::Gateway(ref mut gw) = cfg.ledger.provider {
        if let Some(v) = non_empty_env("WAVEPORTAL_GATEWAY_URL") {
            gw.base_url = v;
        }
        if let Some(v) = non_empty_env("WAVEPORTAL_API_KEY") {
            gw.api_key = v;
        }
    }

    if let Some(v) = non_empty_env("WAVEPORTAL_ADDRESS") {
        cfg.wallet.addresses.retain(|a| a != &v);
        cfg.wallet.addresses.insert(0, v);
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::MemoryLedgerConfig;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn empty_file_yields_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file).unwrap();

        let cfg = load_from_path(file.path()).unwrap();
        assert_eq!(cfg.submission.resource_ceiling, 300_000);
        assert_eq!(cfg.submission.finalization_timeout_secs, 300);
        assert!(cfg.sync.dedupe);
        assert!(matches!(cfg.ledger.provider, LedgerProvider::Gateway(_)));
    }

    #[test]
    fn memory_provider_is_parsed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
explorer_base_url = "https://sepolia.etherscan.io"

[ledger]
provider = "memory"
block_time_ms = 50
cooldown_secs = 900

[wallet]
addresses = ["0xA", "0xB"]
pre_authorized = true

[sync]
dedupe = false
"#
        )
        .unwrap();

        let cfg = load_from_path(file.path()).unwrap();
        match cfg.ledger.provider {
            LedgerProvider::Memory(MemoryLedgerConfig {
                block_time_ms,
                cooldown_secs,
            }) => {
                assert_eq!(block_time_ms, 50);
                assert_eq!(cooldown_secs, 900);
            }
            other => panic!("expected memory provider, got {other:?}"),
        }
        assert_eq!(cfg.wallet.addresses, vec!["0xA", "0xB"]);
        assert!(cfg.wallet.pre_authorized);
        assert!(!cfg.sync.dedupe);
        assert_eq!(cfg.explorer_base_url, "https://sepolia.etherscan.io");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[ledger\nprovider = ").unwrap();
        assert!(load_from_path(file.path()).is_err());
    }
}
