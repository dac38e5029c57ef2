//! Config file inspection.

use std::path::Path;

use crate::config::{self, Config, ConfigError, ProviderConfig};
use crate::error::Result;

/// Show where the config lives and which provider settings are present
pub fn cmd_config(init: bool) -> anyhow::Result<()> {
    let path = config::config_path().ok_or(ConfigError::NoConfigDir)?;

    if init {
        if init_at(&path)? {
            println!("✓ Wrote default config to {:?}", path);
        } else {
            println!("Config already exists at {:?}, leaving it unchanged", path);
        }
        println!();
    }

    let config = config::load_from(&path);
    println!("Config file: {:?}{}", path, if path.exists() { "" } else { " (not found)" });
    println!();
    print_provider(&config.provider);
    println!();
    println!("[capture]");
    println!("  max_duration_secs: {}", config.capture.max_duration_secs);
    println!(
        "  device:            {}",
        config.capture.device().unwrap_or("(system default)")
    );
    println!();
    println!("[recognition]");
    println!("  request_timeout_secs: {}", config.recognition.request_timeout_secs);

    if let Err(e) = config.provider.credentials() {
        println!();
        println!("⚠ {} (ACR_HOST, ACR_ACCESS_KEY and ACR_ACCESS_SECRET also work)", e);
    }
    Ok(())
}

/// Write a default config to `path` unless one exists. Returns whether it wrote.
fn init_at(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    config::save_to(&Config::default(), path)?;
    Ok(true)
}

fn print_provider(provider: &ProviderConfig) {
    println!("[provider]");
    println!("  host:          {}", provider.host.as_deref().unwrap_or("(not set)"));
    println!("  access_key:    {}", mask_key(provider.access_key.as_deref()));
    println!("  access_secret: {}", mask_secret(provider.access_secret.as_deref()));
}

/// Show only the first four characters of a key.
fn mask_key(key: Option<&str>) -> String {
    match key.map(str::trim).filter(|k| !k.is_empty()) {
        Some(k) if k.chars().count() > 4 => format!("{}…", k.chars().take(4).collect::<String>()),
        Some(_) => "****".to_string(),
        None => "(not set)".to_string(),
    }
}

fn mask_secret(secret: Option<&str>) -> &'static str {
    match secret.map(str::trim) {
        Some(s) if !s.is_empty() => "********",
        _ => "(not set)",
    }
}
