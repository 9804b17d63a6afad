//! Configuration commands.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the effective configuration to stdout.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.validate()?;
    if config.google.client_id.is_none() {
        println!("No [google] client_id set; `contestcal add` will need one.");
    }
    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration and state paths.
pub fn path(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    let server = config.server_config();
    println!("config: {}", path.display());
    println!("contests: {}", server.contests_path().display());
    println!("session: {}", server.session_path().display());
    Ok(())
}
