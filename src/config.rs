use serde::{Deserialize, Deserializer};
use std::path::Path;

use crate::{address::SuiAddress, constants::CONFIG_FILE_PATH};

fn default_gas_budget() -> u64 {
    10_000_000
}

fn default_poll_interval() -> u64 {
    500
}

fn default_transfer_delay() -> u64 {
    500
}

/// Accepts both `true` and `"true"`.
fn bool_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(value) => Ok(value),
        BoolOrString::String(s) => s
            .trim()
            .to_ascii_lowercase()
            .parse()
            .map_err(serde::de::Error::custom),
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    pub rpc_urls: Vec<String>,
    /// In MIST.
    #[serde(default = "default_gas_budget")]
    pub gas_budget: u64,
    /// Milliseconds between polling passes.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
    /// Milliseconds between a claim and the forward transfer.
    #[serde(default = "default_transfer_delay")]
    pub transfer_delay: u64,
    #[serde(default, deserialize_with = "bool_or_string")]
    pub auto_transfer_max_ocean: bool,
    #[serde(default)]
    pub destination_address: String,
}

impl Config {
    pub fn from_toml_str(s: &str) -> eyre::Result<Self> {
        let config: Self = toml::from_str(s)?;

        if config.rpc_urls.is_empty() {
            eyre::bail!("RPC_URLS must contain at least one endpoint");
        }

        Ok(config)
    }

    async fn read_from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let cfg_str = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&cfg_str)
    }

    pub async fn read_default() -> eyre::Result<Self> {
        Self::read_from_file(CONFIG_FILE_PATH)
            .await
            .map_err(|e| eyre::eyre!("Failed to read {CONFIG_FILE_PATH}: {e}"))
    }

    /// Where claimed OCEAN is forwarded to, if forwarding is enabled.
    pub fn transfer_destination(&self) -> eyre::Result<Option<SuiAddress>> {
        let destination = self.destination_address.trim();

        if !self.auto_transfer_max_ocean || destination.is_empty() {
            return Ok(None);
        }

        destination.parse().map(Some)
    }
}
