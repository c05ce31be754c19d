use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use dotenv::dotenv;
use tracing::warn;

use crate::outcome::PrintOptions;
use crate::{Error, Result};

/// Named Flow environments a transaction can be sent to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Network {
    Emulator,
    Testnet,
    Mainnet,
    Previewnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Emulator => "emulator",
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
            Network::Previewnet => "previewnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "emulator" | "local" => Ok(Network::Emulator),
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            "previewnet" => Ok(Network::Previewnet),
            _ => Err(Error::UnknownNetwork(s.trim().to_string())),
        }
    }
}

// ─────────────────── Configuration ───────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// `None` leaves the choice to the library default (the emulator).
    pub network: Option<Network>,
    pub print_options: Option<PrintOptions>,
    /// Directory holding `flow.json` and `transactions/`.
    pub base_path: PathBuf,
    pub flow_bin: PathBuf,
    pub compute_limit: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: None,
            print_options: None,
            base_path: PathBuf::from("."),
            flow_bin: PathBuf::from("flow"),
            compute_limit: None,
        }
    }
}

impl Config {
    /// The testnet script: network pinned to testnet, default printing.
    pub fn testnet() -> Self {
        Self::default()
            .with_network(Network::Testnet)
            .with_global_print_options()
    }

    /// The second script, whose network line is left out on purpose.
    pub fn unset_network() -> Self {
        Self::default().with_global_print_options()
    }

    pub fn with_network(mut self, network: Network) -> Self {
        self.network = Some(network);
        self
    }

    pub fn with_global_print_options(mut self) -> Self {
        self.print_options = Some(PrintOptions::default());
        self
    }

    pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_flow_bin(mut self, flow_bin: impl Into<PathBuf>) -> Self {
        self.flow_bin = flow_bin.into();
        self
    }

    pub fn with_compute_limit(mut self, limit: u64) -> Self {
        self.compute_limit = Some(limit);
        self
    }

    pub fn network_name(&self) -> &'static str {
        self.network.unwrap_or(Network::Emulator).as_str()
    }

    /// Log which network an unset selection falls back to. Call once every
    /// override has been applied.
    pub fn warn_if_network_unset(&self) -> bool {
        if self.network.is_some() {
            return false;
        }
        warn!("no network selected, using the {} network", self.network_name());
        true
    }

    pub fn flow_json(&self) -> PathBuf {
        self.base_path.join("flow.json")
    }

    pub fn transaction_file(&self, name: &str) -> PathBuf {
        self.base_path
            .join("transactions")
            .join(format!("{name}.cdc"))
    }
}

/// Load `.env` (if any) and build the configuration from the environment.
pub fn load_config() -> Result<Config> {
    dotenv().ok();
    config_from(|var| std::env::var(var).ok())
}

pub(crate) fn config_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Config> {
    let read = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

    let mut cfg = Config::default();

    if let Some(name) = read("FLOW_NETWORK") {
        cfg.network = Some(name.parse()?);
    }
    if let Some(path) = read("FLOW_BASE_PATH") {
        cfg.base_path = PathBuf::from(path);
    }
    if let Some(bin) = read("FLOW_BIN") {
        cfg.flow_bin = PathBuf::from(bin);
    }
    if let Some(limit) = read("FLOW_COMPUTE_LIMIT") {
        let limit = limit.trim().parse().map_err(|_| Error::InvalidSetting {
            var: "FLOW_COMPUTE_LIMIT",
            value: limit.clone(),
        })?;
        cfg.compute_limit = Some(limit);
    }

    let print = match read("FLOW_PRINT_OPTIONS") {
        None => true,
        Some(v) => v.trim().parse::<bool>().map_err(|_| Error::InvalidSetting {
            var: "FLOW_PRINT_OPTIONS",
            value: v.clone(),
        })?,
    };
    if print {
        cfg = cfg.with_global_print_options();
    }

    Ok(cfg)
}
