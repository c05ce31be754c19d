// tasks/runner/src/main.rs

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use pinpin_common::{load_config, run_flow, Config, FlowCli, Network, TxRequest};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Preset {
    StartLoop,
    Subscribe,
}

impl Preset {
    fn request(self) -> TxRequest {
        match self {
            Preset::StartLoop => TxRequest::start_loop(),
            Preset::Subscribe => TxRequest::subscribe(),
        }
    }
}

/// Send one PinPin transaction to a Flow network.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Transaction preset to send
    #[arg(long, value_enum, default_value_t = Preset::StartLoop)]
    tx: Preset,

    /// Send a transaction by file name under transactions/ instead of a preset
    #[arg(long)]
    name: Option<String>,

    /// Signer account, without the network prefix
    #[arg(long)]
    signer: Option<String>,

    /// Transaction argument as name=value; replaces the preset's value
    #[arg(long = "arg", value_parser = parse_arg)]
    args: Vec<(String, String)>,

    /// Network to use instead of FLOW_NETWORK
    #[arg(long)]
    network: Option<Network>,

    /// Directory holding flow.json and transactions/
    #[arg(long)]
    base_path: Option<PathBuf>,
}

impl Args {
    /// Apply command-line overrides on top of the environment.
    fn configure(&self, mut cfg: Config) -> Config {
        if let Some(network) = self.network {
            cfg = cfg.with_network(network);
        }
        if let Some(path) = &self.base_path {
            cfg = cfg.with_base_path(path);
        }
        cfg
    }

    fn request(&self) -> TxRequest {
        let mut request = match &self.name {
            Some(name) => TxRequest::new(name.clone()),
            None => self.tx.request(),
        };
        if let Some(signer) = &self.signer {
            request = request.signer(signer.clone());
        }
        for (name, value) in &self.args {
            request = request.arg(name.clone(), value.clone());
        }
        request
    }
}

fn parse_arg(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got `{raw}`"))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    // Load .env (FLOW_NETWORK, FLOW_BASE_PATH, FLOW_BIN, ...)
    let cfg = args.configure(load_config()?);
    cfg.warn_if_network_unset();

    let request = args.request();
    run_flow(&cfg, &request, &FlowCli::new(), &mut std::io::stdout()).await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")); // fallback if RUST_LOG is unset

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
