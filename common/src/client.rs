use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Output;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::cadence::{encode_arguments, transaction_parameters};
use crate::config::Config;
use crate::outcome::TxOutcome;
use crate::project::FlowProject;
use crate::request::TxRequest;
use crate::{Error, Result};

/// Submits one transaction and reports its outcome.
#[async_trait]
pub trait TxClient: Send + Sync {
    async fn send(&self, cfg: &Config, request: &TxRequest) -> Result<TxOutcome>;
}

/// Delegates signing and submission to the `flow` CLI.
#[derive(Clone, Debug, Default)]
pub struct FlowCli;

/// Everything resolved from the project before the CLI is spawned.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    pub code_path: PathBuf,
    pub signer: String,
    pub args_json: String,
}

impl FlowCli {
    pub fn new() -> Self {
        Self
    }

    pub async fn prepare(&self, cfg: &Config, request: &TxRequest) -> Result<Submission> {
        let network = cfg.network_name();
        let project = FlowProject::load(&cfg.flow_json()).await?;
        project.ensure_network(network)?;
        let signer = project.signer(network, request.signer_name())?;

        let code_path = cfg.transaction_file(request.name());
        let code = match tokio::fs::read_to_string(&code_path).await {
            Ok(code) => code,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::TransactionNotFound(code_path));
            }
            Err(e) => return Err(e.into()),
        };

        let params = transaction_parameters(request.name(), &code)?;
        let args = encode_arguments(request.name(), &params, request.args(), |name| {
            project.address_of(network, name)
        })?;

        Ok(Submission {
            code_path,
            signer,
            args_json: serde_json::to_string(&args)?,
        })
    }
}

#[async_trait]
impl TxClient for FlowCli {
    async fn send(&self, cfg: &Config, request: &TxRequest) -> Result<TxOutcome> {
        let submission = self.prepare(cfg, request).await?;
        let args = send_args(cfg, &submission);

        info!(
            tx = request.name(),
            signer = %submission.signer,
            network = cfg.network_name(),
            "sending transaction"
        );
        debug!(bin = %cfg.flow_bin.display(), ?args, "flow cli");

        let started = Instant::now();
        let output = Command::new(&cfg.flow_bin).args(&args).output().await?;
        debug!(elapsed = ?started.elapsed(), status = ?output.status, "flow cli finished");

        outcome_from_output(&output)
    }
}

/// Command line for `flow transactions send`. `--network` is only passed
/// when one was selected, so the CLI keeps its own default otherwise.
pub fn send_args(cfg: &Config, submission: &Submission) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "transactions".into(),
        "send".into(),
        submission.code_path.clone().into(),
        "--args-json".into(),
        submission.args_json.clone().into(),
        "--signer".into(),
        submission.signer.clone().into(),
        "--output".into(),
        "json".into(),
        "--config-path".into(),
        cfg.flow_json().into(),
    ];
    if let Some(network) = cfg.network {
        args.push("--network".into());
        args.push(network.as_str().into());
    }
    if let Some(limit) = cfg.compute_limit {
        args.push("--compute-limit".into());
        args.push(limit.to_string().into());
    }
    args
}

pub(crate) fn outcome_from_output(output: &Output) -> Result<TxOutcome> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    match TxOutcome::from_cli_json(&stdout) {
        Ok(outcome) => Ok(outcome),
        Err(_) if !output.status.success() => Err(Error::Cli {
            code: output.status.code(),
            stderr: cli_message(&output.stderr, &stdout),
        }),
        Err(e) => Err(e),
    }
}

fn cli_message(stderr: &[u8], stdout: &str) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let msg = if stderr.trim().is_empty() {
        stdout.trim()
    } else {
        stderr.trim()
    };
    msg.to_string()
}
