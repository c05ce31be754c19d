// common/src/lib.rs
mod error;

pub mod cadence;
pub mod client;
pub mod config;
pub mod outcome;
pub mod project;
pub mod request;

use std::io::Write;

use console::style;
use tracing::{error, info};

pub use client::{FlowCli, TxClient};
pub use config::{load_config, Config, Network};
pub use error::{Error, Result};
pub use outcome::{PrintOptions, TxOutcome};
pub use request::TxRequest;

// ─────────────────── Runner ───────────────────

/// Announce the run, send `request` once through `client`, print the result.
///
/// Nothing is retried. A client error ends the run before anything is
/// printed; a transaction that fails on chain is printed and then returned
/// as `Error::TxFailed`.
pub async fn run_flow<C, W>(
    cfg: &Config,
    request: &TxRequest,
    client: &C,
    out: &mut W,
) -> Result<TxOutcome>
where
    C: TxClient + ?Sized,
    W: Write,
{
    writeln!(out, "Testing Contract")?;
    writeln!(out, "{}", style("PinPin Contract testing").blue())?;
    out.flush()?;

    info!(tx = request.name(), network = cfg.network_name(), "invoking transaction");
    let outcome = client.send(cfg, request).await?;

    outcome.print(request.name(), cfg.print_options.as_ref(), out)?;

    if let Some(message) = outcome.failure() {
        error!(tx = request.name(), id = %outcome.id, "transaction failed");
        return Err(Error::TxFailed {
            name: request.name().to_string(),
            message: message.to_string(),
        });
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every call and answers with a canned result.
    struct RecordingClient {
        calls: Mutex<Vec<(Option<Network>, TxRequest)>>,
        reply: fn() -> Result<TxOutcome>,
    }

    impl RecordingClient {
        fn new(reply: fn() -> Result<TxOutcome>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply,
            }
        }

        fn calls(&self) -> Vec<(Option<Network>, TxRequest)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TxClient for RecordingClient {
        async fn send(&self, cfg: &Config, request: &TxRequest) -> Result<TxOutcome> {
            self.calls
                .lock()
                .unwrap()
                .push((cfg.network, request.clone()));
            (self.reply)()
        }
    }

    fn sealed() -> Result<TxOutcome> {
        Ok(TxOutcome {
            id: "f00d".into(),
            status: "SEALED".into(),
            ..Default::default()
        })
    }

    fn unreachable_network() -> Result<TxOutcome> {
        Err(Error::Cli {
            code: Some(1),
            stderr: "connection refused".into(),
        })
    }

    fn reverted() -> Result<TxOutcome> {
        Ok(TxOutcome {
            id: "f00d".into(),
            status: "SEALED".into(),
            error: Some("pre-condition failed".into()),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn invokes_start_loop_once_on_testnet() {
        let client = RecordingClient::new(sealed);
        let mut out = Vec::new();

        let outcome = run_flow(&Config::testnet(), &TxRequest::start_loop(), &client, &mut out)
            .await
            .unwrap();
        assert_eq!(outcome.id, "f00d");

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        let (network, request) = &calls[0];
        assert_eq!(*network, Some(Network::Testnet));
        assert_eq!(request.name(), "startLoop");
        assert_eq!(request.signer_name(), "testPin");
        assert_eq!(request.get("delaySeconds"), Some("5.0"));
        assert_eq!(request.get("priority"), Some("1"));
        assert_eq!(request.get("executionEffort"), Some("1000"));
        assert_eq!(request.get("transactionData"), Some(""));
    }

    #[tokio::test]
    async fn unset_variant_passes_no_network() {
        let client = RecordingClient::new(sealed);
        let mut out = Vec::new();

        run_flow(&Config::unset_network(), &TxRequest::start_loop(), &client, &mut out)
            .await
            .unwrap();

        assert_eq!(client.calls()[0].0, None);
    }

    #[tokio::test]
    async fn unselected_presets_never_run() {
        let client = RecordingClient::new(sealed);
        let mut out = Vec::new();

        run_flow(&Config::testnet(), &TxRequest::start_loop(), &client, &mut out)
            .await
            .unwrap();

        let names: Vec<String> = client
            .calls()
            .iter()
            .map(|(_, r)| r.name().to_string())
            .collect();
        assert_eq!(names, ["startLoop"]);
    }

    #[tokio::test]
    async fn status_lines_come_first() {
        let client = RecordingClient::new(sealed);
        let mut out = Vec::new();

        run_flow(&Config::testnet(), &TxRequest::start_loop(), &client, &mut out)
            .await
            .unwrap();

        let printed = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = printed.lines().collect();
        assert_eq!(lines[0], "Testing Contract");
        assert!(lines[1].contains("PinPin Contract testing"));
        assert!(lines[2].starts_with("👌 Tx:startLoop"));
    }

    #[tokio::test]
    async fn client_failure_is_not_retried() {
        let client = RecordingClient::new(unreachable_network);
        let mut out = Vec::new();

        let err = run_flow(&Config::testnet(), &TxRequest::start_loop(), &client, &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cli { .. }));
        assert_eq!(client.calls().len(), 1);

        // the status lines are out, the result never is
        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed.lines().count(), 2);
    }

    #[tokio::test]
    async fn on_chain_failure_is_printed_then_returned() {
        let client = RecordingClient::new(reverted);
        let mut out = Vec::new();

        let err = run_flow(&Config::testnet(), &TxRequest::start_loop(), &client, &mut out)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::TxFailed { ref name, ref message }
                if name == "startLoop" && message == "pre-condition failed"
        ));
        assert_eq!(client.calls().len(), 1);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Tx:startLoop error:pre-condition failed"));
    }
}
