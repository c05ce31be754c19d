use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::{Error, Result};

/// The parts of `flow.json` the runner needs before handing off to the CLI.
#[derive(Deserialize, Debug, Default)]
pub struct FlowProject {
    #[serde(default)]
    pub networks: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub accounts: BTreeMap<String, AccountEntry>,
}

#[derive(Deserialize, Debug)]
pub struct AccountEntry {
    pub address: String,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FlowProject {
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn ensure_network(&self, network: &str) -> Result<()> {
        if self.networks.contains_key(network) {
            Ok(())
        } else {
            Err(Error::UnknownNetwork(network.to_string()))
        }
    }

    /// Accounts are keyed `<network>-<name>`, e.g. `testnet-testPin`.
    pub fn account_name(network: &str, name: &str) -> String {
        format!("{network}-{name}")
    }

    pub fn signer(&self, network: &str, name: &str) -> Result<String> {
        let account = Self::account_name(network, name);
        if self.accounts.contains_key(&account) {
            Ok(account)
        } else {
            Err(Error::AccountNotFound(account))
        }
    }

    pub fn address_of(&self, network: &str, name: &str) -> Option<String> {
        self.accounts
            .get(&Self::account_name(network, name))
            .map(|a| a.address.clone())
    }
}
