/// Signer used when a request names none; the project's service account.
pub const DEFAULT_SIGNER: &str = "account";

/// One transaction invocation: name, signer and named string arguments.
///
/// Arguments keep the order they were first set in. Setting a name again
/// replaces its value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxRequest {
    name: String,
    signer: String,
    args: Vec<(String, String)>,
}

impl TxRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signer: DEFAULT_SIGNER.to_string(),
            args: Vec::new(),
        }
    }

    pub fn signer(mut self, signer: impl Into<String>) -> Self {
        self.signer = signer.into();
        self
    }

    pub fn arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());
        match self.args.iter().position(|(n, _)| *n == name) {
            Some(i) => self.args[i].1 = value,
            None => self.args.push((name, value)),
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signer_name(&self) -> &str {
        &self.signer
    }

    pub fn args(&self) -> &[(String, String)] {
        &self.args
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    // ────────── presets ──────────

    /// Schedule the pin loop: first run after `delaySeconds`, no payload.
    pub fn start_loop() -> Self {
        Self::new("startLoop")
            .signer("testPin")
            .arg("delaySeconds", "5.0")
            .arg("priority", "1")
            .arg("executionEffort", "1000")
            .arg("transactionData", "")
    }

    pub fn subscribe() -> Self {
        Self::new("subscribe").signer("testPin")
    }
}
