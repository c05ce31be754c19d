use std::io::{self, Write};

use console::style;
use serde::Deserialize;
use serde_json::Value;

use crate::Result;

/// What `TxOutcome::print` shows beyond the summary line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrintOptions {
    pub events: bool,
    pub fee: bool,
    pub id: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            events: true,
            fee: true,
            id: true,
        }
    }
}

impl PrintOptions {
    /// Used when no global print options were configured.
    pub fn summary() -> Self {
        Self {
            events: false,
            fee: false,
            id: true,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TxOutcome {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub events: Vec<TxEvent>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TxEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub values: Value,
}

impl TxEvent {
    fn is_fee_event(&self) -> bool {
        self.kind.contains(".FlowFees.")
    }
}

impl TxOutcome {
    pub fn from_cli_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw.trim())?)
    }

    /// The on-chain error message, if the transaction failed.
    pub fn failure(&self) -> Option<&str> {
        self.error
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// Amount taken by `FlowFees.FeesDeducted`, as reported by the event.
    pub fn fee(&self) -> Option<String> {
        self.events
            .iter()
            .find(|e| e.kind.ends_with(".FlowFees.FeesDeducted"))
            .and_then(|e| e.values.get("amount"))
            .map(display_value)
    }

    pub fn print<W: Write>(
        &self,
        name: &str,
        options: Option<&PrintOptions>,
        out: &mut W,
    ) -> io::Result<()> {
        if let Some(err) = self.failure() {
            return writeln!(out, "{} Tx:{name} error:{err}", style("❌").red());
        }

        let options = options.cloned().unwrap_or_else(PrintOptions::summary);

        let mut summary = format!("👌 Tx:{name}");
        if options.fee {
            if let Some(fee) = self.fee() {
                summary.push_str(&format!(" fee:{fee}"));
            }
        }
        if options.id && !self.id.is_empty() {
            summary.push_str(&format!(" id:{}", self.id));
        }
        writeln!(out, "{summary}")?;

        if !options.events {
            return Ok(());
        }
        for event in self.events.iter().filter(|e| !e.is_fee_event()) {
            writeln!(out, "  {}", style(&event.kind).cyan())?;
            match &event.values {
                Value::Object(fields) => {
                    for (key, value) in fields {
                        writeln!(out, "     {key} -> {}", display_value(value))?;
                    }
                }
                Value::Null => {}
                other => writeln!(out, "     {}", display_value(other))?,
            }
        }
        Ok(())
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
