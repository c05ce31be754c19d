use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown network `{0}`")]
    UnknownNetwork(String),

    #[error("invalid value `{value}` for {var}")]
    InvalidSetting { var: &'static str, value: String },

    #[error("could not find account `{0}` in flow.json")]
    AccountNotFound(String),

    #[error("could not find transaction file {}", .0.display())]
    TransactionNotFound(PathBuf),

    #[error("malformed transaction `{name}`: {reason}")]
    MalformedTransaction { name: String, reason: String },

    #[error("the interaction `{name}` is missing {missing:?}")]
    MissingArguments { name: String, missing: Vec<String> },

    #[error("the interaction `{name}` has the following extra arguments {extra:?}")]
    ExtraArguments { name: String, extra: Vec<String> },

    #[error("argument `{arg}` has unsupported type `{ty}`")]
    UnsupportedArgumentType { arg: String, ty: String },

    #[error("argument `{arg}` value `{value}` is not a valid {ty}")]
    InvalidArgument {
        arg: String,
        ty: String,
        value: String,
    },

    #[error("flow cli exited with {code:?}: {stderr}")]
    Cli { code: Option<i32>, stderr: String },

    #[error("transaction `{name}` failed: {message}")]
    TxFailed { name: String, message: String },
}
