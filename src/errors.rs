// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Only configuration/policy construction and CLI wiring return these.
//! Command execution and safety validation report their outcomes as plain
//! values (`ExecutionResult`, `KillValidation`, ...), never as errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CmdguardError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Protection policy error: {0}")]
    Policy(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CmdguardError>;
