// src/config/mod.rs

//! Configuration loading and validation for cmdguard.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and apply environment overrides
//!   (`loader.rs`, `env.rs`).
//! - Validate and normalise it into an immutable [`Settings`] value
//!   (`validate.rs`).
//!
//! A single `Settings` is built at startup, wrapped in an `Arc` and handed to
//! the executor and the safety validator. Nothing reads configuration through
//! a global.

pub mod env;
pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{
    ExecutionSection, ExecutionSettings, LoggingSection, LoggingSettings, RawSettings,
    SafetySection, Settings,
};
