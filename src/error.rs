//! Centralized error types for the state machine runtime.
//!
//! This module defines all error types used throughout the crate,
//! providing a consistent error handling approach.

use crate::machine::action::ParameterKind;

/// Main error type for the runtime.
///
/// This is the primary error type that should be used in public APIs.
#[derive(thiserror::Error, Debug)]
pub enum MachinaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),
}

/// Errors in a machine definition or an action's declared parameters.
///
/// These are authoring mistakes, not runtime faults. At runtime the machine
/// logs and ignores them; the validation pass in [`crate::machine::definition`]
/// surfaces them before a machine is ever started.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Malformed machine definition: {0}")]
    Malformed(String),

    #[error("Unknown state: {0}")]
    UnknownState(String),

    #[error("Transition '{key}' in state '{state}' targets unknown state '{target}'")]
    DanglingTransition { state: String, key: String, target: String },

    #[error("Unknown action kind: {0}")]
    UnknownActionKind(String),

    #[error("Missing required parameter '{key}' for action '{kind}'")]
    MissingParameter { kind: String, key: String },

    #[error("Parameter '{key}' has the wrong type, expected {expected}")]
    ParameterType { key: String, expected: ParameterKind },

    #[error("Parameter '{key}' value {value} is outside the allowed range {min}..{max}")]
    ParameterOutOfRange { key: String, value: f64, min: f64, max: f64 },
}

/// Errors produced by the resource loader.
///
/// `Clone` is required because a single failed fetch may be observed by every
/// caller sharing the deduplicated in-flight future.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Path was empty")]
    EmptyPath,

    #[error("Could not load data from {path}: {message}")]
    Request { path: String, message: String },

    #[error("Could not parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Data at {path} is not valid UTF-8")]
    Encoding { path: String },
}

/// Result type for runtime operations.
pub type MachinaResult<T> = Result<T, MachinaError>;
