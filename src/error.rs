//! Error types
//!
//! `BatchError` covers the conditions that stop a whole run. `ServiceError`
//! is the terminal error of a single analyze call and never escapes the
//! dispatcher: it is logged and the group simply produces no row.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Invalid {role} pattern '{pattern}': {source}")]
    InvalidPattern {
        role: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid service address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Max parallel requests must be at least 1")]
    InvalidConcurrency,

    #[error("Failed to configure transport: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("Output file {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output writer stopped unexpectedly: {0}")]
    Writer(String),

    #[error("Dispatch failed: {0}")]
    Dispatch(String),
}

#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("RPC failed ({code:?}): {message}")]
    Rpc { code: tonic::Code, message: String },

    #[error("Call timed out after {0:?}")]
    Timeout(Duration),
}

impl From<tonic::Status> for ServiceError {
    fn from(status: tonic::Status) -> Self {
        ServiceError::Rpc {
            code: status.code(),
            message: status.message().to_string(),
        }
    }
}
