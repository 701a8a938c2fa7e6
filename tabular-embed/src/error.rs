//! # Error module
//!
//! Possible errors. Every fatal [`EmbedError`] names the stage that failed: loading the provider, reading the input, encoding a row, or writing the output.

use std::path::PathBuf;
use thiserror::Error;

/// Possible errors of a run.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// The embedding provider could not be initialized.
    #[error("failed to load embedding model `{model}`")]
    ProviderInit {
        /// Model identifier that was requested.
        model: String,
        /// Underlying cause.
        #[source]
        source: ProviderError,
    },
    /// The input table could not be read.
    #[error("failed to read input table `{}`", path.display())]
    InputRead {
        /// Path of the input table.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: ReadError,
    },
    /// The provider failed on a row's text.
    #[error("failed to encode text of row {row}")]
    Encode {
        /// 1-based data row number (header excluded).
        row: usize,
        /// Underlying cause.
        #[source]
        source: ProviderError,
    },
    /// The output table could not be written.
    #[error("failed to write output table `{}`", path.display())]
    OutputWrite {
        /// Path of the output table.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: csv::Error,
    },
}

/// Reasons an input table is rejected.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The file is missing, unreadable, or not valid delimited text.
    #[error(transparent)]
    Csv(#[from] csv::Error),
    /// The file does not even contain a header row.
    #[error("no header row")]
    Empty,
    /// The required text column is absent.
    #[error("missing required column `{0}`")]
    MissingColumn(String),
}

/// Errors raised by an embedding provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP transport or decoding failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The API answered with a non-success status.
    #[error("api returned {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },
    /// The API answered successfully but without any embedding.
    #[error("response contains no embedding")]
    EmptyResponse,
    /// The model runtime reported an error.
    #[error("model error: {0}")]
    Model(String),
    /// The requested model, device or backend cannot be used.
    #[error("{0}")]
    Unavailable(String),
    /// Embedding length does not match the expected dimension.
    #[error("embedding must be {expected}-dimensional, got {actual}")]
    DimensionMismatch {
        /// Dimension of the loaded model.
        expected: usize,
        /// Length actually produced.
        actual: usize,
    },
}
