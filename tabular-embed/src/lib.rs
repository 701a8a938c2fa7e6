//! # Tabular Embed Library
//!
//! `tabular-embed` is a library for appending sentence embeddings to tabular data.
//!
//! To be specific, it reads a delimited file with a text column, embeds the text of every row with a pre-trained sentence embedding model, and writes the remaining columns followed by one column per embedding component. Rows without text are dropped.
//!
//! ```no_run
//! use tabular_embed::{ModelConfig, Pipeline, PipelineOptions, Provider};
//!
//! # async fn run() -> Result<(), tabular_embed::EmbedError> {
//! let provider = Provider::load(&ModelConfig::default())?;
//! let pipeline = Pipeline::new(provider, PipelineOptions::default());
//! let summary = pipeline.run("posts.csv", "posts_mpnet.csv").await?;
//! println!("{} row(s) embedded", summary.embedded);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::nursery, clippy::pedantic, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, reason = "Dependencies")]

mod api;
mod columns;
pub mod embedding;
mod error;
#[cfg(feature = "local")]
mod local;
mod pipeline;
mod provider;
pub mod table;
mod transform;

pub use api::ApiClient;
pub use columns::generate_names;
pub use embedding::Embedding;
pub use error::{EmbedError, ProviderError, ReadError};
#[cfg(feature = "local")]
pub use local::LocalModel;
pub use pipeline::{Pipeline, PipelineOptions, RunSummary};
pub use provider::{ApiConfig, Backend, Device, EmbeddingProvider, Model, ModelConfig, Provider};
pub use table::{EmbeddedRow, EmbeddedTable, Field, Table, WriteOptions};
pub use transform::RowTransformer;
