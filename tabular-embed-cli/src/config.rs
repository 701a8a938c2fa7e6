//! Configuration file parser.

use anyhow::{Result as AnyResult, ensure};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tabular_embed::{ModelConfig, PipelineOptions, WriteOptions};

/// Structure of the configuration file.
#[derive(Deserialize, Debug, Default)]
pub struct Config {
    /// Input table configuration.
    #[serde(default)]
    pub input: InputConfig,
    /// Output table configuration.
    #[serde(default)]
    pub output: OutputConfig,
    /// Model configuration.
    #[serde(default)]
    pub model: ModelConfig,
}

/// Input table configuration.
#[derive(Deserialize, Debug)]
pub struct InputConfig {
    /// Path to the input table.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Name of the text column. Default is `Text`.
    #[serde(default = "defaults::text_column")]
    pub text_column: String,
    /// Field delimiter. Default is `,`.
    #[serde(default = "defaults::delimiter")]
    pub delimiter: char,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: None,
            text_column: defaults::text_column(),
            delimiter: defaults::delimiter(),
        }
    }
}

/// Output table configuration.
#[derive(Deserialize, Debug)]
pub struct OutputConfig {
    /// Path to the output table. Default is derived from the input path.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Prefix of the embedding columns. Default is `Mpnet_`.
    #[serde(default = "defaults::name_prefix")]
    pub name_prefix: String,
    /// Placeholder for missing values. Default is `NaN`.
    #[serde(default = "defaults::na_rep")]
    pub na_rep: String,
    /// Field delimiter. Default is `,`.
    #[serde(default = "defaults::delimiter")]
    pub delimiter: char,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: None,
            name_prefix: defaults::name_prefix(),
            na_rep: defaults::na_rep(),
            delimiter: defaults::delimiter(),
        }
    }
}

impl Config {
    /// Options for the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if a delimiter is not a single ASCII character.
    pub fn pipeline_options(&self) -> AnyResult<PipelineOptions> {
        Ok(PipelineOptions {
            text_column: self.input.text_column.clone(),
            name_prefix: self.output.name_prefix.clone(),
            delimiter: delimiter_byte(self.input.delimiter)?,
            write: WriteOptions {
                na_rep: self.output.na_rep.clone(),
                delimiter: delimiter_byte(self.output.delimiter)?,
            },
        })
    }
}

fn delimiter_byte(delimiter: char) -> AnyResult<u8> {
    ensure!(
        delimiter.is_ascii(),
        "Delimiter `{delimiter}` is not an ASCII character"
    );
    Ok(delimiter as u8)
}

/// Parse the configuration into a `Config` structure.
///
/// # Errors
///
/// Returns an [`Error`](toml::de::Error) if the configuration file is not valid, like unknown values.
fn parse_config_from_str(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}

/// Parse the configuration file into a `Config` structure.
///
/// # Errors
///
/// Returns an [IO error](std::io::Error) if reading fails, or a [TOML error](toml::de::Error) if parsing fails.
pub fn parse_config<T>(path: T) -> AnyResult<Config>
where
    T: AsRef<Path>,
{
    let content = std::fs::read_to_string(path)?;
    Ok(parse_config_from_str(&content)?)
}

/// Default values for the configuration.
mod defaults {
    /// Default text column.
    pub fn text_column() -> String {
        "Text".to_owned()
    }

    /// Default field delimiter.
    pub const fn delimiter() -> char {
        ','
    }

    /// Default embedding column prefix.
    pub fn name_prefix() -> String {
        "Mpnet_".to_owned()
    }

    /// Default missing value placeholder.
    pub fn na_rep() -> String {
        "NaN".to_owned()
    }
}
