//! `embed` subcommand

use crate::Config;
use anyhow::{Context, Result, ensure};
use argh::FromArgs;
use log::debug;
use std::path::{Path, PathBuf};
use tabular_embed::{Device, Model, Pipeline, Provider, RunSummary};

/// append embeddings of the text column to a table
#[derive(FromArgs, PartialEq, Eq, Debug, Default)]
#[argh(subcommand, name = "embed", help_triggers("-h", "--help"))]
pub struct Embed {
    /// input table
    #[argh(option, short = 'i')]
    pub input: Option<PathBuf>,
    /// output table, defaults to `<input>_embedded.<ext>`
    #[argh(option, short = 'o')]
    pub output: Option<PathBuf>,
    /// name of the text column
    #[argh(option)]
    pub text_column: Option<String>,
    /// prefix of the embedding columns
    #[argh(option)]
    pub prefix: Option<String>,
    /// model to embed with
    #[argh(option, short = 'm')]
    pub model: Option<Model>,
    /// compute device: auto, cpu, cuda or cuda:<n>
    #[argh(option)]
    pub device: Option<Device>,
}

impl Embed {
    /// Embed the input table.
    pub async fn execute(self, mut config: Config) -> Result<RunSummary> {
        self.apply(&mut config);
        let input = config
            .input
            .path
            .clone()
            .context("No input table given, pass `-i` or set `input.path`")?;
        let output = config
            .output
            .path
            .clone()
            .unwrap_or_else(|| default_output(&input));
        ensure!(
            input != output,
            "Output would overwrite the input table `{}`",
            input.display()
        );
        debug!("Input: {input:?}, output: {output:?}");

        let options = config.pipeline_options()?;
        let provider = Provider::load(&config.model)?;
        let pipeline = Pipeline::new(provider, options);

        Ok(pipeline.run(&input, &output).await?)
    }

    /// Override the configuration with command line values.
    fn apply(self, config: &mut Config) {
        if let Some(input) = self.input {
            config.input.path = Some(input);
        }
        if let Some(output) = self.output {
            config.output.path = Some(output);
        }
        if let Some(text_column) = self.text_column {
            config.input.text_column = text_column;
        }
        if let Some(prefix) = self.prefix {
            config.output.name_prefix = prefix;
        }
        if let Some(model) = self.model {
            config.model.name = model;
            // A dimension configured for another model no longer applies
            config.model.dimension = None;
        }
        if let Some(device) = self.device {
            config.model.device = device;
        }
    }
}

/// `dir/name.ext` becomes `dir/name_embedded.ext`.
fn default_output(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let extension = input
        .extension()
        .map_or_else(|| "csv".into(), |extension| extension.to_string_lossy());
    input.with_file_name(format!("{stem}_embedded.{extension}"))
}
