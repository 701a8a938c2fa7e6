//! `models` subcommand

use argh::FromArgs;
use tabular_embed::Model;

/// list known embedding models
#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand, name = "models", help_triggers("-h", "--help"))]
pub struct Models {
    /// only list models that run on-device
    #[argh(switch, short = 'l')]
    pub local: bool,
}

impl Models {
    /// Lines describing the known models.
    pub fn execute(&self) -> Vec<String> {
        Model::ALL
            .into_iter()
            .filter(|model| !self.local || model.runs_locally())
            .map(|model| {
                let backends = if model.runs_locally() { "local, api" } else { "api" };
                format!("{:<4} {model} ({backends})", model.dimension())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_models() {
        let lines = Models { local: false }.execute();
        assert_eq!(lines.len(), Model::ALL.len());
        assert_eq!(
            lines[0],
            "768  sentence-transformers/paraphrase-multilingual-mpnet-base-v2 (local, api)"
        );
        assert!(lines.contains(&"1024 BAAI/bge-m3 (api)".to_owned()));
    }

    #[test]
    fn local_models() {
        let lines = Models { local: true }.execute();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|line| line.ends_with("(local, api)")));
    }
}
