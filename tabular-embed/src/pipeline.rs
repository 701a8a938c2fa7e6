//! # Pipeline module
//!
//! Reads a table, embeds the text field of every row in order, and writes the result.

use super::{
    EmbedError, EmbeddedTable, EmbeddingProvider, ReadError, RowTransformer, Table, WriteOptions,
    generate_names,
};
use log::{debug, info};
use std::path::Path;

/// Options of a [`Pipeline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Name of the text column.
    pub text_column: String,
    /// Prefix of the generated embedding columns.
    pub name_prefix: String,
    /// Field delimiter of the input.
    pub delimiter: u8,
    /// How the output is written.
    pub write: WriteOptions,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            text_column: "Text".to_owned(),
            name_prefix: "Mpnet_".to_owned(),
            delimiter: b',',
            write: WriteOptions::default(),
        }
    }
}

/// Summary of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of input rows.
    pub read: usize,
    /// Number of rows written with an embedding.
    pub embedded: usize,
    /// Number of rows dropped for lacking text.
    pub skipped: usize,
}

/// The table pipeline.
pub struct Pipeline<P> {
    provider: P,
    options: PipelineOptions,
}

impl<P: EmbeddingProvider> Pipeline<P> {
    /// Create a pipeline around a loaded provider.
    #[must_use]
    pub const fn new(provider: P, options: PipelineOptions) -> Self {
        Self { provider, options }
    }

    /// The provider in use.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Read `input`, embed it and write the result to `output`. Nothing is written if reading or encoding fails.
    ///
    /// # Errors
    ///
    /// Returns [`InputRead`](EmbedError::InputRead) if the input cannot be read or lacks the text column, [`Encode`](EmbedError::Encode) if the provider fails on any row, or [`OutputWrite`](EmbedError::OutputWrite) if the output cannot be written.
    pub async fn run<T1, T2>(&self, input: T1, output: T2) -> Result<RunSummary, EmbedError>
    where
        T1: AsRef<Path>,
        T2: AsRef<Path>,
    {
        let (input, output) = (input.as_ref(), output.as_ref());
        let read_error = |source| EmbedError::InputRead {
            path: input.to_path_buf(),
            source,
        };

        info!("Reading {}...", input.display());
        let table = Table::read_csv(input, self.options.delimiter).map_err(read_error)?;
        let text_index = self.locate_text(&table).map_err(read_error)?;

        info!(
            "Embedding {} row(s) with {}...",
            table.len(),
            self.provider.model_id()
        );
        let (embedded, summary) = self.process(&table, text_index).await?;

        info!("Writing {}...", output.display());
        embedded
            .write_csv(output, &self.options.write)
            .map_err(|source| EmbedError::OutputWrite {
                path: output.to_path_buf(),
                source,
            })?;

        Ok(summary)
    }

    /// Position of the text column in `table`.
    ///
    /// # Errors
    ///
    /// Returns [`MissingColumn`](ReadError::MissingColumn) if there is no such column.
    pub fn locate_text(&self, table: &Table) -> Result<usize, ReadError> {
        let column = &self.options.text_column;
        table
            .column_index(column)
            .ok_or_else(|| ReadError::MissingColumn(column.clone()))
    }

    /// Embed every row of `table` in order, the text field being at `text_index`.
    ///
    /// # Errors
    ///
    /// Returns [`Encode`](EmbedError::Encode) on the first row the provider fails on.
    pub async fn process(
        &self,
        table: &Table,
        text_index: usize,
    ) -> Result<(EmbeddedTable, RunSummary), EmbedError> {
        let names = generate_names(&self.options.name_prefix, self.provider.dimension());
        let columns = table
            .columns()
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != text_index)
            .map(|(_, column)| column.clone())
            .chain(names)
            .collect();
        debug!("Output columns: {columns:?}");

        let mut embedded = EmbeddedTable::new(columns);
        let mut summary = RunSummary {
            read: table.len(),
            ..RunSummary::default()
        };
        let transformer = RowTransformer::new(&self.provider, text_index);
        for (i, row) in table.rows().iter().enumerate() {
            match transformer.transform(row, i + 1).await? {
                Some(row) => {
                    embedded.push(row);
                    summary.embedded += 1;
                }
                None => summary.skipped += 1,
            }
        }

        Ok((embedded, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Field, ProviderError, provider::testing::Lookup};
    use std::fs;
    use tempfile::tempdir;

    fn options(prefix: &str) -> PipelineOptions {
        PipelineOptions {
            name_prefix: prefix.to_owned(),
            ..PipelineOptions::default()
        }
    }

    fn pipeline() -> Pipeline<Lookup> {
        let provider = Lookup::new(
            3,
            [
                ("hello", vec![0.1, 0.2, 0.3]),
                ("world", vec![0.4, 0.5, 0.6]),
            ],
        );
        Pipeline::new(provider, options("E_"))
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|&name| name.to_owned()).collect()
    }

    #[tokio::test]
    async fn drops_non_text_rows() {
        let pipeline = pipeline();
        let table = Table::new(
            columns(&["Text", "id"]),
            vec![
                vec![Field::from("hello"), Field::Integer(1)],
                vec![Field::Integer(42), Field::Integer(2)],
                vec![Field::from("world"), Field::Integer(3)],
            ],
        );
        let text_index = pipeline.locate_text(&table).unwrap();

        let (embedded, summary) = pipeline.process(&table, text_index).await.unwrap();
        assert_eq!(embedded.columns(), columns(&["id", "E_1", "E_2", "E_3"]));
        assert_eq!(
            summary,
            RunSummary {
                read: 3,
                embedded: 2,
                skipped: 1
            }
        );

        let rows = embedded.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields, [Field::Integer(1)]);
        assert_eq!(&*rows[0].embedding, &[0.1, 0.2, 0.3]);
        assert_eq!(rows[1].fields, [Field::Integer(3)]);
        assert_eq!(&*rows[1].embedding, &[0.4, 0.5, 0.6]);
    }

    #[tokio::test]
    async fn keeps_column_order() {
        let pipeline = pipeline();
        let table = Table::new(
            columns(&["a", "Text", "b", "c"]),
            vec![vec![
                Field::Float(0.5),
                Field::from("hello"),
                Field::Missing,
                Field::from("x"),
            ]],
        );

        let (embedded, _) = pipeline.process(&table, 1).await.unwrap();
        assert_eq!(
            embedded.columns(),
            columns(&["a", "b", "c", "E_1", "E_2", "E_3"])
        );
        assert_eq!(
            embedded.rows()[0].fields,
            [Field::Float(0.5), Field::Missing, Field::from("x")]
        );
    }

    #[tokio::test]
    async fn empty_table() {
        let pipeline = pipeline();
        let table = Table::new(columns(&["id", "Text"]), Vec::new());

        let (embedded, summary) = pipeline.process(&table, 1).await.unwrap();
        assert!(embedded.is_empty());
        assert_eq!(embedded.columns(), columns(&["id", "E_1", "E_2", "E_3"]));
        assert_eq!(summary, RunSummary::default());
    }

    #[tokio::test]
    async fn repeated_runs_agree() {
        let pipeline = pipeline();
        let table = Table::new(
            columns(&["Text"]),
            vec![vec![Field::from("world")], vec![Field::from("hello")]],
        );

        let first = pipeline.process(&table, 0).await.unwrap();
        let second = pipeline.process(&table, 0).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn run_files() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.csv");
        let output = dir.path().join("output.csv");
        fs::write(&input, "Text,id,note\nhello,1,\n,2,skipped\nworld,3,last\n").unwrap();

        let summary = pipeline().run(&input, &output).await.unwrap();
        assert_eq!(summary.embedded, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "id,note,E_1,E_2,E_3\n1,NaN,0.1,0.2,0.3\n3,last,0.4,0.5,0.6\n"
        );
    }

    #[tokio::test]
    async fn run_integer_column_with_blanks() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.csv");
        let output = dir.path().join("output.csv");
        fs::write(&input, "Text,id\nhello,1\nworld,\n").unwrap();

        pipeline().run(&input, &output).await.unwrap();
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "id,E_1,E_2,E_3\n1.0,0.1,0.2,0.3\nNaN,0.4,0.5,0.6\n"
        );
    }

    #[tokio::test]
    async fn run_header_only() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.csv");
        let output = dir.path().join("output.csv");
        fs::write(&input, "id,Text,group\n").unwrap();

        let summary = pipeline().run(&input, &output).await.unwrap();
        assert_eq!(summary, RunSummary::default());
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "id,group,E_1,E_2,E_3\n"
        );
    }

    #[tokio::test]
    async fn run_missing_column() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.csv");
        let output = dir.path().join("output.csv");
        fs::write(&input, "id,body\n1,hello\n").unwrap();

        let error = pipeline().run(&input, &output).await.unwrap_err();
        assert!(matches!(
            error,
            EmbedError::InputRead {
                source: ReadError::MissingColumn(ref column),
                ..
            } if column == "Text"
        ));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn run_missing_input() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.csv");
        let output = dir.path().join("output.csv");

        let error = pipeline().run(&input, &output).await.unwrap_err();
        assert!(matches!(
            error,
            EmbedError::InputRead {
                source: ReadError::Csv(_),
                ..
            }
        ));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn run_encode_failure() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.csv");
        let output = dir.path().join("output.csv");
        fs::write(&input, "Text\nhello\nmystery\n").unwrap();

        let error = pipeline().run(&input, &output).await.unwrap_err();
        assert!(matches!(
            error,
            EmbedError::Encode {
                row: 2,
                source: ProviderError::Model(_)
            }
        ));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn run_unwritable_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.csv");
        let output = dir.path().join("missing-dir").join("output.csv");
        fs::write(&input, "Text\nhello\n").unwrap();

        let error = pipeline().run(&input, &output).await.unwrap_err();
        assert!(matches!(error, EmbedError::OutputWrite { .. }));
        assert!(error.to_string().contains("output.csv"));
    }
}
