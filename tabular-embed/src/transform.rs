//! # Transform module
//!
//! Turns one input row into one output row.

use super::{EmbedError, EmbeddedRow, Embedding, EmbeddingProvider, Field};
use log::debug;

/// Embeds the text field of single rows.
pub struct RowTransformer<'a, P> {
    provider: &'a P,
    text_index: usize,
}

impl<'a, P: EmbeddingProvider> RowTransformer<'a, P> {
    /// Create a transformer for rows whose text field is at `text_index`.
    #[must_use]
    pub const fn new(provider: &'a P, text_index: usize) -> Self {
        Self {
            provider,
            text_index,
        }
    }

    /// Transform `row`, the `row_number`-th data row (1-based).
    ///
    /// Rows whose text field is not a string value are skipped, returning `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Encode`](EmbedError::Encode) if the provider fails or returns a vector of the wrong dimension.
    pub async fn transform(
        &self,
        row: &[Field],
        row_number: usize,
    ) -> Result<Option<EmbeddedRow>, EmbedError> {
        let Some(text) = row.get(self.text_index).and_then(Field::as_text) else {
            debug!("Skipping row {row_number}: no text");
            return Ok(None);
        };

        let encode_error = |source| EmbedError::Encode {
            row: row_number,
            source,
        };
        let values = self.provider.embed(text).await.map_err(encode_error)?;
        let embedding =
            Embedding::with_dimension(values, self.provider.dimension()).map_err(encode_error)?;

        let fields = row
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != self.text_index)
            .map(|(_, field)| field.clone())
            .collect();

        Ok(Some(EmbeddedRow { fields, embedding }))
    }
}
