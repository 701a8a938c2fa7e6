//! # Embedding module
//!
//! Embedding representation and dimension checking.
//!
//! ## Representation
//!
//! Embedding is represented as a vector of 32-bit floating point numbers, whose length (the dimension) is fixed by the model that produced it. [`Embedding`] wraps the raw `Vec<f32>` and can only be constructed through [`with_dimension`](Embedding::with_dimension), so every value of this type is known to have the dimension it was checked against.
//!
//! ## Conversion
//!
//! - [`Embedding`] can be immutably dereferenced to `[f32]`.
//! - [`Embedding`] can be converted back into `Vec<f32>`.

use super::ProviderError;
use std::ops::Deref;

/// Dimension-checked embedding.
///
/// See [module-level documentation](crate::embedding) for more details.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    inner: Vec<f32>,
}

impl Embedding {
    /// Wrap raw values, checking their length against `dimension`.
    ///
    /// # Errors
    ///
    /// Returns [`DimensionMismatch`](ProviderError::DimensionMismatch) if the length of `values` is not `dimension`.
    pub fn with_dimension(values: Vec<f32>, dimension: usize) -> Result<Self, ProviderError> {
        if values.len() == dimension {
            Ok(Self { inner: values })
        } else {
            Err(ProviderError::DimensionMismatch {
                expected: dimension,
                actual: values.len(),
            })
        }
    }

    /// Number of components.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.inner.len()
    }
}

impl From<Embedding> for Vec<f32> {
    fn from(embedding: Embedding) -> Self {
        embedding.inner
    }
}

impl Deref for Embedding {
    type Target = [f32];

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
