//! # Local module
//!
//! On-device embedding with ONNX runtime. Model files are downloaded from Hugging Face on first use and cached.

use super::{Device, EmbeddingProvider, Model, ProviderError};
use fastembed::{EmbeddingModel, InitOptions, OutputKey, Pooling, TextEmbedding};
use log::debug;
use std::path::PathBuf;

/// Outputs to pool from, in order of preference.
const OUTPUT_PRECEDENCE: &[OutputKey] = &[
    OutputKey::OnlyOne,
    OutputKey::ByName("last_hidden_state"),
    OutputKey::ByName("sentence_embedding"),
];

/// An on-device sentence embedding model.
pub struct LocalModel {
    inner: TextEmbedding,
    model: Model,
}

impl LocalModel {
    /// Download (if necessary) and load `model` onto `device`.
    ///
    /// # Errors
    ///
    /// Returns [`Unavailable`](ProviderError::Unavailable) if the model or device is not supported, or a [model error](ProviderError::Model) if loading fails.
    pub fn new(model: Model, device: Device, cache_dir: Option<PathBuf>) -> Result<Self, ProviderError> {
        let mut options = InitOptions::new(embedding_model(model)?).with_show_download_progress(true);
        if let Some(cache_dir) = cache_dir {
            options = options.with_cache_dir(cache_dir);
        }
        options = with_device(options, device)?;

        let inner = TextEmbedding::try_new(options)
            .map_err(|e| ProviderError::Model(format!("{e:#}")))?;
        debug!("Loaded {model} on {device}");

        Ok(Self { inner, model })
    }
}

impl EmbeddingProvider for LocalModel {
    fn model_id(&self) -> &str {
        self.model.id()
    }

    fn dimension(&self) -> usize {
        self.model.dimension()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let texts = vec![text];
        let embeddings = if unit_length(self.model) {
            self.inner.embed(texts, None)
        } else {
            // The paraphrase models end at mean pooling, without a normalization layer
            self.inner.transform(texts, None).and_then(|output| {
                output.export_with_transformer(|batches| {
                    let mut embeddings = Vec::new();
                    for batch in batches {
                        let pooled =
                            batch.select_and_pool_output(&OUTPUT_PRECEDENCE, Some(Pooling::Mean))?;
                        embeddings.extend(copy_rows(pooled.rows()));
                    }
                    Ok(embeddings)
                })
            })
        };
        let mut embeddings = embeddings.map_err(|e| ProviderError::Model(format!("{e:#}")))?;
        embeddings.pop().ok_or_else(|| {
            ProviderError::Model("model returned no embedding".to_owned())
        })
    }
}

/// Whether `model` scales its sentence vectors to unit length.
const fn unit_length(model: Model) -> bool {
    matches!(model, Model::BgeLargeEnV1_5)
}

/// Copy pooled rows out as they are.
fn copy_rows<'a, R, V>(rows: R) -> Vec<Vec<f32>>
where
    R: IntoIterator<Item = V>,
    V: IntoIterator<Item = &'a f32>,
{
    rows.into_iter()
        .map(|row| row.into_iter().copied().collect())
        .collect()
}

/// The runtime's name for `model`.
fn embedding_model(model: Model) -> Result<EmbeddingModel, ProviderError> {
    match model {
        Model::ParaphraseMultilingualMpnetBaseV2 => Ok(EmbeddingModel::ParaphraseMLMpnetBaseV2),
        Model::ParaphraseMultilingualMiniLmL12V2 => Ok(EmbeddingModel::ParaphraseMLMiniLML12V2),
        Model::BgeLargeEnV1_5 => Ok(EmbeddingModel::BGELargeENV15),
        Model::BgeLargeZhV1_5 | Model::BgeM3 => Err(ProviderError::Unavailable(format!(
            "`{model}` cannot run locally, use the api backend"
        ))),
    }
}

#[cfg(feature = "cuda")]
fn with_device(options: InitOptions, device: Device) -> Result<InitOptions, ProviderError> {
    use ort::execution_providers::{CUDAExecutionProvider, ExecutionProviderDispatch};

    let cuda = |ordinal: usize| -> Result<ExecutionProviderDispatch, ProviderError> {
        let ordinal = i32::try_from(ordinal)
            .map_err(|_| ProviderError::Unavailable(format!("invalid CUDA device {ordinal}")))?;
        Ok(CUDAExecutionProvider::default()
            .with_device_id(ordinal)
            .build())
    };
    match device {
        Device::Cpu => Ok(options),
        // Registration falls back to CPU if no CUDA device is present
        Device::Auto => Ok(options.with_execution_providers(vec![cuda(0)?])),
        Device::Cuda(ordinal) => Ok(options.with_execution_providers(vec![
            cuda(ordinal)?.error_on_failure(),
        ])),
    }
}

#[cfg(not(feature = "cuda"))]
fn with_device(options: InitOptions, device: Device) -> Result<InitOptions, ProviderError> {
    match device {
        Device::Auto | Device::Cpu => Ok(options),
        Device::Cuda(_) => Err(ProviderError::Unavailable(format!(
            "device `{device}` requested, but built without the `cuda` feature"
        ))),
    }
}
