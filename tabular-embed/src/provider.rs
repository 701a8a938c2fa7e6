//! # Provider module
//!
//! The [`EmbeddingProvider`] contract, the catalogue of known [`Model`]s, and the [`Provider`] that loads a configured backend.
//!
//! ## Backends
//!
//! - [`Backend::Local`]: on-device inference with ONNX runtime, see [`LocalModel`](crate::LocalModel). Requires the `local` feature (enabled by default).
//! - [`Backend::Api`]: remote inference over an OpenAI-compatible HTTP API, see [`ApiClient`].

#[cfg(feature = "local")]
use super::LocalModel;
use super::{ApiClient, EmbedError, ProviderError};
use log::{debug, info};
use serde::Deserialize;
use std::{fmt, future::Future, path::PathBuf, str::FromStr};

/// Something that maps text to a fixed-length vector.
pub trait EmbeddingProvider {
    /// Identifier of the underlying model.
    fn model_id(&self) -> &str;

    /// Length of every vector returned by [`embed`](EmbeddingProvider::embed).
    fn dimension(&self) -> usize;

    /// Embed a single text.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, ProviderError>>;
}

/// Known models.
#[derive(Deserialize, Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum Model {
    /// Multilingual paraphrase MPNet, 768 dimensions.
    #[default]
    #[serde(rename = "sentence-transformers/paraphrase-multilingual-mpnet-base-v2")]
    ParaphraseMultilingualMpnetBaseV2,
    /// Multilingual paraphrase MiniLM, 384 dimensions.
    #[serde(rename = "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2")]
    ParaphraseMultilingualMiniLmL12V2,
    /// BGE large, English, 1024 dimensions.
    #[serde(rename = "BAAI/bge-large-en-v1.5")]
    BgeLargeEnV1_5,
    /// BGE large, Chinese, 1024 dimensions.
    #[serde(rename = "BAAI/bge-large-zh-v1.5")]
    BgeLargeZhV1_5,
    /// BGE M3, multilingual, 1024 dimensions.
    #[serde(rename = "BAAI/bge-m3")]
    BgeM3,
}

impl Model {
    /// All known models.
    pub const ALL: [Self; 5] = [
        Self::ParaphraseMultilingualMpnetBaseV2,
        Self::ParaphraseMultilingualMiniLmL12V2,
        Self::BgeLargeEnV1_5,
        Self::BgeLargeZhV1_5,
        Self::BgeM3,
    ];

    /// Hugging Face identifier.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::ParaphraseMultilingualMpnetBaseV2 => {
                "sentence-transformers/paraphrase-multilingual-mpnet-base-v2"
            }
            Self::ParaphraseMultilingualMiniLmL12V2 => {
                "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2"
            }
            Self::BgeLargeEnV1_5 => "BAAI/bge-large-en-v1.5",
            Self::BgeLargeZhV1_5 => "BAAI/bge-large-zh-v1.5",
            Self::BgeM3 => "BAAI/bge-m3",
        }
    }

    /// Embedding dimension.
    #[must_use]
    pub const fn dimension(self) -> usize {
        match self {
            Self::ParaphraseMultilingualMpnetBaseV2 => 768,
            Self::ParaphraseMultilingualMiniLmL12V2 => 384,
            Self::BgeLargeEnV1_5 | Self::BgeLargeZhV1_5 | Self::BgeM3 => 1024,
        }
    }

    /// Whether the model can run on-device.
    #[must_use]
    pub const fn runs_locally(self) -> bool {
        matches!(
            self,
            Self::ParaphraseMultilingualMpnetBaseV2
                | Self::ParaphraseMultilingualMiniLmL12V2
                | Self::BgeLargeEnV1_5
        )
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Model {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|model| model.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown model `{s}`"))
    }
}

/// Compute device for on-device inference.
#[derive(Deserialize, Debug, Default, PartialEq, Eq, Clone, Copy)]
#[serde(try_from = "String")]
pub enum Device {
    /// First accelerator if available, CPU otherwise.
    #[default]
    Auto,
    /// CPU only.
    Cpu,
    /// CUDA device with the given ordinal.
    Cuda(usize),
}

impl FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            "cuda" => Ok(Self::Cuda(0)),
            other => other
                .strip_prefix("cuda:")
                .and_then(|ordinal| ordinal.parse().ok())
                .map(Self::Cuda)
                .ok_or_else(|| format!("unknown device `{s}`, expected `auto`, `cpu` or `cuda:<n>`")),
        }
    }
}

impl TryFrom<String> for Device {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Cpu => f.write_str("cpu"),
            Self::Cuda(ordinal) => write!(f, "cuda:{ordinal}"),
        }
    }
}

/// Where inference happens.
#[derive(Deserialize, Debug, Default, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// On-device.
    #[default]
    Local,
    /// Remote HTTP API.
    Api,
}

/// Model configuration.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// Model to use for embedding.
    #[serde(default)]
    pub name: Model,
    /// Expected dimension. Must match the model if given.
    #[serde(default)]
    pub dimension: Option<usize>,
    /// Compute device, only used by the local backend.
    #[serde(default)]
    pub device: Device,
    /// Backend to run the model on.
    #[serde(default)]
    pub backend: Backend,
    /// Where downloaded model files are kept, only used by the local backend.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// API configuration, only used by the api backend.
    #[serde(default)]
    pub api: ApiConfig,
}

/// API configuration.
#[derive(Deserialize, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// API key.
    #[serde(default)]
    pub key: String,
    /// Embeddings endpoint.
    #[serde(default = "defaults::endpoint")]
    pub endpoint: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            endpoint: defaults::endpoint(),
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.key.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("ApiConfig")
            .field("key", &key)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Default values for the configuration.
mod defaults {
    /// Default embeddings endpoint.
    pub fn endpoint() -> String {
        "https://api.siliconflow.cn/v1/embeddings".to_owned()
    }
}

/// A loaded backend.
pub enum Provider {
    /// On-device model.
    #[cfg(feature = "local")]
    Local(LocalModel),
    /// Remote API.
    Api(ApiClient),
}

impl Provider {
    /// Load the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderInit`](EmbedError::ProviderInit) if the configured dimension disagrees with the model, the model is unavailable for the backend, or the backend fails to initialize.
    pub fn load(config: &ModelConfig) -> Result<Self, EmbedError> {
        let model = config.name;
        let init_error = |source| EmbedError::ProviderInit {
            model: model.id().to_owned(),
            source,
        };

        if let Some(dimension) = config.dimension
            && dimension != model.dimension()
        {
            return Err(init_error(ProviderError::DimensionMismatch {
                expected: model.dimension(),
                actual: dimension,
            }));
        }

        info!("Loading {model} ({:?} backend)...", config.backend);
        let provider = match config.backend {
            #[cfg(feature = "local")]
            Backend::Local => {
                LocalModel::new(model, config.device, config.cache_dir.clone()).map(Self::Local)
            }
            #[cfg(not(feature = "local"))]
            Backend::Local => Err(ProviderError::Unavailable(
                "built without the `local` feature, use the api backend".to_owned(),
            )),
            Backend::Api => {
                debug!("Device `{}` ignored by the api backend", config.device);
                ApiClient::new(config.api.key.clone(), config.api.endpoint.clone(), model)
                    .map(Self::Api)
            }
        };

        provider.map_err(init_error)
    }
}

impl EmbeddingProvider for Provider {
    fn model_id(&self) -> &str {
        match self {
            #[cfg(feature = "local")]
            Self::Local(model) => model.model_id(),
            Self::Api(client) => client.model_id(),
        }
    }

    fn dimension(&self) -> usize {
        match self {
            #[cfg(feature = "local")]
            Self::Local(model) => model.dimension(),
            Self::Api(client) => client.dimension(),
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        match self {
            #[cfg(feature = "local")]
            Self::Local(model) => model.embed(text).await,
            Self::Api(client) => client.embed(text).await,
        }
    }
}
