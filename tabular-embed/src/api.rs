//! # API module
//!
//! Remote embedding over an OpenAI-compatible `/embeddings` endpoint. Defaults to SiliconFlow.

use super::{EmbeddingProvider, Model, ProviderError};
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize};

/// A client for an embeddings API.
pub struct ApiClient {
    client: Client,
    endpoint: String,
    model: Model,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    encoding_format: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl ApiClient {
    /// Create a client authenticating with `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Unavailable`](ProviderError::Unavailable) if the key is empty or not a valid header value, or a [request error](ProviderError::Request) if the HTTP client cannot be built.
    pub fn new(key: String, endpoint: String, model: Model) -> Result<Self, ProviderError> {
        if key.is_empty() {
            return Err(ProviderError::Unavailable(
                "no API key configured for the api backend".to_owned(),
            ));
        }
        let mut auth = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|_| {
            ProviderError::Unavailable("API key contains invalid characters".to_owned())
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            endpoint,
            model,
        })
    }
}

impl EmbeddingProvider for ApiClient {
    fn model_id(&self) -> &str {
        self.model.id()
    }

    fn dimension(&self) -> usize {
        self.model.dimension()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let request = EmbeddingRequest {
            model: self.model.id(),
            input: text,
            encoding_format: "float",
        };
        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let response: EmbeddingResponse = response.json().await?;
        response
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or(ProviderError::EmptyResponse)
    }
}
