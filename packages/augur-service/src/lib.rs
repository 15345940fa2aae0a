pub mod dispatch;
pub mod enrich;
pub mod synthesize;

mod error;

pub use dispatch::Route;
pub use error::{Error, Result};

use std::{future::Future, pin::Pin, sync::Arc};

use reqwest::Client;
use serde_json::Value;

use augur_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use augur_domain::proxy::{ProxyRequest, ProxyResponse};
use augur_providers::{completion, embedding, search::SearchClient};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The search service as seen by the dispatcher.
pub trait SearchBackend
where
	Self: Send + Sync,
{
	fn forward<'a>(
		&'a self,
		request: &'a ProxyRequest,
	) -> BoxFuture<'a, augur_providers::Result<ProxyResponse>>;

	fn index_fields<'a>(
		&'a self,
		index: &'a str,
		api_key: Option<&'a str>,
	) -> BoxFuture<'a, augur_providers::Result<Vec<String>>>;
}

pub trait CompletionProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, augur_providers::Result<String>>;
}

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, augur_providers::Result<Vec<f64>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub search: Arc<dyn SearchBackend>,
	pub completion: Arc<dyn CompletionProvider>,
	pub embedding: Arc<dyn EmbeddingProvider>,
}
impl Providers {
	pub fn new(
		search: Arc<dyn SearchBackend>,
		completion: Arc<dyn CompletionProvider>,
		embedding: Arc<dyn EmbeddingProvider>,
	) -> Self {
		Self { search, completion, embedding }
	}

	/// HTTP backed providers built from `cfg`.
	pub fn http(cfg: &Config) -> augur_providers::Result<Self> {
		let search = Arc::new(SearchClient::new(&cfg.search)?);
		let models = Arc::new(HttpModels {
			llm: augur_providers::build_client(cfg.providers.llm.timeout_ms)?,
			embedding: augur_providers::build_client(cfg.providers.embedding.timeout_ms)?,
		});

		Ok(Self { search, completion: models.clone(), embedding: models })
	}
}

pub struct AugurService {
	pub cfg: Config,
	pub providers: Providers,
}
impl AugurService {
	pub fn new(cfg: Config) -> Result<Self> {
		let providers = Providers::http(&cfg)?;

		Ok(Self { cfg, providers })
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		Self { cfg, providers }
	}
}

struct HttpModels {
	llm: Client,
	embedding: Client,
}

impl SearchBackend for SearchClient {
	fn forward<'a>(
		&'a self,
		request: &'a ProxyRequest,
	) -> BoxFuture<'a, augur_providers::Result<ProxyResponse>> {
		Box::pin(SearchClient::forward(self, request))
	}

	fn index_fields<'a>(
		&'a self,
		index: &'a str,
		api_key: Option<&'a str>,
	) -> BoxFuture<'a, augur_providers::Result<Vec<String>>> {
		Box::pin(SearchClient::index_fields(self, index, api_key))
	}
}

impl CompletionProvider for HttpModels {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, augur_providers::Result<String>> {
		Box::pin(completion::complete(&self.llm, cfg, messages))
	}
}

impl EmbeddingProvider for HttpModels {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, augur_providers::Result<Vec<f64>>> {
		Box::pin(async move {
			let inputs = [text.to_string()];
			let mut vectors = embedding::embed(&self.embedding, cfg, &inputs).await?;

			vectors.pop().ok_or_else(|| augur_providers::Error::InvalidResponse {
				message: "Embedding response holds no vector.".to_string(),
			})
		})
	}
}
