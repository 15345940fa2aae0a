//! In-process stand-ins for the search, completion and embedding backends.

use std::sync::{
	Arc, Mutex,
	atomic::{AtomicUsize, Ordering},
};

use serde_json::{Map, Value};

use augur_config::{
	Answers, ApiType, Config, ContextFieldMode, EmbeddingProviderConfig, Forward,
	LlmProviderConfig, Providers as ProviderConfigs, Search, Service,
};
use augur_domain::{
	header::HeaderSet,
	proxy::{ProxyRequest, ProxyResponse},
};
use augur_providers::Error;
use augur_service::{
	AugurService, BoxFuture, CompletionProvider, EmbeddingProvider, Providers, SearchBackend,
};

pub const SYSTEM_MESSAGE: &str = "Answer from the SOURCES only.";

pub fn test_config() -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		search: Search {
			endpoint: "http://127.0.0.1:1".to_string(),
			api_version: "2023-07-01-preview".to_string(),
			content_fields: vec!["content".to_string()],
			key_field: "id".to_string(),
			semantic_answers_mode: "semantic".to_string(),
			opt_out_sentinel: "openai".to_string(),
			timeout_ms: Some(1_000),
		},
		answers: Answers {
			score_field: "@search.rerankerScore".to_string(),
			score_threshold: 0.5,
			max_results: 3,
			field_mode: ContextFieldMode::All,
			system_message: SYSTEM_MESSAGE.to_string(),
		},
		forward: Forward::default(),
		providers: ProviderConfigs {
			llm: LlmProviderConfig {
				api_type: ApiType::OpenAi,
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				api_version: None,
				model: "test-chat".to_string(),
				temperature: 0.2,
				max_tokens: 300,
				timeout_ms: Some(1_000),
				default_headers: Map::new(),
			},
			embedding: EmbeddingProviderConfig {
				api_type: ApiType::OpenAi,
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				api_version: None,
				model: "test-embedding".to_string(),
				timeout_ms: Some(1_000),
				default_headers: Map::new(),
			},
		},
	}
}

/// Service wired to the given stubs.
pub fn service(
	cfg: Config,
	search: &Arc<StubSearch>,
	completion: &Arc<StubCompletion>,
	embedding: &Arc<StubEmbedding>,
) -> AugurService {
	let providers = Providers::new(search.clone(), completion.clone(), embedding.clone());

	AugurService::with_providers(cfg, providers)
}

pub fn json_response(status: u16, body: &Value) -> ProxyResponse {
	let mut headers = HeaderSet::new();

	headers.append("content-type", "application/json; charset=utf-8");
	headers.append("content-length", "999");
	headers.append("content-encoding", "gzip");
	headers.append("request-id", "upstream-1");

	ProxyResponse { status, headers, body: serde_json::to_vec(body).unwrap_or_default() }
}

/// Search backend that answers every forward with one canned response and records what it
/// was sent.
pub struct StubSearch {
	response: ProxyResponse,
	index_fields: Result<Vec<String>, u16>,
	forwarded: Mutex<Vec<ProxyRequest>>,
	index_lookups: AtomicUsize,
}
impl StubSearch {
	pub fn new(response: ProxyResponse) -> Self {
		Self {
			response,
			index_fields: Ok(Vec::new()),
			forwarded: Mutex::new(Vec::new()),
			index_lookups: AtomicUsize::new(0),
		}
	}

	pub fn with_index_fields(mut self, fields: &[&str]) -> Self {
		self.index_fields = Ok(fields.iter().map(|field| field.to_string()).collect());

		self
	}

	pub fn with_index_lookup_status(mut self, status: u16) -> Self {
		self.index_fields = Err(status);

		self
	}

	pub fn forwarded(&self) -> Vec<ProxyRequest> {
		self.forwarded.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn forwarded_json(&self, position: usize) -> Value {
		let forwarded = self.forwarded();

		serde_json::from_slice(&forwarded[position].body).unwrap_or(Value::Null)
	}

	pub fn forward_count(&self) -> usize {
		self.forwarded.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn index_lookups(&self) -> usize {
		self.index_lookups.load(Ordering::SeqCst)
	}
}
impl SearchBackend for StubSearch {
	fn forward<'a>(
		&'a self,
		request: &'a ProxyRequest,
	) -> BoxFuture<'a, augur_providers::Result<ProxyResponse>> {
		self.forwarded.lock().unwrap_or_else(|err| err.into_inner()).push(request.clone());

		let response = self.response.clone();

		Box::pin(async move { Ok(response) })
	}

	fn index_fields<'a>(
		&'a self,
		_index: &'a str,
		_api_key: Option<&'a str>,
	) -> BoxFuture<'a, augur_providers::Result<Vec<String>>> {
		self.index_lookups.fetch_add(1, Ordering::SeqCst);

		let result = self
			.index_fields
			.clone()
			.map_err(|status| Error::Status { status, body: "index lookup failed".to_string() });

		Box::pin(async move { result })
	}
}

/// Completion backend returning a fixed answer, or failing with a fixed status.
pub struct StubCompletion {
	answer: Result<String, u16>,
	calls: AtomicUsize,
	messages: Mutex<Vec<Vec<Value>>>,
}
impl StubCompletion {
	pub fn answering(answer: &str) -> Self {
		Self { answer: Ok(answer.to_string()), calls: AtomicUsize::new(0), messages: Mutex::new(Vec::new()) }
	}

	pub fn failing(status: u16) -> Self {
		Self { answer: Err(status), calls: AtomicUsize::new(0), messages: Mutex::new(Vec::new()) }
	}

	pub fn count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	/// Messages of every call, in call order.
	pub fn messages(&self) -> Vec<Vec<Value>> {
		self.messages.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl CompletionProvider for StubCompletion {
	fn complete<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, augur_providers::Result<String>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.messages.lock().unwrap_or_else(|err| err.into_inner()).push(messages.to_vec());

		let result = self
			.answer
			.clone()
			.map_err(|status| Error::Status { status, body: "completion failed".to_string() });

		Box::pin(async move { result })
	}
}

/// Embedding backend producing `[len, 1.0]` for each text, optionally failing on one input.
pub struct StubEmbedding {
	fail_on: Option<String>,
	inputs: Mutex<Vec<String>>,
}
impl StubEmbedding {
	pub fn new() -> Self {
		Self { fail_on: None, inputs: Mutex::new(Vec::new()) }
	}

	pub fn failing_on(text: &str) -> Self {
		Self { fail_on: Some(text.to_string()), inputs: Mutex::new(Vec::new()) }
	}

	pub fn inputs(&self) -> Vec<String> {
		self.inputs.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn count(&self) -> usize {
		self.inputs.lock().unwrap_or_else(|err| err.into_inner()).len()
	}
}
impl Default for StubEmbedding {
	fn default() -> Self {
		Self::new()
	}
}
impl EmbeddingProvider for StubEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, augur_providers::Result<Vec<f64>>> {
		self.inputs.lock().unwrap_or_else(|err| err.into_inner()).push(text.to_string());

		let result = if self.fail_on.as_deref() == Some(text) {
			Err(Error::Status { status: 429, body: "rate limited".to_string() })
		} else {
			Ok(vec![text.len() as f64, 1.0])
		};

		Box::pin(async move { result })
	}
}
