use std::{fmt, str::FromStr};

use serde::Deserialize;
use serde_json::{Map, Value};

pub const DEFAULT_SCORE_FIELD: &str = "@search.rerankerScore";
pub const DEFAULT_SEARCH_API_VERSION: &str = "2023-07-01-preview";

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub search: Search,
	pub answers: Answers,
	#[serde(default)]
	pub forward: Forward,
	pub providers: Providers,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Search {
	/// Base URL of the search service, e.g. `https://contoso.search.windows.net`.
	pub endpoint: String,
	/// Used for the index definition lookup; forwarded requests keep the caller's own query.
	#[serde(default = "default_search_api_version")]
	pub api_version: String,
	/// Default content fields when a request carries no `contentField`.
	pub content_fields: Vec<String>,
	/// Default key field when a request carries no `keyField`.
	pub key_field: String,
	/// Value written into `answers` before a search is forwarded for augmentation.
	#[serde(default = "default_semantic_answers_mode")]
	pub semantic_answers_mode: String,
	/// `answers` value (also assumed when the field is absent) that disables augmentation.
	#[serde(default = "default_opt_out_sentinel")]
	pub opt_out_sentinel: String,
	pub timeout_ms: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Answers {
	#[serde(default = "default_score_field")]
	pub score_field: String,
	/// Ratio of the highest score a result must reach to be used as context.
	pub score_threshold: f64,
	pub max_results: usize,
	#[serde(default)]
	pub field_mode: ContextFieldMode,
	pub system_message: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextFieldMode {
	/// Every content field contributes to a context line, joined by a space.
	#[default]
	All,
	/// Only the last content field contributes to a context line.
	Last,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Forward {
	#[serde(default = "default_request_headers")]
	pub request_headers: Vec<String>,
	#[serde(default = "default_stripped_response_headers")]
	pub stripped_response_headers: Vec<String>,
}
impl Default for Forward {
	fn default() -> Self {
		Self {
			request_headers: default_request_headers(),
			stripped_response_headers: default_stripped_response_headers(),
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct Providers {
	pub llm: LlmProviderConfig,
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum ApiType {
	#[serde(rename = "azure")]
	Azure,
	#[serde(rename = "openai", alias = "open_ai")]
	OpenAi,
}
impl FromStr for ApiType {
	type Err = String;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"azure" | "azure_ad" => Ok(Self::Azure),
			"openai" | "open_ai" => Ok(Self::OpenAi),
			other => Err(format!("unknown api type {other:?}; expected azure or openai")),
		}
	}
}
impl fmt::Display for ApiType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Azure => f.write_str("azure"),
			Self::OpenAi => f.write_str("openai"),
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub api_type: ApiType,
	pub api_base: String,
	pub api_key: String,
	pub api_version: Option<String>,
	/// Model name, or deployment name when `api_type` is `azure`.
	pub model: String,
	#[serde(default = "default_temperature")]
	pub temperature: f32,
	#[serde(default = "default_max_tokens")]
	pub max_tokens: u32,
	pub timeout_ms: Option<u64>,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub api_type: ApiType,
	pub api_base: String,
	pub api_key: String,
	pub api_version: Option<String>,
	pub model: String,
	pub timeout_ms: Option<u64>,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

/// Header names as the HTTP stack hands them over, which is always lowercase.
pub fn default_request_headers() -> Vec<String> {
	vec!["api-key".to_string(), "content-type".to_string()]
}

pub fn default_stripped_response_headers() -> Vec<String> {
	vec!["content-length".to_string(), "content-encoding".to_string()]
}

pub(crate) fn default_log_level() -> String {
	"info".to_string()
}

pub(crate) fn default_search_api_version() -> String {
	DEFAULT_SEARCH_API_VERSION.to_string()
}

pub(crate) fn default_semantic_answers_mode() -> String {
	"semantic".to_string()
}

pub(crate) fn default_opt_out_sentinel() -> String {
	"openai".to_string()
}

pub(crate) fn default_score_field() -> String {
	DEFAULT_SCORE_FIELD.to_string()
}

pub(crate) fn default_temperature() -> f32 {
	0.2
}

pub(crate) fn default_max_tokens() -> u32 {
	300
}
