use std::env;

use serde_json::Map;

use crate::{
	Error, Result,
	types::{
		Answers, ApiType, Config, ContextFieldMode, EmbeddingProviderConfig, Forward,
		LlmProviderConfig, Providers, Search, Service,
	},
};

const DEFAULT_HTTP_BIND: &str = "127.0.0.1:8080";

/// Builds the configuration from the process environment.
pub fn from_env() -> Result<Config> {
	from_env_with(|name| env::var(name).ok())
}

/// Builds the configuration from an arbitrary variable lookup.
///
/// Variable names follow the Azure Functions deployment this proxy is usually hosted next to:
/// `SEARCHSERVICE_*` for the search backend and `OPENAI_API_*` for the model backends.
/// `AUGUR_HTTP_BIND` and `AUGUR_LOG_LEVEL` are optional.
pub fn from_env_with<F>(lookup: F) -> Result<Config>
where
	F: Fn(&str) -> Option<String>,
{
	let required = |name: &'static str| -> Result<String> {
		lookup(name).filter(|value| !value.trim().is_empty()).ok_or(Error::MissingEnv { name })
	};
	let service_name = required("SEARCHSERVICE_NAME")?;
	let content_fields = required("SEARCHSERVICE_FIELD_CONTENT")?
		.split(',')
		.map(|field| field.trim().to_string())
		.collect();
	let key_field = required("SEARCHSERVICE_FIELD_KEY")?;
	let score_threshold = parse::<f64>(
		"SEARCHSERVICE_SCORE_THRESHOLD",
		&required("SEARCHSERVICE_SCORE_THRESHOLD")?,
	)?;
	let max_results =
		parse::<usize>("SEARCHSERVICE_MAX_NO_RESULTS", &required("SEARCHSERVICE_MAX_NO_RESULTS")?)?;
	let api_key = required("OPENAI_API_KEY")?;
	let api_type = required("OPENAI_API_TYPE")?
		.parse::<ApiType>()
		.map_err(|message| Error::InvalidEnv { name: "OPENAI_API_TYPE", message })?;
	let api_base = required("OPENAI_API_BASE")?;
	let api_version = required("OPENAI_API_VERSION")?;
	let model = required("OPENAI_API_DEFAULT_MODEL")?;
	let system_message = required("OPENAI_API_SYSTEM_MESSAGE")?;
	let embedding_model = required("OPENAI_API_EMBEDDING_MODEL")?;
	let endpoint = if service_name.starts_with("http://") || service_name.starts_with("https://") {
		service_name
	} else {
		format!("https://{service_name}.search.windows.net")
	};
	let mut cfg = Config {
		service: Service {
			http_bind: lookup("AUGUR_HTTP_BIND").unwrap_or_else(|| DEFAULT_HTTP_BIND.to_string()),
			log_level: lookup("AUGUR_LOG_LEVEL").unwrap_or_else(crate::types::default_log_level),
		},
		search: Search {
			endpoint,
			api_version: crate::types::default_search_api_version(),
			content_fields,
			key_field,
			semantic_answers_mode: crate::types::default_semantic_answers_mode(),
			opt_out_sentinel: crate::types::default_opt_out_sentinel(),
			timeout_ms: None,
		},
		answers: Answers {
			score_field: crate::types::default_score_field(),
			score_threshold,
			max_results,
			field_mode: ContextFieldMode::default(),
			system_message,
		},
		forward: Forward::default(),
		providers: Providers {
			llm: LlmProviderConfig {
				api_type,
				api_base: api_base.clone(),
				api_key: api_key.clone(),
				api_version: Some(api_version.clone()),
				model,
				temperature: crate::types::default_temperature(),
				max_tokens: crate::types::default_max_tokens(),
				timeout_ms: None,
				default_headers: Map::new(),
			},
			embedding: EmbeddingProviderConfig {
				api_type,
				api_base,
				api_key,
				api_version: Some(api_version),
				model: embedding_model,
				timeout_ms: None,
				default_headers: Map::new(),
			},
		},
	};

	crate::normalize(&mut cfg);
	crate::validate(&cfg)?;

	Ok(cfg)
}

fn parse<T>(name: &'static str, raw: &str) -> Result<T>
where
	T: std::str::FromStr,
	T::Err: std::fmt::Display,
{
	raw.trim().parse::<T>().map_err(|err| Error::InvalidEnv { name, message: err.to_string() })
}
