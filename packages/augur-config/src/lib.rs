mod env;
mod error;
mod types;

pub use env::{from_env, from_env_with};
pub use error::{Error, Result};
pub use types::{
	Answers, ApiType, Config, ContextFieldMode, DEFAULT_SCORE_FIELD, DEFAULT_SEARCH_API_VERSION,
	EmbeddingProviderConfig, Forward, LlmProviderConfig, Providers, Search, Service,
	default_request_headers, default_stripped_response_headers,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}

	let endpoint = cfg.search.endpoint.as_str();

	if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
		return Err(Error::Validation {
			message: "search.endpoint must be an http or https URL.".to_string(),
		});
	}
	if cfg.search.content_fields.is_empty() {
		return Err(Error::Validation {
			message: "search.content_fields must be non-empty.".to_string(),
		});
	}
	if cfg.search.content_fields.iter().any(|field| field.is_empty()) {
		return Err(Error::Validation {
			message: "search.content_fields must not contain empty names.".to_string(),
		});
	}
	if cfg.search.key_field.trim().is_empty() {
		return Err(Error::Validation {
			message: "search.key_field must be non-empty.".to_string(),
		});
	}
	if cfg.search.content_fields.contains(&cfg.search.key_field) {
		return Err(Error::Validation {
			message: "search.content_fields must not contain search.key_field.".to_string(),
		});
	}
	if cfg.search.semantic_answers_mode.trim().is_empty() {
		return Err(Error::Validation {
			message: "search.semantic_answers_mode must be non-empty.".to_string(),
		});
	}
	if cfg.search.opt_out_sentinel == cfg.search.semantic_answers_mode {
		return Err(Error::Validation {
			message: "search.opt_out_sentinel must differ from search.semantic_answers_mode."
				.to_string(),
		});
	}
	if cfg.answers.score_field.trim().is_empty() {
		return Err(Error::Validation {
			message: "answers.score_field must be non-empty.".to_string(),
		});
	}
	if !cfg.answers.score_threshold.is_finite() {
		return Err(Error::Validation {
			message: "answers.score_threshold must be a finite number.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.answers.score_threshold) {
		return Err(Error::Validation {
			message: "answers.score_threshold must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.answers.max_results == 0 {
		return Err(Error::Validation {
			message: "answers.max_results must be greater than zero.".to_string(),
		});
	}

	let llm = &cfg.providers.llm;

	if !llm.temperature.is_finite() || !(0.0..=2.0).contains(&llm.temperature) {
		return Err(Error::Validation {
			message: "providers.llm.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}
	if llm.max_tokens == 0 {
		return Err(Error::Validation {
			message: "providers.llm.max_tokens must be greater than zero.".to_string(),
		});
	}

	for (label, api_type, api_base, api_key, api_version, model) in [
		(
			"llm",
			llm.api_type,
			&llm.api_base,
			&llm.api_key,
			llm.api_version.as_deref(),
			&llm.model,
		),
		(
			"embedding",
			cfg.providers.embedding.api_type,
			&cfg.providers.embedding.api_base,
			&cfg.providers.embedding.api_key,
			cfg.providers.embedding.api_version.as_deref(),
			&cfg.providers.embedding.model,
		),
	] {
		if api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_base must be non-empty."),
			});
		}
		if api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
		if model.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} model must be non-empty."),
			});
		}
		if api_type == ApiType::Azure && api_version.is_none() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_version is required for azure."),
			});
		}
	}

	Ok(())
}

pub(crate) fn normalize(cfg: &mut Config) {
	cfg.search.endpoint = cfg.search.endpoint.trim().trim_end_matches('/').to_string();
	cfg.search.key_field = cfg.search.key_field.trim().to_string();

	for field in &mut cfg.search.content_fields {
		*field = field.trim().to_string();
	}

	cfg.providers.llm.api_base = cfg.providers.llm.api_base.trim_end_matches('/').to_string();
	cfg.providers.embedding.api_base =
		cfg.providers.embedding.api_base.trim_end_matches('/').to_string();

	if cfg.providers.llm.api_version.as_deref().map(|v| v.trim().is_empty()).unwrap_or(false) {
		cfg.providers.llm.api_version = None;
	}
	if cfg
		.providers
		.embedding
		.api_version
		.as_deref()
		.map(|v| v.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.providers.embedding.api_version = None;
	}
}
