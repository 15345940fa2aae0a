pub mod completion;
pub mod embedding;
pub mod search;

mod error;

pub use error::{Error, Result};

use std::time::Duration;

use reqwest::{
	Client, Response,
	header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue},
};
use serde_json::{Map, Value};

use augur_config::ApiType;

/// Builds the authentication headers for a model provider.
///
/// Azure deployments expect the key in `api-key`; OpenAI expects a bearer token.
pub fn auth_headers(
	api_type: ApiType,
	api_key: &str,
	default_headers: &Map<String, Value>,
) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	match api_type {
		ApiType::Azure => {
			headers.insert(HeaderName::from_static("api-key"), HeaderValue::from_str(api_key)?);
		},
		ApiType::OpenAi => {
			headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);
		},
	}

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

/// URL of a model operation such as `chat/completions` or `embeddings`.
pub fn model_url(
	api_type: ApiType,
	api_base: &str,
	api_version: Option<&str>,
	model: &str,
	operation: &str,
) -> Result<String> {
	match api_type {
		ApiType::Azure => {
			let version = api_version.ok_or_else(|| Error::InvalidConfig {
				message: "Azure providers require api_version.".to_string(),
			})?;

			Ok(format!("{api_base}/openai/deployments/{model}/{operation}?api-version={version}"))
		},
		ApiType::OpenAi => Ok(format!("{api_base}/{operation}")),
	}
}

/// HTTP client shared by every call to one backend. Without `timeout_ms` reqwest's defaults
/// apply.
pub fn build_client(timeout_ms: Option<u64>) -> Result<Client> {
	let mut builder = Client::builder();

	if let Some(timeout_ms) = timeout_ms {
		builder = builder.timeout(Duration::from_millis(timeout_ms));
	}

	Ok(builder.build()?)
}

pub(crate) async fn ensure_success(res: Response) -> Result<Response> {
	let status = res.status();

	if status.is_success() {
		return Ok(res);
	}

	let body = res.text().await.unwrap_or_default();

	Err(Error::Status { status: status.as_u16(), body })
}
