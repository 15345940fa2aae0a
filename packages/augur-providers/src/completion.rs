use reqwest::Client;
use serde_json::Value;

use augur_config::{ApiType, LlmProviderConfig};

use crate::{Error, Result};

/// Runs one chat completion and returns the text of the first choice.
pub async fn complete(client: &Client, cfg: &LlmProviderConfig, messages: &[Value]) -> Result<String> {
	let url = crate::model_url(
		cfg.api_type,
		&cfg.api_base,
		cfg.api_version.as_deref(),
		&cfg.model,
		"chat/completions",
	)?;
	let mut body = serde_json::json!({
		"messages": messages,
		"temperature": cfg.temperature,
		"max_tokens": cfg.max_tokens,
	});

	if cfg.api_type == ApiType::OpenAi {
		body["model"] = Value::String(cfg.model.clone());
	}

	let res = client
		.post(url)
		.headers(crate::auth_headers(cfg.api_type, &cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = crate::ensure_success(res).await?.json().await?;

	parse_completion_response(&json)
}

fn parse_completion_response(json: &Value) -> Result<String> {
	json.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.map(str::to_string)
		.ok_or_else(|| Error::InvalidResponse {
			message: "Completion response is missing choices[0].message.content.".to_string(),
		})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_first_choice_content() {
		let json = serde_json::json!({
			"choices": [
				{ "index": 0, "message": { "role": "assistant", "content": "Paris." } },
				{ "index": 1, "message": { "role": "assistant", "content": "Lyon." } }
			]
		});

		assert_eq!(parse_completion_response(&json).expect("parse failed"), "Paris.");
	}

	#[test]
	fn empty_choices_are_invalid() {
		let json = serde_json::json!({ "choices": [] });
		let err = parse_completion_response(&json).expect_err("Expected invalid response.");

		assert!(matches!(err, Error::InvalidResponse { .. }));
	}
}
