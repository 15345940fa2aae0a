use reqwest::Client;
use serde_json::Value;

use augur_config::{ApiType, EmbeddingProviderConfig};

use crate::{Error, Result};

/// Embeds `texts` in one request; vectors come back in input order.
pub async fn embed(
	client: &Client,
	cfg: &EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f64>>> {
	let url = crate::model_url(
		cfg.api_type,
		&cfg.api_base,
		cfg.api_version.as_deref(),
		&cfg.model,
		"embeddings",
	)?;
	let mut body = serde_json::json!({ "input": texts });

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
	let vectors = parse_embedding_response(json)?;

	if vectors.len() != texts.len() {
		return Err(Error::InvalidResponse {
			message: format!(
				"Embedding response holds {} vectors for {} inputs.",
				vectors.len(),
				texts.len()
			),
		});
	}

	Ok(vectors)
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f64>>> {
	let data = json.get("data").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Embedding response is missing data array.".to_string() }
	})?;
	let mut indexed: Vec<(usize, Vec<f64>)> = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item.get("embedding").and_then(|v| v.as_array()).ok_or_else(|| {
			Error::InvalidResponse { message: "Embedding item missing embedding array.".to_string() }
		})?;
		let vector = embedding
			.iter()
			.map(|value| {
				value.as_f64().ok_or_else(|| Error::InvalidResponse {
					message: "Embedding value must be numeric.".to_string(),
				})
			})
			.collect::<Result<Vec<_>>>()?;

		indexed.push((index, vector));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
}
