use serde_json::Value;

use augur_config::EmbeddingProviderConfig;
use augur_domain::text;

use crate::{EmbeddingProvider, Error, Result};

/// Name of the vector field that holds the embedding of `field`.
pub fn vector_field(field: &str) -> String {
	format!("{field}_vector")
}

/// Attaches a `{field}_vector` embedding for every content field of every document.
///
/// The batch is all-or-nothing: the first failure aborts and no document is returned.
pub async fn enrich(
	embedding: &dyn EmbeddingProvider,
	cfg: &EmbeddingProviderConfig,
	documents: Vec<Value>,
	content_fields: &[String],
) -> Result<Vec<Value>> {
	let mut enriched = Vec::with_capacity(documents.len());

	for (position, document) in documents.into_iter().enumerate() {
		let Value::Object(mut fields) = document else {
			return Err(Error::InvalidRequest {
				message: format!("Document {position} is not a JSON object."),
			});
		};

		for field in content_fields {
			let normalized = match fields.get(field) {
				Some(Value::String(raw)) => text::normalize(raw),
				None | Some(Value::Null) => {
					return Err(Error::MissingField {
						field: field.clone(),
						message: format!("Field {field} is missing from document {position}."),
					});
				},
				Some(other) => text::normalize(&other.to_string()),
			};
			let vector = embedding.embed(cfg, &normalized).await.map_err(|err| {
				Error::EmbeddingBackend {
					message: format!("Embedding {field} of document {position} failed: {err}"),
				}
			})?;

			fields.insert(vector_field(field), Value::Array(vector.into_iter().map(Value::from).collect()));
		}

		enriched.push(Value::Object(fields));
	}

	tracing::debug!(documents = enriched.len(), fields = content_fields.len(), "Documents enriched.");

	Ok(enriched)
}
