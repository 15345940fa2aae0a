use serde_json::{Map, Value, json};
use tracing::Instrument;
use uuid::Uuid;

use augur_domain::{
	context::{self, ContextOptions},
	proxy::{ProxyRequest, ProxyResponse},
};

use crate::{AugurService, Error, Result, enrich, synthesize};

/// `key` of the synthetic entry written into `@search.answers`.
pub const ANSWER_KEY: &str = "openai";
pub const ANSWERS_FIELD: &str = "@search.answers";

/// Request body fields consumed here and never sent to the search service.
const MIDDLEWARE_FIELDS: [&str; 2] = ["contentField", "keyField"];

/// How one inbound request is handled.
#[derive(Debug, PartialEq)]
pub enum Route {
	/// Forwarded as received.
	PassThrough,
	/// Search whose results get a generated answer.
	SemanticSearch { index: String, body: Map<String, Value> },
	/// Document batch that gets embedding vectors before it is indexed.
	VectorIndex { index: String, body: Map<String, Value> },
}

/// Classifies `request` by method, path and payload shape.
///
/// Searches engage augmentation only when `answers` is present and differs from
/// `opt_out_sentinel`; an absent `answers` counts as the sentinel.
pub fn classify(request: &ProxyRequest, opt_out_sentinel: &str) -> Route {
	if !request.method.eq_ignore_ascii_case("POST") {
		return Route::PassThrough;
	}

	let Some((index, operation)) = docs_operation(&request.path) else {
		return Route::PassThrough;
	};
	let Ok(Value::Object(body)) = serde_json::from_slice::<Value>(&request.body) else {
		return Route::PassThrough;
	};
	let index = index.to_string();

	match operation {
		"search" => {
			let opted_out = match body.get("answers") {
				None | Some(Value::Null) => true,
				Some(Value::String(answers)) => answers == opt_out_sentinel,
				Some(_) => false,
			};

			if opted_out { Route::PassThrough } else { Route::SemanticSearch { index, body } }
		},
		"index" => Route::VectorIndex { index, body },
		_ => Route::PassThrough,
	}
}

impl AugurService {
	/// Handles one proxied request end to end.
	pub async fn dispatch(&self, request: ProxyRequest) -> Result<ProxyResponse> {
		let span = tracing::info_span!(
			"proxy",
			request_id = %Uuid::new_v4(),
			method = %request.method,
			path = %request.path,
		);

		self.dispatch_inner(request).instrument(span).await
	}

	async fn dispatch_inner(&self, request: ProxyRequest) -> Result<ProxyResponse> {
		match classify(&request, &self.cfg.search.opt_out_sentinel) {
			Route::PassThrough => {
				tracing::debug!("Passing request through.");

				self.pass_through(&request).await
			},
			Route::VectorIndex { index, body } => {
				tracing::info!(%index, "Enriching documents before indexing.");

				self.index_documents(&request, &index, body).await
			},
			Route::SemanticSearch { index, body } => {
				tracing::info!(%index, "Searching with generated answer.");

				self.search_with_answer(&request, body).await
			},
		}
	}

	pub async fn pass_through(&self, request: &ProxyRequest) -> Result<ProxyResponse> {
		let forwarded = self.forwarded(request, None)?;
		let response = self.providers.search.forward(&forwarded).await?;

		Ok(self.strip_response_headers(response))
	}

	pub async fn index_documents(
		&self,
		request: &ProxyRequest,
		index: &str,
		mut body: Map<String, Value>,
	) -> Result<ProxyResponse> {
		let content_fields = self.content_fields(&body)?;
		let defined = self.providers.search.index_fields(index, request.headers.get("api-key")).await?;
		let missing: Vec<String> = content_fields
			.iter()
			.map(|field| enrich::vector_field(field))
			.filter(|field| !defined.contains(field))
			.collect();

		if !missing.is_empty() {
			return Err(Error::Validation {
				message: format!("Index {index} is missing vector fields {}.", missing.join(", ")),
				fields: missing,
			});
		}

		let documents = match body.get_mut("value").map(Value::take) {
			Some(Value::Array(documents)) => documents,
			None | Some(Value::Null) => Vec::new(),
			Some(_) => {
				return Err(Error::InvalidRequest {
					message: "value must be an array of documents.".to_string(),
				});
			},
		};
		let enriched = enrich::enrich(
			self.providers.embedding.as_ref(),
			&self.cfg.providers.embedding,
			documents,
			&content_fields,
		)
		.await?;

		body.insert("value".to_string(), Value::Array(enriched));
		strip_middleware_fields(&mut body);

		let forwarded = self.forwarded(request, Some(&body))?;
		let response = self.providers.search.forward(&forwarded).await?;

		Ok(self.strip_response_headers(response))
	}

	pub async fn search_with_answer(
		&self,
		request: &ProxyRequest,
		mut body: Map<String, Value>,
	) -> Result<ProxyResponse> {
		let content_fields = self.content_fields(&body)?;
		let key_field = self.key_field(&body)?;

		if content_fields.contains(&key_field) {
			return Err(Error::InvalidRequest {
				message: format!("keyField {key_field} must not be one of the content fields."),
			});
		}

		let question = body.get("search").and_then(Value::as_str).unwrap_or_default().to_string();

		body.insert(
			"answers".to_string(),
			Value::String(self.cfg.search.semantic_answers_mode.clone()),
		);
		strip_middleware_fields(&mut body);

		let forwarded = self.forwarded(request, Some(&body))?;
		let response = self.providers.search.forward(&forwarded).await?;

		if !response.is_success() {
			tracing::info!(status = response.status, "Search failed upstream; returning as-is.");

			return Ok(self.strip_response_headers(response));
		}

		let mut payload = match serde_json::from_slice::<Value>(&response.body) {
			Ok(payload @ Value::Object(_)) => payload,
			_ => {
				tracing::warn!("Search response is not a JSON object; skipping answer generation.");

				return Ok(self.strip_response_headers(response));
			},
		};
		let context = context::assemble(
			&payload,
			&content_fields,
			&key_field,
			&ContextOptions::from_config(&self.cfg.answers),
		)?;
		let answer = synthesize::synthesize(
			self.providers.completion.as_ref(),
			&self.cfg.providers.llm,
			&self.cfg.answers.system_message,
			&question,
			&context,
		)
		.await;

		tracing::debug!(context_chars = context.len(), answer_chars = answer.len(), "Answer ready.");

		payload[ANSWERS_FIELD] = json!([{
			"key": ANSWER_KEY,
			"text": answer,
			"highlights": answer,
			"score": 0,
		}]);

		let body = serde_json::to_vec(&payload)?;
		let response = ProxyResponse { body, ..response };

		Ok(self.strip_response_headers(response))
	}

	fn forwarded(
		&self,
		request: &ProxyRequest,
		body: Option<&Map<String, Value>>,
	) -> Result<ProxyRequest> {
		let body = match body {
			Some(body) => serde_json::to_vec(body)?,
			None => request.body.clone(),
		};

		Ok(ProxyRequest {
			method: request.method.clone(),
			path: request.path.clone(),
			query: request.query.clone(),
			headers: request.headers.keep_only(&self.cfg.forward.request_headers),
			body,
		})
	}

	fn strip_response_headers(&self, response: ProxyResponse) -> ProxyResponse {
		let headers = response.headers.without(&self.cfg.forward.stripped_response_headers);

		ProxyResponse { headers, ..response }
	}

	fn content_fields(&self, body: &Map<String, Value>) -> Result<Vec<String>> {
		match body.get("contentField") {
			None | Some(Value::Null) => Ok(self.cfg.search.content_fields.clone()),
			Some(Value::String(raw)) => {
				let fields: Vec<String> = raw
					.split(',')
					.map(str::trim)
					.filter(|field| !field.is_empty())
					.map(str::to_string)
					.collect();

				if fields.is_empty() {
					return Err(Error::InvalidRequest {
						message: "contentField must name at least one field.".to_string(),
					});
				}

				Ok(fields)
			},
			Some(_) => Err(Error::InvalidRequest {
				message: "contentField must be a comma-separated string.".to_string(),
			}),
		}
	}

	fn key_field(&self, body: &Map<String, Value>) -> Result<String> {
		match body.get("keyField") {
			None | Some(Value::Null) => Ok(self.cfg.search.key_field.clone()),
			Some(Value::String(raw)) if !raw.trim().is_empty() => Ok(raw.trim().to_string()),
			Some(_) => Err(Error::InvalidRequest {
				message: "keyField must be a non-empty string.".to_string(),
			}),
		}
	}
}

fn docs_operation(path: &str) -> Option<(&str, &str)> {
	let mut segments = path.trim_matches('/').split('/');

	match (segments.next(), segments.next(), segments.next(), segments.next(), segments.next()) {
		(Some("indexes"), Some(index), Some("docs"), Some(operation), None) if !index.is_empty() =>
			Some((index, operation)),
		_ => None,
	}
}

fn strip_middleware_fields(body: &mut Map<String, Value>) {
	for field in MIDDLEWARE_FIELDS {
		body.shift_remove(field);
	}
}
