use reqwest::{
	Client, Method,
	header::{CONTENT_TYPE, HeaderValue},
};
use serde_json::Value;

use augur_config::Search;
use augur_domain::{
	header::HeaderSet,
	proxy::{ProxyRequest, ProxyResponse},
};

use crate::{Error, Result};

/// Client for the search service REST API.
#[derive(Clone, Debug)]
pub struct SearchClient {
	client: Client,
	endpoint: String,
	api_version: String,
}
impl SearchClient {
	pub fn new(cfg: &Search) -> Result<Self> {
		Ok(Self {
			client: crate::build_client(cfg.timeout_ms)?,
			endpoint: cfg.endpoint.clone(),
			api_version: cfg.api_version.clone(),
		})
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	/// Sends `request` to the same path on the search service and returns its answer as-is,
	/// whatever the status.
	pub async fn forward(&self, request: &ProxyRequest) -> Result<ProxyResponse> {
		let url = forward_url(&self.endpoint, &request.path, request.query.as_deref());
		let method = Method::from_bytes(request.method.as_bytes()).map_err(|_| {
			Error::InvalidRequest { message: format!("Invalid HTTP method {:?}.", request.method) }
		})?;
		let mut builder = self.client.request(method, &url);

		for (name, value) in request.headers.iter() {
			builder = builder.header(name, value);
		}

		if !request.body.is_empty() {
			// The search REST API only accepts JSON bodies.
			if !request.headers.iter().any(|(name, _)| name.eq_ignore_ascii_case("content-type")) {
				builder = builder.header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
			}

			builder = builder.body(request.body.clone());
		}

		tracing::debug!(%url, method = %request.method, "Forwarding request to search service.");

		let res = builder.send().await?;
		let status = res.status().as_u16();
		let headers = res
			.headers()
			.iter()
			.map(|(name, value)| {
				(name.as_str().to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned())
			})
			.collect::<HeaderSet>();
		let body = res.bytes().await?.to_vec();

		Ok(ProxyResponse { status, headers, body })
	}

	/// Names of every field defined on `index`.
	pub async fn index_fields(&self, index: &str, api_key: Option<&str>) -> Result<Vec<String>> {
		let url = format!("{}/indexes/{index}?api-version={}", self.endpoint, self.api_version);
		let mut builder = self.client.get(url);

		if let Some(api_key) = api_key {
			builder = builder.header("api-key", api_key);
		}

		let res = crate::ensure_success(builder.send().await?).await?;
		let json: Value = res.json().await?;

		parse_index_fields(&json)
	}
}

pub fn forward_url(endpoint: &str, path: &str, query: Option<&str>) -> String {
	match query.filter(|query| !query.is_empty()) {
		Some(query) => format!("{endpoint}{path}?{query}"),
		None => format!("{endpoint}{path}"),
	}
}

fn parse_index_fields(json: &Value) -> Result<Vec<String>> {
	let fields = json.get("fields").and_then(Value::as_array).ok_or_else(|| {
		Error::InvalidResponse { message: "Index definition is missing fields array.".to_string() }
	})?;

	Ok(fields
		.iter()
		.filter_map(|field| field.get("name").and_then(Value::as_str))
		.map(str::to_string)
		.collect())
}
