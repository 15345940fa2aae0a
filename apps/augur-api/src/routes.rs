use axum::{
	Json, Router,
	body::{self, Body},
	extract::{Request, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::get,
};
use serde::Serialize;

use augur_domain::{
	header::HeaderSet,
	proxy::{ProxyRequest, ProxyResponse},
};
use augur_service::Error as ServiceError;

use crate::state::AppState;

/// Largest request body accepted; matches the search service's own batch limit.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Headers the HTTP layer recomputes itself and never copies from upstream.
const CONNECTION_HEADERS: [&str; 4] = ["content-length", "transfer-encoding", "connection", "keep-alive"];

pub fn router(state: AppState) -> Router {
	Router::new().route("/health", get(health)).fallback(proxy).with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn proxy(State(state): State<AppState>, request: Request) -> Result<Response, ApiError> {
	let (parts, body) = request.into_parts();
	let body = body::to_bytes(body, MAX_BODY_BYTES).await.map_err(|err| {
		json_error(StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", err.to_string(), None)
	})?;
	let headers = parts
		.headers
		.iter()
		.filter_map(|(name, value)| {
			value.to_str().ok().map(|value| (name.as_str().to_string(), value.to_string()))
		})
		.collect::<HeaderSet>();
	let request = ProxyRequest {
		method: parts.method.as_str().to_string(),
		path: parts.uri.path().to_string(),
		query: parts.uri.query().map(str::to_string),
		headers,
		body: body.to_vec(),
	};
	let response = state.service.dispatch(request).await.inspect_err(|err| {
		tracing::warn!(error = %err, "Proxy request failed.");
	})?;

	into_http_response(response)
}

fn into_http_response(response: ProxyResponse) -> Result<Response, ApiError> {
	let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
	let mut builder = Response::builder().status(status);

	for (name, value) in response.headers.iter() {
		if CONNECTION_HEADERS.iter().any(|header| name.eq_ignore_ascii_case(header)) {
			continue;
		}

		builder = builder.header(name, value);
	}

	builder.body(Body::from(response.body)).map_err(|err| {
		json_error(StatusCode::BAD_GATEWAY, "invalid_upstream_response", err.to_string(), None)
	})
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let message = err.to_string();

		match err {
			ServiceError::Upstream { status, .. } => json_error(
				status.and_then(|s| StatusCode::from_u16(s).ok()).unwrap_or(StatusCode::BAD_GATEWAY),
				"upstream_error",
				message,
				None,
			),
			ServiceError::Validation { fields, .. } =>
				json_error(StatusCode::BAD_REQUEST, "validation_error", message, Some(fields)),
			ServiceError::MissingField { field, .. } =>
				json_error(StatusCode::BAD_REQUEST, "missing_field", message, Some(vec![field])),
			ServiceError::InvalidRequest { .. } =>
				json_error(StatusCode::BAD_REQUEST, "invalid_request", message, None),
			ServiceError::EmbeddingBackend { .. } =>
				json_error(StatusCode::BAD_GATEWAY, "embedding_backend_error", message, None),
			ServiceError::SerdeJson(_) =>
				json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message, None),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}
