use augur_domain::context::ContextError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Upstream error: {message}")]
	Upstream { status: Option<u16>, message: String },
	#[error("Validation error: {message}")]
	Validation { message: String, fields: Vec<String> },
	#[error("{message}")]
	MissingField { field: String, message: String },
	#[error("Embedding backend error: {message}")]
	EmbeddingBackend { message: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
}
impl From<augur_providers::Error> for Error {
	fn from(err: augur_providers::Error) -> Self {
		Self::Upstream { status: err.status(), message: err.to_string() }
	}
}

impl From<ContextError> for Error {
	fn from(err: ContextError) -> Self {
		match &err {
			ContextError::MissingField { field, .. } =>
				Self::MissingField { field: field.clone(), message: err.to_string() },
		}
	}
}
