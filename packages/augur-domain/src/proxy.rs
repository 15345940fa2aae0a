use crate::header::HeaderSet;

/// One request as received from the caller, or as rewritten before it is forwarded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProxyRequest {
	/// Upper-case HTTP method, e.g. `POST`.
	pub method: String,
	/// Path starting with `/`, without the query string.
	pub path: String,
	pub query: Option<String>,
	pub headers: HeaderSet,
	pub body: Vec<u8>,
}
impl ProxyRequest {
	pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
		Self { method: method.into(), path: path.into(), ..Default::default() }
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProxyResponse {
	pub status: u16,
	pub headers: HeaderSet,
	pub body: Vec<u8>,
}
impl ProxyResponse {
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}
