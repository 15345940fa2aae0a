use serde_json::{Value, json};

use augur_config::LlmProviderConfig;

use crate::CompletionProvider;

/// Builds the system, sources and question messages sent to the completion backend.
pub fn build_messages(system_message: &str, question: &str, context: &str) -> Vec<Value> {
	vec![
		json!({ "role": "system", "content": system_message }),
		json!({ "role": "user", "content": format!("### SOURCES:\n{context}") }),
		json!({ "role": "user", "content": format!("### QUESTION:\n{question}") }),
	]
}

/// Generates an answer to `question` grounded in `context`.
///
/// Returns an empty string without calling the backend when `context` is empty. Backend
/// failures are logged and also yield an empty string, so a failed generation never fails
/// the search it decorates.
pub async fn synthesize(
	completion: &dyn CompletionProvider,
	cfg: &LlmProviderConfig,
	system_message: &str,
	question: &str,
	context: &str,
) -> String {
	if context.is_empty() {
		return String::new();
	}

	let messages = build_messages(system_message, question, context);

	match completion.complete(cfg, &messages).await {
		Ok(answer) => answer,
		Err(err) => {
			tracing::warn!(error = %err, model = %cfg.model, "Answer generation failed.");

			String::new()
		},
	}
}
