use serde_json::Value;

use augur_config::{Answers, ContextFieldMode, DEFAULT_SCORE_FIELD};

use crate::text;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
	#[error("Field {field} is missing from search result {rank}.")]
	MissingField { field: String, rank: usize },
}

#[derive(Clone, Debug)]
pub struct ContextOptions<'a> {
	pub score_field: &'a str,
	/// Ratio of the highest score a result must reach to survive.
	pub score_threshold: f64,
	pub max_results: usize,
	pub field_mode: ContextFieldMode,
}
impl<'a> ContextOptions<'a> {
	pub fn from_config(cfg: &'a Answers) -> Self {
		Self {
			score_field: &cfg.score_field,
			score_threshold: cfg.score_threshold,
			max_results: cfg.max_results,
			field_mode: cfg.field_mode,
		}
	}
}
impl Default for ContextOptions<'_> {
	fn default() -> Self {
		Self {
			score_field: DEFAULT_SCORE_FIELD,
			score_threshold: 0.0,
			max_results: usize::MAX,
			field_mode: ContextFieldMode::All,
		}
	}
}

/// Builds the prompt context from a search response payload.
///
/// Each surviving result becomes one `"{key}: {content}"` line. An empty string means the
/// payload held nothing usable.
pub fn assemble(
	payload: &Value,
	content_fields: &[String],
	key_field: &str,
	options: &ContextOptions<'_>,
) -> Result<String, ContextError> {
	let Some(results) = payload.get("value").and_then(Value::as_array) else {
		return Ok(String::new());
	};
	let selected = select_results(results, options);
	let mut lines = Vec::with_capacity(selected.len());

	for (rank, result) in selected.into_iter().enumerate() {
		let key = field_text(result, key_field, rank)?;
		let mut contents = Vec::with_capacity(content_fields.len());

		for field in content_fields {
			contents.push(text::normalize(&field_text(result, field, rank)?));
		}

		let content = match options.field_mode {
			ContextFieldMode::All => contents.join(" "),
			ContextFieldMode::Last => contents.pop().unwrap_or_default(),
		};

		lines.push(format!("{key}: {content}"));
	}

	Ok(lines.join("\n"))
}

/// Applies the relative score threshold and the result cap, keeping backend rank order.
///
/// A result without a numeric score never survives.
pub fn select_results<'a>(results: &'a [Value], options: &ContextOptions<'_>) -> Vec<&'a Value> {
	let scores: Vec<Option<f64>> =
		results.iter().map(|result| result.get(options.score_field).and_then(Value::as_f64)).collect();
	let Some(highest) = scores.iter().flatten().copied().reduce(f64::max) else {
		return Vec::new();
	};
	let threshold = highest * options.score_threshold;

	results
		.iter()
		.zip(scores)
		.filter(|(_, score)| score.is_some_and(|score| score >= threshold))
		.map(|(result, _)| result)
		.take(options.max_results)
		.collect()
}

fn field_text(result: &Value, field: &str, rank: usize) -> Result<String, ContextError> {
	match result.get(field) {
		None | Some(Value::Null) =>
			Err(ContextError::MissingField { field: field.to_string(), rank }),
		Some(Value::String(text)) => Ok(text.clone()),
		Some(other) => Ok(other.to_string()),
	}
}
