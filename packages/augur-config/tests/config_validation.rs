use std::{
	collections::HashMap,
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use augur_config::{ApiType, Config, ContextFieldMode, Error};

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn sample_toml_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let mut table = root.as_table_mut().expect("Sample config must be a table.");

	for part in section.split('.') {
		table = table
			.get_mut(part)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Sample config must include [{section}]."));
	}

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render sample config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("augur_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_str(payload: String) -> augur_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = augur_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn base_config() -> Config {
	load_str(SAMPLE_CONFIG_TOML.to_string()).expect("Sample config must load.")
}

fn sample_env() -> HashMap<&'static str, String> {
	HashMap::from([
		("SEARCHSERVICE_NAME", "contoso".to_string()),
		("SEARCHSERVICE_FIELD_CONTENT", "content, summary".to_string()),
		("SEARCHSERVICE_FIELD_KEY", "id".to_string()),
		("SEARCHSERVICE_SCORE_THRESHOLD", "0.4".to_string()),
		("SEARCHSERVICE_MAX_NO_RESULTS", "3".to_string()),
		("OPENAI_API_KEY", "secret".to_string()),
		("OPENAI_API_TYPE", "azure".to_string()),
		("OPENAI_API_BASE", "https://contoso.openai.azure.com/".to_string()),
		("OPENAI_API_VERSION", "2023-05-15".to_string()),
		("OPENAI_API_DEFAULT_MODEL", "gpt-35-turbo".to_string()),
		("OPENAI_API_SYSTEM_MESSAGE", "Be brief.".to_string()),
		("OPENAI_API_EMBEDDING_MODEL", "text-embedding-ada-002".to_string()),
	])
}

#[test]
fn sample_config_loads_with_defaults() {
	let cfg = base_config();

	assert_eq!(cfg.search.endpoint, "https://contoso.search.windows.net");
	assert_eq!(cfg.search.semantic_answers_mode, "semantic");
	assert_eq!(cfg.search.opt_out_sentinel, "openai");
	assert_eq!(cfg.answers.score_field, "@search.rerankerScore");
	assert_eq!(cfg.answers.field_mode, ContextFieldMode::All);
	assert_eq!(cfg.providers.llm.api_base, "https://contoso.openai.azure.com");
	assert_eq!(cfg.providers.llm.temperature, 0.2);
	assert_eq!(cfg.providers.llm.max_tokens, 300);
	assert_eq!(cfg.forward.request_headers, vec!["api-key", "content-type"]);
	assert_eq!(cfg.forward.stripped_response_headers, vec!["content-length", "content-encoding"]);
}

#[test]
fn field_mode_can_select_last_field() {
	let payload = sample_toml_with("answers", "field_mode", Value::String("last".to_string()));
	let cfg = load_str(payload).expect("Config must load.");

	assert_eq!(cfg.answers.field_mode, ContextFieldMode::Last);
}

#[test]
fn score_threshold_must_be_a_ratio() {
	let payload = sample_toml_with("answers", "score_threshold", Value::Float(1.5));
	let err = load_str(payload).expect_err("Expected score_threshold validation error.");

	assert!(
		err.to_string().contains("answers.score_threshold must be in the range 0.0-1.0."),
		"Unexpected error: {err}"
	);
}

#[test]
fn max_results_must_be_positive() {
	let mut cfg = base_config();

	cfg.answers.max_results = 0;

	let err = augur_config::validate(&cfg).expect_err("Expected max_results validation error.");

	assert!(
		err.to_string().contains("answers.max_results must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn key_field_cannot_be_a_content_field() {
	let mut cfg = base_config();

	cfg.search.content_fields.push("id".to_string());

	let err = augur_config::validate(&cfg).expect_err("Expected disjoint field error.");

	assert!(
		err.to_string().contains("search.content_fields must not contain search.key_field."),
		"Unexpected error: {err}"
	);
}

#[test]
fn azure_providers_require_api_version() {
	let mut cfg = base_config();

	cfg.providers.embedding.api_version = None;

	let err = augur_config::validate(&cfg).expect_err("Expected api_version validation error.");

	assert!(
		err.to_string().contains("Provider embedding api_version is required for azure."),
		"Unexpected error: {err}"
	);

	cfg.providers.embedding.api_type = ApiType::OpenAi;

	assert!(augur_config::validate(&cfg).is_ok());
}

#[test]
fn provider_api_keys_must_be_non_empty() {
	let mut cfg = base_config();

	cfg.providers.llm.api_key = "  ".to_string();

	let err = augur_config::validate(&cfg).expect_err("Expected api_key validation error.");

	assert!(err.to_string().contains("Provider llm api_key must be non-empty."));
}

#[test]
fn missing_config_file_is_reported() {
	let err = augur_config::load(std::path::Path::new("/nonexistent/augur.toml"))
		.expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }));
}

#[test]
fn env_config_builds_search_endpoint_from_service_name() {
	let vars = sample_env();
	let cfg = augur_config::from_env_with(|name| vars.get(name).cloned())
		.expect("Env config must load.");

	assert_eq!(cfg.search.endpoint, "https://contoso.search.windows.net");
	assert_eq!(cfg.search.content_fields, vec!["content", "summary"]);
	assert_eq!(cfg.answers.score_threshold, 0.4);
	assert_eq!(cfg.answers.max_results, 3);
	assert_eq!(cfg.providers.llm.api_type, ApiType::Azure);
	assert_eq!(cfg.providers.llm.api_base, "https://contoso.openai.azure.com");
	assert_eq!(cfg.providers.embedding.model, "text-embedding-ada-002");
	assert_eq!(cfg.service.http_bind, "127.0.0.1:8080");
}

#[test]
fn env_config_reports_missing_variable() {
	let mut vars = sample_env();

	vars.remove("OPENAI_API_SYSTEM_MESSAGE");

	let err = augur_config::from_env_with(|name| vars.get(name).cloned())
		.expect_err("Expected missing variable error.");

	assert!(
		matches!(err, Error::MissingEnv { name: "OPENAI_API_SYSTEM_MESSAGE" }),
		"Unexpected error: {err}"
	);
}

#[test]
fn env_config_rejects_unparsable_numbers() {
	let mut vars = sample_env();

	vars.insert("SEARCHSERVICE_MAX_NO_RESULTS", "many".to_string());

	let err = augur_config::from_env_with(|name| vars.get(name).cloned())
		.expect_err("Expected invalid variable error.");

	assert!(matches!(err, Error::InvalidEnv { name: "SEARCHSERVICE_MAX_NO_RESULTS", .. }));
}
