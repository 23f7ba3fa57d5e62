use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub catalog: CatalogProviderConfig,
	pub vision: VisionProviderConfig,
	#[serde(default)]
	pub matching: Matching,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogProviderConfig {
	pub api_base: String,
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	#[serde(default = "default_query_param")]
	pub query_param: String,
	/// Optional. Absent when the backend serves a single page per term.
	pub page_param: Option<String>,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisionProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default = "default_max_attempts")]
	pub max_attempts: u32,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Matching {
	#[serde(default = "default_max_terms")]
	pub max_terms: u32,
	#[serde(default = "default_max_refine_terms")]
	pub max_refine_terms: u32,
	#[serde(default = "default_result_limit")]
	pub result_limit: u32,
	/// Minimum character count for a name token to count as a term or a scoring token.
	#[serde(default = "default_min_token_chars")]
	pub min_token_chars: u32,
	#[serde(default = "default_max_concurrent_terms")]
	pub max_concurrent_terms: u32,
	#[serde(default = "default_term_timeout_ms")]
	pub term_timeout_ms: u64,
	/// Pages requested per term during refinement when the catalog supports paging.
	#[serde(default = "default_refine_pages")]
	pub refine_pages: u32,
}
impl Default for Matching {
	fn default() -> Self {
		Self {
			max_terms: default_max_terms(),
			max_refine_terms: default_max_refine_terms(),
			result_limit: default_result_limit(),
			min_token_chars: default_min_token_chars(),
			max_concurrent_terms: default_max_concurrent_terms(),
			term_timeout_ms: default_term_timeout_ms(),
			refine_pages: default_refine_pages(),
		}
	}
}

fn default_query_param() -> String {
	"q".to_string()
}

fn default_max_attempts() -> u32 {
	3
}

fn default_max_terms() -> u32 {
	5
}

fn default_max_refine_terms() -> u32 {
	6
}

fn default_result_limit() -> u32 {
	10
}

fn default_min_token_chars() -> u32 {
	3
}

fn default_max_concurrent_terms() -> u32 {
	6
}

fn default_term_timeout_ms() -> u64 {
	8_000
}

fn default_refine_pages() -> u32 {
	2
}
