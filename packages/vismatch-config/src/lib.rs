mod error;
mod types;

pub use error::{Error, Result};
pub use types::{CatalogProviderConfig, Config, Matching, Service, VisionProviderConfig};

use std::{fs, path::Path};

use serde_json::{Map, Value};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.catalog.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "catalog.api_base must be non-empty.".to_string(),
		});
	}
	if cfg.catalog.query_param.trim().is_empty() {
		return Err(Error::Validation {
			message: "catalog.query_param must be non-empty.".to_string(),
		});
	}
	if cfg.catalog.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "catalog.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.vision.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "vision.api_base must be non-empty.".to_string(),
		});
	}
	if cfg.vision.model.trim().is_empty() {
		return Err(Error::Validation { message: "vision.model must be non-empty.".to_string() });
	}
	if cfg.vision.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "vision.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.vision.max_attempts == 0 {
		return Err(Error::Validation {
			message: "vision.max_attempts must be greater than zero.".to_string(),
		});
	}
	if !cfg.vision.temperature.is_finite() {
		return Err(Error::Validation {
			message: "vision.temperature must be a finite number.".to_string(),
		});
	}
	if !(0.0..=2.0).contains(&cfg.vision.temperature) {
		return Err(Error::Validation {
			message: "vision.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}

	for (label, headers) in
		[("catalog", &cfg.catalog.default_headers), ("vision", &cfg.vision.default_headers)]
	{
		validate_headers(label, headers)?;
	}

	let matching = &cfg.matching;

	for (label, value) in [
		("matching.max_terms", matching.max_terms as u64),
		("matching.max_refine_terms", matching.max_refine_terms as u64),
		("matching.result_limit", matching.result_limit as u64),
		("matching.min_token_chars", matching.min_token_chars as u64),
		("matching.max_concurrent_terms", matching.max_concurrent_terms as u64),
		("matching.term_timeout_ms", matching.term_timeout_ms),
		("matching.refine_pages", matching.refine_pages as u64),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	Ok(())
}

fn validate_headers(label: &str, headers: &Map<String, Value>) -> Result<()> {
	for (key, value) in headers {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("{label}.default_headers keys must be non-empty."),
			});
		}
		if !value.is_string() {
			return Err(Error::Validation {
				message: format!("{label}.default_headers values must be strings."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.catalog.page_param.as_deref().map(|param| param.trim().is_empty()).unwrap_or(false) {
		cfg.catalog.page_param = None;
	}
	if cfg.catalog.api_key.trim().is_empty() {
		cfg.catalog.api_key = String::new();
	}

	cfg.catalog.api_base = cfg.catalog.api_base.trim_end_matches('/').to_string();
	cfg.vision.api_base = cfg.vision.api_base.trim_end_matches('/').to_string();
}
