use std::{sync::LazyLock, time::Duration};

use base64::{Engine, engine::general_purpose::STANDARD};
use regex::Regex;
use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};
use vismatch_config::VisionProviderConfig;
use vismatch_domain::DetectedAttributes;

const SYSTEM_PROMPT: &str = "You identify warehouse products from photos. \
Output must be valid JSON only, matching the provided schema exactly. \
Use null for anything you cannot read or infer with confidence. \
`code` is a barcode, SKU, or model number printed on the product. \
`hints` are short search phrases (one to three words) that describe the product type. \
Do not add explanations or extra fields.";

static CODE_FENCE: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").ok());

/// Photo handed to the vision model.
#[derive(Debug, Clone)]
pub struct ImageInput {
	pub mime_type: String,
	pub bytes: Vec<u8>,
}
impl ImageInput {
	pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
		Self { mime_type: mime_type.into(), bytes }
	}

	pub fn data_url(&self) -> String {
		format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
	}
}

pub async fn extract(cfg: &VisionProviderConfig, image: &ImageInput) -> Result<DetectedAttributes> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": build_messages(image),
	});

	for attempt in 1..=cfg.max_attempts {
		let res = client
			.post(&url)
			.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
			.json(&body)
			.send()
			.await?;
		let json: Value = res.error_for_status()?.json().await?;

		match parse_vision_response(json) {
			Ok(attrs) => return Ok(attrs),
			Err(err) => {
				tracing::warn!(attempt, error = %err, "Vision response is not usable.");
			},
		}
	}

	Err(Error::InvalidResponse { message: "Vision response is not valid JSON.".to_string() })
}

fn build_messages(image: &ImageInput) -> Vec<Value> {
	let schema = serde_json::json!({
		"name": "string|null",
		"brand": "string|null",
		"code": "string|null",
		"size": "string|null",
		"color": "string|null",
		"hints": ["string"]
	});
	let user_prompt = format!(
		"Return JSON matching this exact schema:\n{schema}\nDescribe the product in the photo.",
		schema = serde_json::to_string_pretty(&schema).unwrap_or_default(),
	);

	vec![
		serde_json::json!({ "role": "system", "content": SYSTEM_PROMPT }),
		serde_json::json!({
			"role": "user",
			"content": [
				{ "type": "text", "text": user_prompt },
				{ "type": "image_url", "image_url": { "url": image.data_url() } }
			]
		}),
	]
}

fn parse_vision_response(json: Value) -> Result<DetectedAttributes> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Vision response is missing message content.".to_string(),
		})?;
	let parsed: Value = serde_json::from_str(strip_code_fence(content))?;

	if !parsed.is_object() {
		return Err(Error::InvalidResponse {
			message: "Vision content must be a JSON object.".to_string(),
		});
	}

	Ok(attributes_from_value(&parsed))
}

fn strip_code_fence(content: &str) -> &str {
	let fenced = CODE_FENCE
		.as_ref()
		.and_then(|re| re.captures(content))
		.and_then(|caps| caps.get(1));

	match fenced {
		Some(inner) => inner.as_str(),
		None => content.trim(),
	}
}

/// Reads the vision contract leniently. Wrong types count as missing.
pub fn attributes_from_value(value: &Value) -> DetectedAttributes {
	let field = |key: &str| match value.get(key) {
		Some(Value::String(raw)) => Some(raw.clone()),
		Some(Value::Number(number)) => Some(number.to_string()),
		_ => None,
	};
	let hints = match value.get("hints") {
		Some(Value::Array(items)) =>
			items.iter().filter_map(|item| item.as_str().map(str::to_string)).collect(),
		Some(Value::String(raw)) => vec![raw.clone()],
		_ => Vec::new(),
	};

	DetectedAttributes {
		name: field("name"),
		brand: field("brand"),
		code: field("code"),
		size: field("size"),
		color: field("color"),
		hints,
	}
	.normalized()
}
