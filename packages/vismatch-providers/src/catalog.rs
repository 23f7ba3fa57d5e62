use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};
use vismatch_config::CatalogProviderConfig;
use vismatch_domain::CandidateItem;

pub async fn search(
	cfg: &CatalogProviderConfig,
	term: &str,
	page: Option<u32>,
) -> Result<Vec<CandidateItem>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let res = client
		.get(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.query(&search_query(cfg, term, page))
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_catalog_response(json)
}

fn search_query(cfg: &CatalogProviderConfig, term: &str, page: Option<u32>) -> Vec<(String, String)> {
	let mut query = vec![(cfg.query_param.clone(), term.to_string())];

	if let (Some(param), Some(page)) = (cfg.page_param.as_ref(), page) {
		query.push((param.clone(), page.to_string()));
	}

	query
}

fn parse_catalog_response(json: Value) -> Result<Vec<CandidateItem>> {
	let items = match &json {
		Value::Array(items) => items,
		Value::Object(map) => ["data", "items", "results"]
			.iter()
			.find_map(|key| map.get(*key).and_then(|v| v.as_array()))
			.ok_or_else(|| Error::InvalidResponse {
				message: "Catalog response is missing an items array.".to_string(),
			})?,
		_ => {
			return Err(Error::InvalidResponse {
				message: "Catalog response must be an array or an object.".to_string(),
			});
		},
	};
	let mut out = Vec::with_capacity(items.len());

	for (position, item) in items.iter().enumerate() {
		let Some(id) = item.get("id").and_then(as_id) else {
			tracing::warn!(position, "Catalog item missing a usable id.");

			continue;
		};

		out.push(CandidateItem {
			id,
			key: text_field(item, "key").unwrap_or_default(),
			name: text_field(item, "name").unwrap_or_default(),
			barcode: text_field(item, "barcode"),
			unit: text_field(item, "unit").unwrap_or_default(),
			location: text_field(item, "location"),
		});
	}

	Ok(out)
}

fn as_id(value: &Value) -> Option<i64> {
	match value {
		Value::Number(number) => number.as_i64(),
		Value::String(raw) => raw.trim().parse().ok(),
		_ => None,
	}
}

fn text_field(item: &Value, key: &str) -> Option<String> {
	let raw = match item.get(key)? {
		Value::String(raw) => raw.trim().to_string(),
		Value::Number(number) => number.to_string(),
		_ => return None,
	};

	if raw.is_empty() { None } else { Some(raw) }
}

#[cfg(test)]
mod tests {
	use serde_json::Map;

	use super::*;

	fn config(page_param: Option<&str>) -> CatalogProviderConfig {
		CatalogProviderConfig {
			api_base: "http://localhost".to_string(),
			api_key: String::new(),
			path: "/search".to_string(),
			query_param: "q".to_string(),
			page_param: page_param.map(str::to_string),
			timeout_ms: 1_000,
			default_headers: Map::new(),
		}
	}

	#[test]
	fn parses_wrapped_items() {
		let json = serde_json::json!({
			"data": [
				{ "id": 7, "key": "CIN-48", "name": "Cinta 48mm", "barcode": 750100, "unit": "PZA" },
				{ "id": "8", "key": "CIN-24", "name": "Cinta 24mm", "barcode": " ", "location": "B-2" }
			]
		});
		let items = parse_catalog_response(json).expect("parse failed");

		assert_eq!(items.len(), 2);
		assert_eq!(items[0].barcode.as_deref(), Some("750100"));
		assert_eq!(items[1].id, 8);
		assert_eq!(items[1].barcode, None);
		assert_eq!(items[1].unit, "");
		assert_eq!(items[1].location.as_deref(), Some("B-2"));
	}

	#[test]
	fn skips_items_without_id() {
		let json = serde_json::json!([
			{ "key": "X", "name": "No id" },
			{ "id": "abc", "name": "Bad id" },
			{ "id": 3, "name": "Ok" }
		]);
		let items = parse_catalog_response(json).expect("parse failed");

		assert_eq!(items.iter().map(|item| item.id).collect::<Vec<_>>(), vec![3]);
	}

	#[test]
	fn rejects_unknown_shapes() {
		assert!(parse_catalog_response(serde_json::json!({ "rows": [] })).is_err());
		assert!(parse_catalog_response(serde_json::json!("nope")).is_err());
	}

	#[test]
	fn page_is_sent_only_when_supported() {
		assert_eq!(
			search_query(&config(Some("page")), "cinta", Some(2)),
			vec![("q".to_string(), "cinta".to_string()), ("page".to_string(), "2".to_string())]
		);
		assert_eq!(search_query(&config(None), "cinta", Some(2)).len(), 1);
		assert_eq!(search_query(&config(Some("page")), "cinta", None).len(), 1);
	}
}
