use reqwest::header::AUTHORIZATION;
use serde_json::Map;

#[test]
fn builds_bearer_auth_header() {
	let headers =
		vismatch_providers::auth_headers("secret", &Map::new()).expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");
}

#[test]
fn empty_key_sends_no_auth_header() {
	let headers =
		vismatch_providers::auth_headers("  ", &Map::new()).expect("Failed to build headers.");

	assert!(headers.get(AUTHORIZATION).is_none());
}

#[test]
fn rejects_non_string_default_headers() {
	let mut defaults = Map::new();

	defaults.insert("x-retries".to_string(), serde_json::json!(3));

	let err = vismatch_providers::auth_headers("secret", &defaults)
		.expect_err("Expected header validation error.");

	assert_eq!(err.to_string(), "Default header values must be strings.");
}

#[test]
fn reads_vision_contract_leniently() {
	let attrs = vismatch_providers::vision::attributes_from_value(&serde_json::json!({
		"name": " Martillo ",
		"size": 16,
		"color": ["rojo"],
		"hints": "carpintero"
	}));

	assert_eq!(attrs.name.as_deref(), Some("Martillo"));
	assert_eq!(attrs.size.as_deref(), Some("16"));
	assert_eq!(attrs.color, None);
	assert_eq!(attrs.hints, vec!["carpintero".to_string()]);
}
