use vismatch_config::Matching;
use vismatch_domain::{
	CandidateItem, DetectedAttributes, MatchingLimits, planner, scoring, text,
};

fn item(id: i64, key: &str, name: &str, barcode: Option<&str>) -> CandidateItem {
	CandidateItem {
		id,
		key: key.to_string(),
		name: name.to_string(),
		barcode: barcode.map(str::to_string),
		unit: "PZA".to_string(),
		location: Some("A-01-03".to_string()),
	}
}

#[test]
fn limits_follow_matching_config() {
	let cfg = Matching { max_terms: 3, result_limit: 4, ..Default::default() };
	let limits = MatchingLimits::from(&cfg);

	assert_eq!(limits.max_terms, 3);
	assert_eq!(limits.result_limit, 4);
	assert_eq!(limits.max_refine_terms, 6);
	assert_eq!(limits.min_token_chars, 3);
	assert_eq!(MatchingLimits::from(&Matching::default()), MatchingLimits::default());
}

#[test]
fn barcode_match_reports_ceiling_confidence() {
	let attrs = DetectedAttributes { code: Some("12500".to_string()), ..Default::default() };

	assert_eq!(
		scoring::score(&item(1, "K-1", "Anything", Some("12500")), &attrs, &MatchingLimits::default()),
		98
	);
}

#[test]
fn vision_json_drives_plan_and_score() {
	let attrs: DetectedAttributes = serde_json::from_str(
		r#"{ "name": "Cinta Adhesiva", "brand": "3M", "size": "", "hints": ["canela", " "] }"#,
	)
	.expect("parse failed");
	let limits = MatchingLimits::default();
	let terms = planner::plan(&attrs, false, &limits);

	assert_eq!(
		terms.iter().map(|term| term.text.as_str()).collect::<Vec<_>>(),
		vec!["3M Cinta Adhesiva", "Cinta Adhesiva", "canela"]
	);

	let breakdown =
		scoring::score_with_breakdown(&item(2, "CIN-48", "Cinta Adhesiva 3M 48mm", None), &attrs, &limits);

	assert_eq!(breakdown.possible, 45);
	assert_eq!(breakdown.confidence, 98);
}

#[test]
fn text_folding_is_case_insensitive() {
	assert_eq!(text::fold("TRUPER"), text::fold("truper"));
}
