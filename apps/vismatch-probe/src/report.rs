use serde_json::{Value, json};

use vismatch_domain::RankedResultSet;
use vismatch_service::{MatchOutcome, RecognitionSession, RefineOutcome};

pub fn print_match(session: &RecognitionSession, outcome: &MatchOutcome) -> color_eyre::Result<()> {
	let (label, ranked) = match outcome {
		MatchOutcome::Matches(ranked) => ("matches", Some(ranked)),
		MatchOutcome::NoMatches => ("no_matches", None),
	};

	print_round(session, 0, label, ranked)
}

pub fn print_refine(
	session: &RecognitionSession,
	round: u32,
	outcome: &RefineOutcome,
) -> color_eyre::Result<()> {
	let (label, ranked) = match outcome {
		RefineOutcome::Matches(ranked) => ("matches", Some(ranked)),
		RefineOutcome::Exhausted => ("exhausted", None),
	};

	print_round(session, round, label, ranked)
}

fn print_round(
	session: &RecognitionSession,
	round: u32,
	label: &str,
	ranked: Option<&RankedResultSet>,
) -> color_eyre::Result<()> {
	tracing::info!(
		session_id = %session.id(),
		round,
		outcome = label,
		items = ranked.map(RankedResultSet::len).unwrap_or_default(),
		"Round finished."
	);
	println!("{}", serde_json::to_string(&round_json(session, round, label, ranked))?);

	Ok(())
}

fn round_json(
	session: &RecognitionSession,
	round: u32,
	label: &str,
	ranked: Option<&RankedResultSet>,
) -> Value {
	let items = ranked
		.map(|ranked| {
			ranked
				.items()
				.iter()
				.map(|scored| {
					json!({
						"id": scored.candidate.id,
						"key": scored.candidate.key,
						"name": scored.candidate.name,
						"location": scored.candidate.location,
						"confidence": scored.confidence,
					})
				})
				.collect::<Vec<_>>()
		})
		.unwrap_or_default();

	json!({
		"round": round,
		"session_id": session.id(),
		"state": session.state(),
		"outcome": label,
		"items": items,
	})
}

#[cfg(test)]
mod tests {
	use vismatch_domain::{CandidateItem, ScoredCandidate};

	use super::*;

	#[test]
	fn renders_ranked_items() {
		let session = RecognitionSession::new();
		let ranked = RankedResultSet::from_scored(
			vec![ScoredCandidate {
				candidate: CandidateItem {
					id: 4,
					key: "MAR-16".to_string(),
					name: "Martillo".to_string(),
					barcode: None,
					unit: "PZA".to_string(),
					location: Some("A-02".to_string()),
				},
				confidence: 98,
			}],
			10,
		);
		let value = round_json(&session, 0, "matches", Some(&ranked));

		assert_eq!(value["outcome"], "matches");
		assert_eq!(value["state"], "idle");
		assert_eq!(value["items"][0]["id"], 4);
		assert_eq!(value["items"][0]["confidence"], 98);
	}

	#[test]
	fn renders_terminal_rounds_without_items() {
		let session = RecognitionSession::new();
		let value = round_json(&session, 2, "exhausted", None);

		assert_eq!(value["round"], 2);
		assert_eq!(value["items"], json!([]));
	}

	#[test]
	fn printing_a_round_logs_and_succeeds() {
		let session = RecognitionSession::new();

		assert!(print_match(&session, &MatchOutcome::NoMatches).is_ok());
		assert!(print_refine(&session, 1, &RefineOutcome::Exhausted).is_ok());
	}
}
