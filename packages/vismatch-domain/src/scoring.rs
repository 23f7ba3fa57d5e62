use serde::Serialize;

use crate::{
	CandidateItem, DetectedAttributes, MAX_CONFIDENCE, MIN_CONFIDENCE, MatchingLimits,
	UNSCORED_CONFIDENCE, text,
};

const CODE_WEIGHT: u32 = 40;
const CODE_PARTIAL: u32 = 25;
const BRAND_WEIGHT: u32 = 20;
const NAME_WEIGHT: u32 = 25;
const SIZE_WEIGHT: u32 = 10;
const COLOR_WEIGHT: u32 = 5;

/// Points earned against points possible for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
	pub earned: u32,
	pub possible: u32,
	pub confidence: u8,
}

pub fn score(candidate: &CandidateItem, attrs: &DetectedAttributes, limits: &MatchingLimits) -> u8 {
	score_with_breakdown(candidate, attrs, limits).confidence
}

pub fn score_with_breakdown(
	candidate: &CandidateItem,
	attrs: &DetectedAttributes,
	limits: &MatchingLimits,
) -> ScoreBreakdown {
	let name = text::fold(&candidate.name);
	let mut earned = 0_u32;
	let mut possible = 0_u32;

	if let Some(code) = attrs.code() {
		possible += CODE_WEIGHT;
		earned += code_points(candidate, &text::fold(code));
	}
	if let Some(brand) = attrs.brand() {
		possible += BRAND_WEIGHT;

		if name.contains(&text::fold(brand)) {
			earned += BRAND_WEIGHT;
		}
	}
	if let Some(detected_name) = attrs.name() {
		possible += NAME_WEIGHT;
		earned += name_points(&name, detected_name, limits.min_token_chars);
	}
	if let Some(size) = attrs.size() {
		possible += SIZE_WEIGHT;

		if name.contains(&text::fold(size)) {
			earned += SIZE_WEIGHT;
		}
	}
	if let Some(color) = attrs.color() {
		possible += COLOR_WEIGHT;

		if name.contains(&text::fold(color)) {
			earned += COLOR_WEIGHT;
		}
	}

	ScoreBreakdown { earned, possible, confidence: confidence(earned, possible) }
}

fn code_points(candidate: &CandidateItem, code: &str) -> u32 {
	let fields = [candidate.barcode.as_deref(), Some(candidate.key.as_str())]
		.into_iter()
		.flatten()
		.map(|field| text::fold(field.trim()))
		.filter(|field| !field.is_empty())
		.collect::<Vec<_>>();

	if fields.iter().any(|field| field == code) {
		CODE_WEIGHT
	} else if fields.iter().any(|field| field.contains(code)) {
		CODE_PARTIAL
	} else {
		0
	}
}

fn name_points(candidate_name: &str, detected_name: &str, min_token_chars: usize) -> u32 {
	let tokens = text::name_tokens(detected_name, min_token_chars);
	let matched =
		tokens.iter().filter(|token| candidate_name.contains(&text::fold(token))).count();

	(NAME_WEIGHT as f64 * matched as f64 / tokens.len().max(1) as f64).round() as u32
}

fn confidence(earned: u32, possible: u32) -> u8 {
	if possible == 0 {
		return UNSCORED_CONFIDENCE;
	}

	let ratio = (100.0 * earned as f64 / possible as f64).round() as u32;

	ratio.clamp(MIN_CONFIDENCE as u32, MAX_CONFIDENCE as u32) as u8
}
