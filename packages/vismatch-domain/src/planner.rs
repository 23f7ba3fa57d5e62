use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{DetectedAttributes, MatchingLimits, text};

/// One free-text query for the catalog. Lower `priority` runs first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTerm {
	pub text: String,
	pub priority: u32,
}

/// Builds the query list for a pass.
///
/// The initial pass goes from the most specific signal (code) to the broadest (brand) and keeps
/// the first `max_terms`. The refinement pass builds a separate list of single words and color
/// combinations capped at `max_refine_terms`, so it does not repeat the composite queries of the
/// initial pass.
pub fn plan(attrs: &DetectedAttributes, extended: bool, limits: &MatchingLimits) -> Vec<SearchTerm> {
	let mut terms = TermList::default();

	if extended {
		plan_refinement(attrs, limits, &mut terms);
		terms.finish(limits.max_refine_terms)
	} else {
		plan_initial(attrs, &mut terms);
		terms.finish(limits.max_terms)
	}
}

fn plan_initial(attrs: &DetectedAttributes, terms: &mut TermList) {
	let name = attrs.name();
	let brand = attrs.brand();

	if let Some(code) = attrs.code() {
		terms.push(code);
	}
	if let (Some(brand), Some(name)) = (brand, name) {
		terms.push(&format!("{brand} {name}"));
	}
	if let (Some(name), Some(size)) = (name, attrs.size()) {
		terms.push(&format!("{name} {size}"));
	}
	if let Some(name) = name {
		terms.push(name);
	}

	for hint in attrs.hints() {
		terms.push(hint);
	}

	// A brand already queried as a word of a composite term adds nothing on its own.
	if let Some(brand) = brand
		&& !terms.covers_word(brand)
	{
		terms.push(brand);
	}
}

fn plan_refinement(attrs: &DetectedAttributes, limits: &MatchingLimits, terms: &mut TermList) {
	let name = attrs.name();

	for hint in attrs.hints() {
		terms.push(hint);
	}

	if let Some(name) = name {
		for token in text::name_tokens(name, limits.min_token_chars) {
			terms.push(token);
		}
	}
	if let Some(brand) = attrs.brand() {
		terms.push(brand);
	}
	if let (Some(name), Some(color)) = (name, attrs.color()) {
		terms.push(&format!("{name} {color}"));
	}
}

#[derive(Default)]
struct TermList {
	texts: Vec<String>,
	seen: HashSet<String>,
}
impl TermList {
	fn push(&mut self, value: &str) {
		let trimmed = value.trim();

		if trimmed.is_empty() {
			return;
		}
		if self.seen.insert(text::fold(trimmed)) {
			self.texts.push(trimmed.to_string());
		}
	}

	fn covers_word(&self, value: &str) -> bool {
		let folded = text::fold(value);
		let needle: Vec<&str> = folded.split_whitespace().collect();

		if needle.is_empty() {
			return false;
		}

		self.seen.iter().any(|term| {
			let words: Vec<&str> = term.split_whitespace().collect();

			words.windows(needle.len()).any(|window| window == needle.as_slice())
		})
	}

	fn finish(mut self, cap: usize) -> Vec<SearchTerm> {
		self.texts.truncate(cap);

		self.texts
			.into_iter()
			.enumerate()
			.map(|(priority, text)| SearchTerm { text, priority: priority as u32 })
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn attrs() -> DetectedAttributes {
		DetectedAttributes::default()
	}

	fn texts(terms: &[SearchTerm]) -> Vec<&str> {
		terms.iter().map(|term| term.text.as_str()).collect()
	}

	#[test]
	fn initial_plan_orders_code_brand_name() {
		let attrs = DetectedAttributes {
			code: Some("A1".to_string()),
			brand: Some("X".to_string()),
			name: Some("Y".to_string()),
			..attrs()
		};
		let terms = plan(&attrs, false, &MatchingLimits::default());

		assert_eq!(texts(&terms), vec!["A1", "X Y", "Y"]);
		assert_eq!(terms.iter().map(|term| term.priority).collect::<Vec<_>>(), vec![0, 1, 2]);
	}

	#[test]
	fn initial_plan_caps_at_five_terms() {
		let attrs = DetectedAttributes {
			code: Some("12500".to_string()),
			brand: Some("Truper".to_string()),
			name: Some("Martillo Uña".to_string()),
			size: Some("16oz".to_string()),
			hints: vec!["mango fibra".to_string(), "acero".to_string(), "carpintero".to_string()],
			..attrs()
		};
		let terms = plan(&attrs, false, &MatchingLimits::default());

		assert_eq!(
			texts(&terms),
			vec!["12500", "Truper Martillo Uña", "Martillo Uña 16oz", "Martillo Uña", "mango fibra"]
		);
	}

	#[test]
	fn duplicates_collapse_case_insensitively() {
		let attrs = DetectedAttributes {
			name: Some("Cinta".to_string()),
			hints: vec!["CINTA".to_string(), "cinta gris".to_string()],
			..attrs()
		};
		let terms = plan(&attrs, false, &MatchingLimits::default());

		assert_eq!(texts(&terms), vec!["Cinta", "cinta gris"]);
	}

	#[test]
	fn brand_alone_is_last_when_not_covered() {
		let attrs = DetectedAttributes {
			brand: Some("Pretul".to_string()),
			hints: vec!["pinza".to_string()],
			..attrs()
		};
		let terms = plan(&attrs, false, &MatchingLimits::default());

		assert_eq!(texts(&terms), vec!["pinza", "Pretul"]);
	}

	#[test]
	fn empty_attributes_plan_nothing() {
		assert!(plan(&attrs(), false, &MatchingLimits::default()).is_empty());
		assert!(plan(&attrs(), true, &MatchingLimits::default()).is_empty());
	}

	#[test]
	fn refinement_plan_uses_hints_tokens_brand_and_color() {
		let attrs = DetectedAttributes {
			brand: Some("3M".to_string()),
			name: Some("Cinta de aislar".to_string()),
			color: Some("negra".to_string()),
			hints: vec!["electrica".to_string()],
			..attrs()
		};
		let terms = plan(&attrs, true, &MatchingLimits::default());

		assert_eq!(
			texts(&terms),
			vec!["electrica", "Cinta", "aislar", "3M", "Cinta de aislar negra"]
		);
	}

	#[test]
	fn refinement_plan_skips_present_tokens_and_caps_at_six() {
		let attrs = DetectedAttributes {
			name: Some("tornillo cabeza hexagonal galvanizado acero".to_string()),
			color: Some("plata".to_string()),
			hints: vec!["Tornillo".to_string(), "rosca".to_string()],
			..attrs()
		};
		let terms = plan(&attrs, true, &MatchingLimits::default());

		assert_eq!(
			texts(&terms),
			vec!["Tornillo", "rosca", "cabeza", "hexagonal", "galvanizado", "acero"]
		);
	}
}
