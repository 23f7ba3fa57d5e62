pub mod attributes;
pub mod catalog;
pub mod planner;
pub mod scoring;
pub mod text;

pub use attributes::DetectedAttributes;
pub use catalog::{
	CandidateItem, ExclusionSet, MAX_CONFIDENCE, MIN_CONFIDENCE, RankedResultSet, ScoredCandidate,
	UNSCORED_CONFIDENCE,
};
pub use planner::{SearchTerm, plan};
pub use scoring::{ScoreBreakdown, score, score_with_breakdown};

use vismatch_config::Matching;

/// Size limits shared by the planner, the scorer, and the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingLimits {
	pub max_terms: usize,
	pub max_refine_terms: usize,
	pub result_limit: usize,
	pub min_token_chars: usize,
}
impl Default for MatchingLimits {
	fn default() -> Self {
		Self { max_terms: 5, max_refine_terms: 6, result_limit: 10, min_token_chars: 3 }
	}
}
impl From<&Matching> for MatchingLimits {
	fn from(cfg: &Matching) -> Self {
		Self {
			max_terms: cfg.max_terms as usize,
			max_refine_terms: cfg.max_refine_terms as usize,
			result_limit: cfg.result_limit as usize,
			min_token_chars: cfg.min_token_chars as usize,
		}
	}
}
