use serde::Serialize;

use crate::{CancellationToken, Error, MatchEngine, Result};
use vismatch_domain::{CandidateItem, DetectedAttributes, ExclusionSet, RankedResultSet, planner};

/// Result of the first pass for a capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "results", rename_all = "snake_case")]
pub enum MatchOutcome {
	Matches(RankedResultSet),
	/// Nothing in the catalog matched. The caller should suggest another photo.
	NoMatches,
}
impl MatchOutcome {
	pub fn results(&self) -> Option<&RankedResultSet> {
		match self {
			Self::Matches(ranked) => Some(ranked),
			Self::NoMatches => None,
		}
	}
}

/// Result of a "find more" pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "results", rename_all = "snake_case")]
pub enum RefineOutcome {
	Matches(RankedResultSet),
	/// No candidate that was not shown before exists. Further refinement is pointless.
	Exhausted,
}
impl RefineOutcome {
	pub fn results(&self) -> Option<&RankedResultSet> {
		match self {
			Self::Matches(ranked) => Some(ranked),
			Self::Exhausted => None,
		}
	}
}

impl MatchEngine {
	/// Plans the initial terms and ranks what they find.
	pub async fn find_matches(
		&self,
		attrs: &DetectedAttributes,
		exclude: &ExclusionSet,
	) -> MatchOutcome {
		let terms = planner::plan(attrs, false, &self.limits);
		let ranked = self.aggregate(&terms, attrs, exclude).await;

		if ranked.is_empty() { MatchOutcome::NoMatches } else { MatchOutcome::Matches(ranked) }
	}

	pub async fn find_matches_with_cancel(
		&self,
		attrs: &DetectedAttributes,
		exclude: &ExclusionSet,
		cancel: &CancellationToken,
	) -> Result<MatchOutcome> {
		tokio::select! {
			biased;

			_ = cancel.cancelled() => Err(Error::Cancelled),
			outcome = self.find_matches(attrs, exclude) => Ok(outcome),
		}
	}

	/// Searches again with the wider refinement vocabulary.
	///
	/// Every id in `previous_shown` is committed to `exclude` before any search runs, so the
	/// result never repeats a candidate the user has already seen.
	pub async fn refine(
		&self,
		attrs: &DetectedAttributes,
		previous_shown: &[CandidateItem],
		exclude: &mut ExclusionSet,
	) -> RefineOutcome {
		exclude.extend_from(previous_shown);

		self.refine_excluding(attrs, exclude).await
	}

	/// Cancellation keeps the ids already committed to `exclude`.
	pub async fn refine_with_cancel(
		&self,
		attrs: &DetectedAttributes,
		previous_shown: &[CandidateItem],
		exclude: &mut ExclusionSet,
		cancel: &CancellationToken,
	) -> Result<RefineOutcome> {
		exclude.extend_from(previous_shown);

		let exclude = &*exclude;

		tokio::select! {
			biased;

			_ = cancel.cancelled() => Err(Error::Cancelled),
			outcome = self.refine_excluding(attrs, exclude) => Ok(outcome),
		}
	}

	async fn refine_excluding(
		&self,
		attrs: &DetectedAttributes,
		exclude: &ExclusionSet,
	) -> RefineOutcome {
		let terms = planner::plan(attrs, true, &self.limits);
		let pages =
			if self.providers.catalog.supports_paging() { self.refine_pages } else { 1 };

		tracing::info!(
			terms = terms.len(),
			pages,
			excluded = exclude.len(),
			"Refining matches."
		);

		let ranked = self.aggregate_pages(&terms, attrs, exclude, pages).await;

		if ranked.is_empty() { RefineOutcome::Exhausted } else { RefineOutcome::Matches(ranked) }
	}
}
