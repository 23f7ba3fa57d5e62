use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Confidence reported when no attribute could be evaluated.
pub const UNSCORED_CONFIDENCE: u8 = 20;
pub const MIN_CONFIDENCE: u8 = 10;
/// 100 is reserved for matches a person confirmed.
pub const MAX_CONFIDENCE: u8 = 98;

/// Catalog entry returned by a search term. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateItem {
	pub id: i64,
	pub key: String,
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub barcode: Option<String>,
	#[serde(default)]
	pub unit: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredCandidate {
	pub candidate: CandidateItem,
	pub confidence: u8,
}

/// Candidate ids already shown during one recognition attempt.
///
/// The set only grows; a new capture starts from an empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
	ids: HashSet<i64>,
}
impl ExclusionSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns `true` when the id was not excluded before.
	pub fn insert(&mut self, id: i64) -> bool {
		self.ids.insert(id)
	}

	pub fn extend_from(&mut self, items: &[CandidateItem]) {
		self.ids.extend(items.iter().map(|item| item.id));
	}

	pub fn contains(&self, id: i64) -> bool {
		self.ids.contains(&id)
	}

	pub fn len(&self) -> usize {
		self.ids.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}

	pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
		self.ids.iter().copied()
	}
}
impl FromIterator<i64> for ExclusionSet {
	fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self {
		Self { ids: iter.into_iter().collect() }
	}
}

/// Scored candidates ordered by confidence, highest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RankedResultSet {
	items: Vec<ScoredCandidate>,
}
impl RankedResultSet {
	/// Sorts by confidence, keeping the input order among equal confidences, and keeps the
	/// first `limit` entries.
	pub fn from_scored(mut results: Vec<ScoredCandidate>, limit: usize) -> Self {
		results.sort_by(|a, b| b.confidence.cmp(&a.confidence));
		results.truncate(limit);

		Self { items: results }
	}

	pub fn items(&self) -> &[ScoredCandidate] {
		&self.items
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub fn candidates(&self) -> Vec<CandidateItem> {
		self.items.iter().map(|item| item.candidate.clone()).collect()
	}

	pub fn ids(&self) -> Vec<i64> {
		self.items.iter().map(|item| item.candidate.id).collect()
	}

	pub fn into_vec(self) -> Vec<ScoredCandidate> {
		self.items
	}
}
