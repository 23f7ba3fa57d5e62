use std::{
	collections::{HashMap, hash_map::Entry},
	sync::{Arc, Mutex},
};

use tokio::{sync::Semaphore, task::JoinSet, time};

use crate::{CancellationToken, Error, MatchEngine, Result};
use vismatch_domain::{
	CandidateItem, DetectedAttributes, ExclusionSet, RankedResultSet, ScoredCandidate, SearchTerm,
	scoring,
};

/// Where a candidate was first seen: job order, then position inside the returned page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Discovery {
	job: usize,
	position: usize,
}

#[derive(Debug)]
struct Job {
	index: usize,
	term: String,
	page: Option<u32>,
}

/// Ids seen during one pass. Check-and-insert runs under one lock so every id is scored once.
struct SeenSet {
	excluded: ExclusionSet,
	discovered: HashMap<i64, Discovery>,
}
impl SeenSet {
	fn new(excluded: &ExclusionSet) -> Self {
		Self { excluded: excluded.clone(), discovered: HashMap::new() }
	}

	fn claim(&mut self, job: usize, items: Vec<CandidateItem>) -> Vec<CandidateItem> {
		let mut claimed = Vec::new();

		for (position, item) in items.into_iter().enumerate() {
			if self.excluded.contains(item.id) {
				continue;
			}

			let discovery = Discovery { job, position };

			match self.discovered.entry(item.id) {
				Entry::Vacant(entry) => {
					entry.insert(discovery);
					claimed.push(item);
				},
				Entry::Occupied(mut entry) =>
					if discovery < *entry.get() {
						entry.insert(discovery);
					},
			}
		}

		claimed
	}
}

impl MatchEngine {
	/// Runs every term against the catalog and ranks the new candidates.
	///
	/// Ids in `exclude` are never returned. Failed or timed-out terms are skipped. The caller's
	/// exclusion set is not modified.
	pub async fn aggregate(
		&self,
		terms: &[SearchTerm],
		attrs: &DetectedAttributes,
		exclude: &ExclusionSet,
	) -> RankedResultSet {
		self.aggregate_pages(terms, attrs, exclude, 1).await
	}

	/// Same as [`MatchEngine::aggregate`], abandoning in-flight term calls once `cancel` fires.
	pub async fn aggregate_with_cancel(
		&self,
		terms: &[SearchTerm],
		attrs: &DetectedAttributes,
		exclude: &ExclusionSet,
		cancel: &CancellationToken,
	) -> Result<RankedResultSet> {
		tokio::select! {
			biased;

			_ = cancel.cancelled() => Err(Error::Cancelled),
			ranked = self.aggregate(terms, attrs, exclude) => Ok(ranked),
		}
	}

	pub(crate) async fn aggregate_pages(
		&self,
		terms: &[SearchTerm],
		attrs: &DetectedAttributes,
		exclude: &ExclusionSet,
		pages_per_term: u32,
	) -> RankedResultSet {
		let jobs = build_jobs(terms, pages_per_term);
		let job_count = jobs.len();
		let seen = Arc::new(Mutex::new(SeenSet::new(exclude)));
		let attrs = Arc::new(attrs.clone());
		let semaphore = Arc::new(Semaphore::new(self.max_concurrent_terms.min(job_count).max(1)));
		let mut tasks = JoinSet::new();

		for job in jobs {
			let catalog = self.providers.catalog.clone();
			let seen = seen.clone();
			let attrs = attrs.clone();
			let semaphore = semaphore.clone();
			let limits = self.limits;
			let timeout = self.term_timeout;

			tasks.spawn(async move {
				let Ok(_permit) = semaphore.acquire_owned().await else { return Vec::new() };
				let items = match time::timeout(timeout, catalog.search(&job.term, job.page)).await {
					Ok(Ok(items)) => items,
					Ok(Err(err)) => {
						tracing::warn!(
							term = %job.term,
							page = ?job.page,
							error = %err,
							"Catalog search failed. Skipping term."
						);

						return Vec::new();
					},
					Err(_) => {
						tracing::warn!(
							term = %job.term,
							page = ?job.page,
							timeout_ms = timeout.as_millis() as u64,
							"Catalog search timed out. Skipping term."
						);

						return Vec::new();
					},
				};
				let claimed = seen.lock().unwrap_or_else(|err| err.into_inner()).claim(job.index, items);

				claimed
					.into_iter()
					.map(|candidate| {
						let confidence = scoring::score(&candidate, &attrs, &limits);

						tracing::debug!(id = candidate.id, confidence, "Scored candidate.");

						ScoredCandidate { candidate, confidence }
					})
					.collect::<Vec<_>>()
			});
		}

		let mut results = Vec::new();

		while let Some(joined) = tasks.join_next().await {
			match joined {
				Ok(batch) => results.extend(batch),
				Err(err) => tracing::warn!(error = %err, "Catalog search worker failed."),
			}
		}

		{
			let seen = seen.lock().unwrap_or_else(|err| err.into_inner());

			results.sort_by_key(|scored| seen.discovered.get(&scored.candidate.id).copied());
		}

		let ranked = RankedResultSet::from_scored(results, self.limits.result_limit);

		tracing::info!(
			terms = terms.len(),
			jobs = job_count,
			excluded = exclude.len(),
			results = ranked.len(),
			"Aggregation pass finished."
		);

		ranked
	}
}

fn build_jobs(terms: &[SearchTerm], pages_per_term: u32) -> Vec<Job> {
	let mut ordered = terms.iter().collect::<Vec<_>>();

	ordered.sort_by_key(|term| term.priority);

	let pages = if pages_per_term <= 1 {
		vec![None]
	} else {
		(1..=pages_per_term).map(Some).collect()
	};

	ordered
		.into_iter()
		.flat_map(|term| pages.iter().map(move |page| (term.text.clone(), *page)))
		.enumerate()
		.map(|(index, (term, page))| Job { index, term, page })
		.collect()
}
