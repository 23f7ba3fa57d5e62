mod error;

pub use error::{Error, Result};

use std::{
	collections::{HashMap, HashSet},
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use color_eyre::eyre;

use vismatch_domain::{CandidateItem, DetectedAttributes, text};
use vismatch_service::{AttributeExtractor, BoxFuture, CatalogSearch, ImageInput};

const DEFAULT_PAGE_SIZE: usize = 20;

/// In-memory catalog. A term matches an item when every word of the term appears in the item's
/// key, name, or barcode.
pub struct StubCatalog {
	items: Vec<CandidateItem>,
	page_size: usize,
	paging: bool,
	failing: HashSet<String>,
	delays: HashMap<String, Duration>,
	calls: Mutex<Vec<(String, Option<u32>)>>,
	in_flight: AtomicUsize,
	peak_in_flight: AtomicUsize,
}
impl StubCatalog {
	pub fn new(items: Vec<CandidateItem>) -> Self {
		Self {
			items,
			page_size: DEFAULT_PAGE_SIZE,
			paging: false,
			failing: HashSet::new(),
			delays: HashMap::new(),
			calls: Mutex::new(Vec::new()),
			in_flight: AtomicUsize::new(0),
			peak_in_flight: AtomicUsize::new(0),
		}
	}

	/// Loads items from a JSON array of catalog entries.
	pub fn from_json(raw: &str) -> Result<Self> {
		let items: Vec<CandidateItem> = serde_json::from_str(raw)?;

		if items.is_empty() {
			return Err(Error::Message("Catalog fixture must not be empty.".to_string()));
		}

		Ok(Self::new(items))
	}

	pub fn with_page_size(mut self, page_size: usize) -> Self {
		self.page_size = page_size.max(1);

		self
	}

	pub fn with_paging(mut self) -> Self {
		self.paging = true;

		self
	}

	/// Every search for `term` fails.
	pub fn failing_on(mut self, term: &str) -> Self {
		self.failing.insert(text::fold(term));

		self
	}

	/// Every search for `term` waits `delay` before answering.
	pub fn delayed_on(mut self, term: &str, delay: Duration) -> Self {
		self.delays.insert(text::fold(term), delay);

		self
	}

	/// Searches received so far, in arrival order.
	pub fn calls(&self) -> Vec<(String, Option<u32>)> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	/// Highest number of searches that were running at the same time.
	pub fn peak_in_flight(&self) -> usize {
		self.peak_in_flight.load(Ordering::SeqCst)
	}

	pub fn searched_terms(&self) -> Vec<String> {
		self.calls().into_iter().map(|(term, _)| term).collect()
	}

	fn matching(&self, term: &str, page: Option<u32>) -> Vec<CandidateItem> {
		let words = text::fold(term).split_whitespace().map(str::to_string).collect::<Vec<_>>();
		let page = if self.paging { page.unwrap_or(1).max(1) as usize } else { 1 };

		self.items
			.iter()
			.filter(|item| {
				let haystack = text::fold(&format!(
					"{} {} {}",
					item.key,
					item.name,
					item.barcode.as_deref().unwrap_or_default()
				));

				!words.is_empty() && words.iter().all(|word| haystack.contains(word.as_str()))
			})
			.skip((page - 1) * self.page_size)
			.take(self.page_size)
			.cloned()
			.collect()
	}
}
impl CatalogSearch for StubCatalog {
	fn search<'a>(
		&'a self,
		term: &'a str,
		page: Option<u32>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<CandidateItem>>> {
		Box::pin(async move {
			self.calls
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.push((term.to_string(), page));

			let _in_flight = InFlight::enter(&self.in_flight, &self.peak_in_flight);
			let key = text::fold(term);

			if let Some(delay) = self.delays.get(&key) {
				tokio::time::sleep(*delay).await;
			}
			if self.failing.contains(&key) {
				return Err(eyre::eyre!("Catalog backend rejected term {term:?}."));
			}

			Ok(self.matching(term, page))
		})
	}

	fn supports_paging(&self) -> bool {
		self.paging
	}
}

/// Counts a running search until dropped, including when the caller abandons it.
struct InFlight<'a> {
	current: &'a AtomicUsize,
}
impl<'a> InFlight<'a> {
	fn enter(current: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
		let now = current.fetch_add(1, Ordering::SeqCst) + 1;

		peak.fetch_max(now, Ordering::SeqCst);

		Self { current }
	}
}
impl Drop for InFlight<'_> {
	fn drop(&mut self) {
		self.current.fetch_sub(1, Ordering::SeqCst);
	}
}

/// Extractor that answers with a fixed result and counts its calls.
pub struct ScriptedExtractor {
	attrs: Option<DetectedAttributes>,
	calls: Arc<AtomicUsize>,
}
impl ScriptedExtractor {
	pub fn returning(attrs: DetectedAttributes) -> Self {
		Self { attrs: Some(attrs), calls: Arc::new(AtomicUsize::new(0)) }
	}

	pub fn failing() -> Self {
		Self { attrs: None, calls: Arc::new(AtomicUsize::new(0)) }
	}

	pub fn count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl AttributeExtractor for ScriptedExtractor {
	fn extract<'a>(
		&'a self,
		_image: &'a ImageInput,
	) -> BoxFuture<'a, color_eyre::Result<DetectedAttributes>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let attrs = self.attrs.clone();

		Box::pin(async move { attrs.ok_or_else(|| eyre::eyre!("Vision model is unavailable.")) })
	}
}

pub fn item(id: i64, key: &str, name: &str) -> CandidateItem {
	CandidateItem {
		id,
		key: key.to_string(),
		name: name.to_string(),
		barcode: None,
		unit: "PZA".to_string(),
		location: None,
	}
}

pub fn item_with_barcode(id: i64, key: &str, name: &str, barcode: &str) -> CandidateItem {
	CandidateItem { barcode: Some(barcode.to_string()), ..item(id, key, name) }
}
