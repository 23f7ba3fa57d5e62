pub mod aggregate;
pub mod refine;
pub mod session;

mod error;

pub use error::{Error, Result};
pub use refine::{MatchOutcome, RefineOutcome};
pub use session::{RecognitionSession, SessionState};
pub use tokio_util::sync::CancellationToken;
pub use vismatch_providers::vision::ImageInput;

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use vismatch_config::{CatalogProviderConfig, Config, Matching, VisionProviderConfig};
use vismatch_domain::{CandidateItem, DetectedAttributes, MatchingLimits};
use vismatch_providers::{catalog, vision};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Free-text search over the product catalog.
///
/// Returned items are treated as an unordered candidate pool. `page` is `None` for the first
/// (or only) page.
pub trait CatalogSearch
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		term: &'a str,
		page: Option<u32>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<CandidateItem>>>;

	fn supports_paging(&self) -> bool {
		false
	}
}

pub trait AttributeExtractor
where
	Self: Send + Sync,
{
	fn extract<'a>(
		&'a self,
		image: &'a ImageInput,
	) -> BoxFuture<'a, color_eyre::Result<DetectedAttributes>>;
}

#[derive(Clone)]
pub struct Providers {
	pub catalog: Arc<dyn CatalogSearch>,
	pub extractor: Arc<dyn AttributeExtractor>,
}
impl Providers {
	pub fn new(catalog: Arc<dyn CatalogSearch>, extractor: Arc<dyn AttributeExtractor>) -> Self {
		Self { catalog, extractor }
	}

	pub fn http(cfg: &Config) -> Self {
		Self {
			catalog: Arc::new(HttpCatalog { cfg: cfg.catalog.clone() }),
			extractor: Arc::new(HttpVision { cfg: cfg.vision.clone() }),
		}
	}
}

/// Matching engine shared by every recognition session of the host application.
pub struct MatchEngine {
	pub limits: MatchingLimits,
	pub term_timeout: Duration,
	pub max_concurrent_terms: usize,
	pub refine_pages: u32,
	pub providers: Providers,
}
impl MatchEngine {
	pub fn new(cfg: &Config) -> Self {
		Self::with_providers(&cfg.matching, Providers::http(cfg))
	}

	pub fn with_providers(matching: &Matching, providers: Providers) -> Self {
		Self {
			limits: MatchingLimits::from(matching),
			term_timeout: Duration::from_millis(matching.term_timeout_ms),
			max_concurrent_terms: (matching.max_concurrent_terms as usize).max(1),
			refine_pages: matching.refine_pages.max(1),
			providers,
		}
	}
}

struct HttpCatalog {
	cfg: CatalogProviderConfig,
}
impl CatalogSearch for HttpCatalog {
	fn search<'a>(
		&'a self,
		term: &'a str,
		page: Option<u32>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<CandidateItem>>> {
		Box::pin(async move { Ok(catalog::search(&self.cfg, term, page).await?) })
	}

	fn supports_paging(&self) -> bool {
		self.cfg.page_param.is_some()
	}
}

struct HttpVision {
	cfg: VisionProviderConfig,
}
impl AttributeExtractor for HttpVision {
	fn extract<'a>(
		&'a self,
		image: &'a ImageInput,
	) -> BoxFuture<'a, color_eyre::Result<DetectedAttributes>> {
		Box::pin(async move { Ok(vision::extract(&self.cfg, image).await?) })
	}
}
