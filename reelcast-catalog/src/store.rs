//! Catalog Store: the full catalog, loaded once and read-only afterwards.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use reelcast_core::{HttpTransport, RequestHeaders, fetch_json};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::errors::CatalogError;
use crate::slug::title_to_slug;
use crate::types::{CatalogOrdering, CatalogRecord};

/// Source of the full catalog.
#[async_trait]
pub trait CatalogLoader: Send + Sync + std::fmt::Debug {
    /// Fetches every record.
    ///
    /// # Errors
    /// - `CatalogError::LoadFailed` - The catalog could not be fetched or decoded
    async fn load(&self) -> Result<Vec<CatalogRecord>, CatalogError>;
}

/// Loads the catalog from the `animes/` API endpoint.
#[derive(Debug, Clone)]
pub struct HttpCatalogLoader {
    transport: Arc<dyn HttpTransport>,
    url: String,
    headers: RequestHeaders,
}

impl HttpCatalogLoader {
    pub fn new(transport: Arc<dyn HttpTransport>, api_base_url: &str, headers: RequestHeaders) -> Self {
        Self {
            transport,
            url: format!("{}/animes/", api_base_url.trim_end_matches('/')),
            headers,
        }
    }
}

#[async_trait]
impl CatalogLoader for HttpCatalogLoader {
    async fn load(&self) -> Result<Vec<CatalogRecord>, CatalogError> {
        fetch_json(self.transport.as_ref(), &self.url, &self.headers)
            .await
            .map_err(|e| CatalogError::LoadFailed {
                reason: e.to_string(),
            })
    }
}

/// One window of an ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next_page: bool,
}

/// Slices `items` into 1-based windows of `page_size`.
///
/// Page 0 is treated as page 1. `has_next_page` is true iff more items
/// follow the requested window.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let start = (page - 1).saturating_mul(page_size);
    let has_next_page = items.len() > page.saturating_mul(page_size);

    Page {
        items: items.into_iter().skip(start).take(page_size).collect(),
        has_next_page,
    }
}

/// In-memory catalog with a load-once guard.
///
/// The first caller triggers the load; concurrent callers wait for it.
/// A failed load is not cached, so a later call retries.
#[derive(Debug)]
pub struct CatalogStore {
    loader: Box<dyn CatalogLoader>,
    records: OnceCell<Vec<CatalogRecord>>,
    popular: OnceLock<Vec<usize>>,
    page_size: usize,
}

impl CatalogStore {
    pub fn new(loader: Box<dyn CatalogLoader>, page_size: usize) -> Self {
        Self {
            loader,
            records: OnceCell::new(),
            popular: OnceLock::new(),
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Returns the catalog, loading it on first use.
    ///
    /// # Errors
    /// - `CatalogError::LoadFailed` - The loader failed
    pub async fn load(&self) -> Result<&[CatalogRecord], CatalogError> {
        let records = self
            .records
            .get_or_try_init(|| async {
                let records = self.loader.load().await?;
                info!("Loaded catalog with {} record(s)", records.len());
                Ok::<_, CatalogError>(records)
            })
            .await?;

        Ok(records.as_slice())
    }

    /// Finds the record whose original title derives to `slug`.
    ///
    /// # Errors
    /// - `CatalogError::SlugNotFound` - No record has that slug
    /// - `CatalogError::LoadFailed` - The catalog could not be loaded
    pub async fn find_by_slug(&self, slug: &str) -> Result<&CatalogRecord, CatalogError> {
        self.load()
            .await?
            .iter()
            .find(|record| title_to_slug(&record.original_title) == slug)
            .ok_or_else(|| CatalogError::SlugNotFound {
                slug: slug.to_string(),
            })
    }

    /// Returns every record matching `query`, in catalog order.
    ///
    /// Titles, the original title and alternate titles are matched
    /// case-insensitively; the slug of the original title is matched too,
    /// so a dashed query finds its record even when no title contains it.
    ///
    /// # Errors
    /// - `CatalogError::LoadFailed` - The catalog could not be loaded
    pub async fn search(&self, query: &str) -> Result<Vec<&CatalogRecord>, CatalogError> {
        let needle = query.trim().to_lowercase();
        let matches: Vec<&CatalogRecord> = self
            .load()
            .await?
            .iter()
            .filter(|record| record_matches(record, &needle))
            .collect();

        debug!("Search '{}' matched {} record(s)", query, matches.len());
        Ok(matches)
    }

    /// Returns one window of the catalog in the requested ordering.
    ///
    /// # Errors
    /// - `CatalogError::LoadFailed` - The catalog could not be loaded
    pub async fn list(
        &self,
        ordering: CatalogOrdering,
        page: usize,
    ) -> Result<Page<&CatalogRecord>, CatalogError> {
        let records = self.load().await?;
        let ordered: Vec<&CatalogRecord> = match ordering {
            CatalogOrdering::Popular => self
                .popular
                .get_or_init(|| popularity_order(records))
                .iter()
                .map(|&index| &records[index])
                .collect(),
            CatalogOrdering::Latest => records.iter().rev().collect(),
        };

        Ok(paginate(ordered, page, self.page_size))
    }
}

fn record_matches(record: &CatalogRecord, needle: &str) -> bool {
    let contains = |title: &str| title.to_lowercase().contains(needle);

    contains(&record.title)
        || contains(&record.original_title)
        || record.alternate_titles.iter().any(contains)
        || title_to_slug(&record.original_title).contains(needle)
}

/// Record indices sorted by rating descending; equal ratings keep catalog order.
fn popularity_order(records: &[CatalogRecord]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by(|&a, &b| records[b].note.total_cmp(&records[a].note));
    order
}
