use std::sync::{Arc, Mutex, PoisonError};

use board_core::{
    parse_catalog_page, BoardDescriptor, CatalogEntry, CatalogIndex, HtmlTableSource,
};
use board_logging::board_info;
use serde::{Deserialize, Serialize};

use crate::collect::PaginatedCollector;
use crate::settings::BoardSettings;
use crate::BoardError;

/// Whether a fetched catalog is kept between resolutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CatalogPolicy {
    /// Re-fetch the full listing for every lookup.
    #[default]
    Refetch,
    /// Keep the last listing until [`Catalog::invalidate`] is called.
    Cached,
}

/// Concept board catalog: the paginated listing of every concept board.
#[derive(Debug)]
pub struct Catalog {
    policy: CatalogPolicy,
    cached: Mutex<Option<Arc<Vec<CatalogEntry>>>>,
}

impl Catalog {
    pub fn new(policy: CatalogPolicy) -> Self {
        Self {
            policy,
            cached: Mutex::new(None),
        }
    }

    pub fn policy(&self) -> CatalogPolicy {
        self.policy
    }

    /// All catalog entries in listing order.
    pub async fn entries(
        &self,
        collector: &PaginatedCollector<'_>,
        settings: &BoardSettings,
    ) -> Result<Arc<Vec<CatalogEntry>>, BoardError> {
        if self.policy == CatalogPolicy::Cached {
            if let Some(entries) = self.lock().as_ref() {
                return Ok(Arc::clone(entries));
            }
        }

        let pages = collector
            .collect_pages(
                |page| settings.catalog_page_url(page),
                |raw| parse_catalog_page(&HtmlTableSource::parse(&raw.html_content)),
            )
            .await?;
        let entries: Arc<Vec<CatalogEntry>> = Arc::new(pages.into_iter().flatten().collect());
        board_info!("catalog refreshed with {} boards", entries.len());

        if self.policy == CatalogPolicy::Cached {
            *self.lock() = Some(Arc::clone(&entries));
        }
        Ok(entries)
    }

    /// Look a board up by its display name.
    pub async fn resolve(
        &self,
        collector: &PaginatedCollector<'_>,
        settings: &BoardSettings,
        display_name: &str,
    ) -> Result<BoardDescriptor, BoardError> {
        let entries = self.entries(collector, settings).await?;
        CatalogIndex::from_entries(&entries)
            .resolve(display_name)
            .cloned()
            .ok_or_else(|| BoardError::NotFound {
                name: display_name.to_string(),
            })
    }

    /// Drop a cached listing so the next lookup re-fetches it.
    pub fn invalidate(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Arc<Vec<CatalogEntry>>>> {
        self.cached.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(CatalogPolicy::default())
    }
}
