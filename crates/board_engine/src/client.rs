use std::sync::Arc;

use board_core::{
    constituents_from_table, first_table, normalize_constituent_table, parse_board_info,
    parse_index_code, BoardDescriptor, BoardInfoItem, BoardKind, CatalogEntry, ConstituentRow,
    HtmlTableSource, IndexBar, Table,
};
use board_logging::board_info;
use chrono::{Datelike, Local};

use crate::catalog::Catalog;
use crate::collect::PaginatedCollector;
use crate::fetch::{Fetcher, PageRequest, ReqwestFetcher};
use crate::settings::BoardSettings;
use crate::token::{ScriptTokenProvider, TokenProvider};
use crate::{BoardError, NoopProgress, ProgressSink};

/// Entry point for every board operation.
///
/// Requests are issued one after another; nothing here runs concurrently.
pub struct BoardClient {
    settings: BoardSettings,
    fetcher: Arc<dyn Fetcher>,
    tokens: Arc<dyn TokenProvider>,
    progress: Arc<dyn ProgressSink>,
    catalog: Catalog,
}

impl BoardClient {
    /// Client backed by reqwest and the configured (or bundled) token script.
    pub fn new(settings: BoardSettings) -> Result<Self, BoardError> {
        settings.validate()?;
        let tokens = match settings.token_script.as_deref() {
            Some(path) => ScriptTokenProvider::from_path(path)?,
            None => ScriptTokenProvider::bundled(),
        };
        let fetcher = ReqwestFetcher::new(settings.fetch_settings());
        Ok(Self::with_parts(settings, Arc::new(fetcher), Arc::new(tokens)))
    }

    pub fn with_parts(
        settings: BoardSettings,
        fetcher: Arc<dyn Fetcher>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        let catalog = Catalog::new(settings.catalog_policy);
        Self {
            settings,
            fetcher,
            tokens,
            progress: Arc::new(NoopProgress),
            catalog,
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn settings(&self) -> &BoardSettings {
        &self.settings
    }

    fn collector(&self) -> PaginatedCollector<'_> {
        PaginatedCollector::new(self.fetcher.as_ref(), self.tokens.as_ref())
            .with_progress(self.progress.as_ref())
    }

    /// Every concept board: date, name, constituent count and code.
    pub async fn concept_catalog(&self) -> Result<Vec<CatalogEntry>, BoardError> {
        let entries = self.catalog.entries(&self.collector(), &self.settings).await?;
        Ok(entries.as_ref().clone())
    }

    /// Resolve a concept board display name to its descriptor.
    pub async fn resolve(&self, display_name: &str) -> Result<BoardDescriptor, BoardError> {
        self.catalog
            .resolve(&self.collector(), &self.settings, display_name)
            .await
    }

    /// Forget a cached catalog (no-op under the re-fetch policy).
    pub fn invalidate_catalog(&self) {
        self.catalog.invalidate();
    }

    /// Constituents of the concept board named `display_name`.
    pub async fn concept_constituents(
        &self,
        display_name: &str,
    ) -> Result<Vec<ConstituentRow>, BoardError> {
        let board = self.resolve(display_name).await?;
        self.board_constituents(&board.internal_code, BoardKind::Concept)
            .await
    }

    /// Constituents of a concept or industry board given its code.
    pub async fn board_constituents(
        &self,
        code: &str,
        kind: BoardKind,
    ) -> Result<Vec<ConstituentRow>, BoardError> {
        let pages = self
            .collector()
            .collect_pages(
                |page| self.settings.constituents_page_url(kind, code, page),
                |raw| first_table(&raw.html_content),
            )
            .await?;

        let merged = pages.into_iter().fold(Table::default(), |mut acc, page| {
            acc.append(page);
            acc
        });
        let rows = constituents_from_table(&normalize_constituent_table(merged)?)?;
        board_info!("{:?} board {} has {} constituents", kind, code, rows.len());
        Ok(rows)
    }

    /// Introduction block of the concept board named `display_name`.
    pub async fn concept_info(&self, display_name: &str) -> Result<Vec<BoardInfoItem>, BoardError> {
        let board = self.resolve(display_name).await?;
        let html = self
            .fetch_plain(&self.settings.board_page_url(BoardKind::Concept, &board.internal_code))
            .await?;
        Ok(parse_board_info(&HtmlTableSource::parse(&html))?)
    }

    /// Daily index bars of a concept board from `start_year` through the
    /// current calendar year.
    pub async fn concept_history(
        &self,
        display_name: &str,
        start_year: i32,
    ) -> Result<Vec<IndexBar>, BoardError> {
        let current_year = Local::now().year();
        self.concept_history_until(display_name, start_year, current_year)
            .await
    }

    /// Daily index bars for `start_year..=end_year`. Years without data are
    /// skipped, so the result may have gaps.
    pub async fn concept_history_until(
        &self,
        display_name: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<IndexBar>, BoardError> {
        let board = self.resolve(display_name).await?;
        let board_page = self
            .fetch_plain(&self.settings.board_page_url(BoardKind::Concept, &board.internal_code))
            .await?;
        let index_code = parse_index_code(&HtmlTableSource::parse(&board_page))?;
        board_info!(
            "index line for {} ({}) years {}..={}",
            display_name,
            index_code,
            start_year,
            end_year
        );

        self.collector()
            .collect_years(
                start_year..=end_year,
                |year| self.settings.year_line_url(&index_code, year),
                self.settings.referer(),
            )
            .await
    }

    /// Ungated GET, used for board detail pages.
    async fn fetch_plain(&self, url: &str) -> Result<String, BoardError> {
        let output = self.fetcher.fetch(&PageRequest::new(url)).await?;
        Ok(output.text()?)
    }
}
