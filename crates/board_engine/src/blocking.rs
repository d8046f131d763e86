use board_core::{BoardDescriptor, BoardInfoItem, BoardKind, CatalogEntry, ConstituentRow, IndexBar};
use tokio::runtime::{Builder, Runtime};

use crate::client::BoardClient;
use crate::settings::BoardSettings;
use crate::BoardError;

/// Blocking front of [`BoardClient`]: each call runs to completion on a
/// private current-thread runtime before returning.
pub struct BlockingBoardClient {
    runtime: Runtime,
    inner: BoardClient,
}

impl BlockingBoardClient {
    pub fn new(settings: BoardSettings) -> Result<Self, BoardError> {
        Self::from_client(BoardClient::new(settings)?)
    }

    pub fn from_client(inner: BoardClient) -> Result<Self, BoardError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| BoardError::Runtime(err.to_string()))?;
        Ok(Self { runtime, inner })
    }

    pub fn client(&self) -> &BoardClient {
        &self.inner
    }

    pub fn concept_catalog(&self) -> Result<Vec<CatalogEntry>, BoardError> {
        self.runtime.block_on(self.inner.concept_catalog())
    }

    pub fn resolve(&self, display_name: &str) -> Result<BoardDescriptor, BoardError> {
        self.runtime.block_on(self.inner.resolve(display_name))
    }

    pub fn invalidate_catalog(&self) {
        self.inner.invalidate_catalog();
    }

    pub fn concept_constituents(&self, display_name: &str) -> Result<Vec<ConstituentRow>, BoardError> {
        self.runtime
            .block_on(self.inner.concept_constituents(display_name))
    }

    pub fn board_constituents(
        &self,
        code: &str,
        kind: BoardKind,
    ) -> Result<Vec<ConstituentRow>, BoardError> {
        self.runtime
            .block_on(self.inner.board_constituents(code, kind))
    }

    pub fn concept_info(&self, display_name: &str) -> Result<Vec<BoardInfoItem>, BoardError> {
        self.runtime.block_on(self.inner.concept_info(display_name))
    }

    pub fn concept_history(
        &self,
        display_name: &str,
        start_year: i32,
    ) -> Result<Vec<IndexBar>, BoardError> {
        self.runtime
            .block_on(self.inner.concept_history(display_name, start_year))
    }

    pub fn concept_history_until(
        &self,
        display_name: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<IndexBar>, BoardError> {
        self.runtime.block_on(
            self.inner
                .concept_history_until(display_name, start_year, end_year),
        )
    }
}
