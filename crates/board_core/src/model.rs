use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which board family a code belongs to. Both families share the listing
/// markup but live under different URL prefixes and default sort fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoardKind {
    Concept,
    Industry,
}

impl BoardKind {
    /// URL path segment of the family, e.g. `gn` in `/gn/detail/...`.
    pub fn path_segment(self) -> &'static str {
        match self {
            BoardKind::Concept => "gn",
            BoardKind::Industry => "thshy",
        }
    }

    /// Sort field id the portal uses for constituent listings.
    pub fn listing_field(self) -> &'static str {
        match self {
            BoardKind::Concept => "264648",
            BoardKind::Industry => "199112",
        }
    }
}

/// A board as found in the catalog. Unique by `internal_code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardDescriptor {
    pub display_name: String,
    pub internal_code: String,
    pub source_url: String,
}

/// One row of the concept catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub date: NaiveDate,
    pub concept_name: String,
    pub constituent_count: u32,
    pub code: String,
    pub source_url: String,
}

impl CatalogEntry {
    pub fn descriptor(&self) -> BoardDescriptor {
        BoardDescriptor {
            display_name: self.concept_name.clone(),
            internal_code: self.code.clone(),
            source_url: self.source_url.clone(),
        }
    }
}

/// A page body as returned by the portal, before extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    pub page_number: usize,
    pub html_content: String,
}

/// One stock of a board's constituent listing.
///
/// Percentage columns carry the header name without its `(%)` suffix; cells
/// the portal renders as `--` are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstituentRow {
    /// Six digit, zero padded.
    pub code: String,
    pub name: String,
    pub price: Option<f64>,
    pub change_pct: Option<f64>,
    pub change: Option<f64>,
    pub speed_pct: Option<f64>,
    pub turnover_pct: Option<f64>,
    pub volume_ratio: Option<f64>,
    pub amplitude_pct: Option<f64>,
    pub amount: Option<f64>,
    pub float_shares: Option<f64>,
    pub float_market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
}

/// Key/value line of a board's introduction block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardInfoItem {
    pub item: String,
    pub value: String,
}

/// Daily bar of a board index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub turnover: f64,
}

/// Outcome of probing a listing page for pagination controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCount {
    Known(usize),
    /// No pagination controls: the listing fits on one page.
    SingleBoard,
}

impl PageCount {
    pub fn total(self) -> usize {
        match self {
            PageCount::Known(n) => n.max(1),
            PageCount::SingleBoard => 1,
        }
    }
}

/// Outcome of decoding one year of index data.
#[derive(Debug, Clone, PartialEq)]
pub enum YearBlob {
    Decoded(Vec<IndexBar>),
    /// The year yields no rows; `reason` is kept for logging only.
    Unavailable { reason: String },
}
