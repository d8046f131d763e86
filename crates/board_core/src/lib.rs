//! Board core: IO-free parsing and normalization of board listings.
mod catalog;
mod error;
mod history;
mod model;
mod normalize;
mod pagination;
mod table;

pub use catalog::{code_from_url, parse_catalog_page, CatalogIndex, CATALOG_TABLE};
pub use error::ParseError;
pub use history::{classify_year_blob, decode_year_blob, parse_index_code, BarLayout};
pub use model::{
    BoardDescriptor, BoardInfoItem, BoardKind, CatalogEntry, ConstituentRow, IndexBar, PageCount,
    RawPage, YearBlob,
};
pub use normalize::{
    constituents_from_table, normalize_constituent_table, pad_code, parse_board_info,
    parse_number, strip_percent_suffix, CODE_WIDTH, DROPPED_COLUMNS,
};
pub use pagination::{probe_page_count, MAX_PAGE_COUNT};
pub use table::{extract_tables, first_table, HtmlTableSource, Table, TableSource};
