use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::ParseError;
use crate::model::{BoardDescriptor, CatalogEntry};
use crate::table::{Table, TableSource};

/// Container of one catalog listing page.
pub const CATALOG_TABLE: &str = "table.m-table.m-pager-table";

const COL_DATE: &str = "日期";
const COL_NAME: &str = "概念名称";
const COL_COUNT: &str = "成分股数量";

/// Entries of one catalog listing page, in page order.
///
/// The first located row is the header. The board link sits in the second
/// cell of each body row; its last path segment is the board code.
pub fn parse_catalog_page<S>(source: &S) -> Result<Vec<CatalogEntry>, ParseError>
where
    S: TableSource + ?Sized,
{
    let mut rows = source.locate(CATALOG_TABLE)?.into_iter();
    let table = Table {
        headers: rows.next().unwrap_or_default(),
        rows: rows.collect(),
    };
    let date_idx = table.require_column(COL_DATE)?;
    let name_idx = table.require_column(COL_NAME)?;
    let count_idx = table.require_column(COL_COUNT)?;

    let link_selector = format!("{CATALOG_TABLE} tbody tr > td:nth-child(2) a");
    let links = source.attributes(&link_selector, "href")?;
    if links.len() != table.len() {
        return Err(ParseError::MissingAttribute {
            selector: link_selector,
            attribute: "href".to_string(),
        });
    }

    links
        .into_iter()
        .enumerate()
        .map(|(row, source_url)| {
            let count_raw = table.cell(row, count_idx);
            Ok(CatalogEntry {
                date: parse_listing_date(table.cell(row, date_idx))?,
                concept_name: table.cell(row, name_idx).to_string(),
                constituent_count: count_raw.trim().parse().map_err(|_| {
                    ParseError::InvalidNumber {
                        column: COL_COUNT.to_string(),
                        value: count_raw.to_string(),
                    }
                })?,
                code: code_from_url(&source_url)?,
                source_url,
            })
        })
        .collect()
}

/// `http://q.10jqka.com.cn/gn/detail/code/301558/` -> `301558`.
pub fn code_from_url(url: &str) -> Result<String, ParseError> {
    url.trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
        .map(str::to_string)
        .ok_or_else(|| ParseError::InvalidCode(url.to_string()))
}

fn parse_listing_date(raw: &str) -> Result<NaiveDate, ParseError> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y%m%d"))
        .map_err(|_| ParseError::InvalidDate(raw.to_string()))
}

/// In-memory name -> board mapping built from catalog entries.
///
/// A name listed twice maps to its last occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogIndex {
    by_name: BTreeMap<String, BoardDescriptor>,
}

impl CatalogIndex {
    pub fn from_entries(entries: &[CatalogEntry]) -> Self {
        let by_name = entries
            .iter()
            .map(|entry| (entry.concept_name.clone(), entry.descriptor()))
            .collect();
        Self { by_name }
    }

    pub fn resolve(&self, display_name: &str) -> Option<&BoardDescriptor> {
        self.by_name.get(display_name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }
}
