//! Decoding of the yearly index line payloads.
//!
//! A year is served as a JSONP-like script:
//! `quotebridge_v4_line_bk_885xxx_01_2021({"data":"20210104,1.0,...;20210105,...", ...})`.
//! Records are separated by `;`, fields by `,`. Depending on the vintage of
//! the server response a record has 11 or 12 fields; only the first seven
//! are meaningful.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::ParseError;
use crate::model::{IndexBar, YearBlob};
use crate::table::TableSource;

const BOARD_HQ: &str = "div.board-hq span";

/// Field layout of one record, keyed by its field count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarLayout {
    Eleven,
    Twelve,
}

impl BarLayout {
    pub fn from_field_count(count: usize) -> Option<Self> {
        match count {
            11 => Some(BarLayout::Eleven),
            12 => Some(BarLayout::Twelve),
            _ => None,
        }
    }

    pub fn field_count(self) -> usize {
        match self {
            BarLayout::Eleven => 11,
            BarLayout::Twelve => 12,
        }
    }

    /// Map the leading `[date, open, high, low, close, volume, turnover]`
    /// fields; the trailing ones are ignored in both layouts.
    fn decode(self, fields: &[&str]) -> Result<IndexBar, ParseError> {
        debug_assert_eq!(fields.len(), self.field_count());
        Ok(IndexBar {
            date: parse_bar_date(fields[0])?,
            open: parse_field("open", fields[1])?,
            high: parse_field("high", fields[2])?,
            low: parse_field("low", fields[3])?,
            close: parse_field("close", fields[4])?,
            volume: parse_field("volume", fields[5])?,
            turnover: parse_field("turnover", fields[6])?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LinePayload {
    data: String,
}

/// Decode one year of bars. Any malformed record fails the whole year.
pub fn decode_year_blob(body: &str) -> Result<Vec<IndexBar>, ParseError> {
    let payload = extract_payload(body)?;
    let parsed: LinePayload =
        json5::from_str(payload).map_err(|err| ParseError::Payload(err.to_string()))?;

    parsed
        .data
        .split(';')
        .map(str::trim)
        .filter(|record| !record.is_empty())
        .map(|record| {
            let fields: Vec<&str> = record.split(',').map(str::trim).collect();
            let layout = BarLayout::from_field_count(fields.len())
                .ok_or(ParseError::UnsupportedLayout(fields.len()))?;
            layout.decode(&fields)
        })
        .collect()
}

/// Like [`decode_year_blob`] but folds failures into [`YearBlob::Unavailable`].
pub fn classify_year_blob(body: &str) -> YearBlob {
    match decode_year_blob(body) {
        Ok(bars) => YearBlob::Decoded(bars),
        Err(err) => YearBlob::Unavailable {
            reason: err.to_string(),
        },
    }
}

/// Index code shown in the quote header of a board page, e.g. `885728`.
///
/// This differs from the catalog code and is what the line endpoint is keyed by.
pub fn parse_index_code<S>(source: &S) -> Result<String, ParseError>
where
    S: TableSource + ?Sized,
{
    source
        .locate(BOARD_HQ)?
        .into_iter()
        .flatten()
        .next()
        .filter(|code| !code.is_empty())
        .ok_or_else(|| ParseError::missing(BOARD_HQ))
}

/// The object literal between the first `{` and the last `}`.
fn extract_payload(body: &str) -> Result<&str, ParseError> {
    let start = body
        .find('{')
        .ok_or_else(|| ParseError::Payload("no object literal".to_string()))?;
    let end = body
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| ParseError::Payload("unterminated object literal".to_string()))?;
    Ok(&body[start..=end])
}

fn parse_bar_date(raw: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(raw, "%Y%m%d").map_err(|_| ParseError::InvalidDate(raw.to_string()))
}

fn parse_field(column: &str, raw: &str) -> Result<f64, ParseError> {
    raw.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
        column: column.to_string(),
        value: raw.to_string(),
    })
}
