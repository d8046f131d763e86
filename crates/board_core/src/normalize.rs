//! Column cleanup and type coercion for scraped listings.

use crate::error::ParseError;
use crate::model::{BoardInfoItem, ConstituentRow};
use crate::table::{Table, TableSource};

pub const CODE_WIDTH: usize = 6;

/// Columns that only exist for the site's UI.
pub const DROPPED_COLUMNS: &[&str] = &["加自选"];

const PERCENT_SUFFIX: &str = "(%)";

const COL_CODE: &str = "代码";
const COL_NAME: &str = "名称";
const COL_PRICE: &str = "现价";
const COL_CHANGE_PCT: &str = "涨跌幅";
const COL_CHANGE: &str = "涨跌";
const COL_SPEED: &str = "涨速";
const COL_TURNOVER: &str = "换手";
const COL_VOLUME_RATIO: &str = "量比";
const COL_AMPLITUDE: &str = "振幅";
const COL_AMOUNT: &str = "成交额";
const COL_FLOAT_SHARES: &str = "流通股";
const COL_FLOAT_CAP: &str = "流通市值";
const COL_PE: &str = "市盈率";

const BOARD_INFO_PAIRS: &str = "div.board-infos dl";

/// `涨跌幅(%)` -> `涨跌幅`; other headers are returned unchanged.
pub fn strip_percent_suffix(header: &str) -> String {
    header
        .trim()
        .strip_suffix(PERCENT_SUFFIX)
        .unwrap_or(header.trim())
        .to_string()
}

/// Left-pad a numeric stock code with zeros to six digits.
pub fn pad_code(raw: &str) -> Result<String, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.len() > CODE_WIDTH
        || !trimmed.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ParseError::InvalidCode(raw.to_string()));
    }
    Ok(format!("{trimmed:0>width$}", width = CODE_WIDTH))
}

/// Parse a numeric cell. `--` and blanks are missing values; `万`/`亿`
/// suffixes scale by 1e4/1e8; a trailing `%` and thousands separators are
/// ignored.
pub fn parse_number(column: &str, raw: &str) -> Result<Option<f64>, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '-') {
        return Ok(None);
    }

    let cleaned: String = trimmed.trim_end_matches('%').replace(',', "");
    let (digits, scale) = if let Some(rest) = cleaned.strip_suffix('亿') {
        (rest, 1e8)
    } else if let Some(rest) = cleaned.strip_suffix('万') {
        (rest, 1e4)
    } else {
        (cleaned.as_str(), 1.0)
    };

    digits
        .trim()
        .parse::<f64>()
        .map(|v| Some(v * scale))
        .map_err(|_| ParseError::InvalidNumber {
            column: column.to_string(),
            value: raw.to_string(),
        })
}

/// Rename percentage headers, drop UI-only columns and pad the code column.
pub fn normalize_constituent_table(table: Table) -> Result<Table, ParseError> {
    let keep: Vec<bool> = table
        .headers
        .iter()
        .map(|h| !DROPPED_COLUMNS.contains(&h.trim()))
        .collect();

    let headers: Vec<String> = table
        .headers
        .iter()
        .zip(&keep)
        .filter(|(_, keep)| **keep)
        .map(|(h, _)| strip_percent_suffix(h))
        .collect();
    let code_idx = headers.iter().position(|h| h == COL_CODE);

    let mut rows = Vec::with_capacity(table.rows.len());
    for row in table.rows {
        let mut cells: Vec<String> = row
            .into_iter()
            .enumerate()
            .filter(|(i, _)| keep.get(*i).copied().unwrap_or(true))
            .map(|(_, cell)| cell)
            .collect();
        if let Some(idx) = code_idx {
            if let Some(code) = cells.get_mut(idx) {
                *code = pad_code(code)?;
            }
        }
        rows.push(cells);
    }

    Ok(Table { headers, rows })
}

/// Typed rows from a table already passed through [`normalize_constituent_table`].
///
/// `代码` and `名称` are required; any other column may be absent.
pub fn constituents_from_table(table: &Table) -> Result<Vec<ConstituentRow>, ParseError> {
    let code_idx = table.require_column(COL_CODE)?;
    let name_idx = table.require_column(COL_NAME)?;

    let number = |row: usize, column: &str| -> Result<Option<f64>, ParseError> {
        match table.column_index(column) {
            Some(idx) => parse_number(column, table.cell(row, idx)),
            None => Ok(None),
        }
    };

    (0..table.len())
        .map(|row| {
            Ok(ConstituentRow {
                code: pad_code(table.cell(row, code_idx))?,
                name: table.cell(row, name_idx).to_string(),
                price: number(row, COL_PRICE)?,
                change_pct: number(row, COL_CHANGE_PCT)?,
                change: number(row, COL_CHANGE)?,
                speed_pct: number(row, COL_SPEED)?,
                turnover_pct: number(row, COL_TURNOVER)?,
                volume_ratio: number(row, COL_VOLUME_RATIO)?,
                amplitude_pct: number(row, COL_AMPLITUDE)?,
                amount: number(row, COL_AMOUNT)?,
                float_shares: number(row, COL_FLOAT_SHARES)?,
                float_market_cap: number(row, COL_FLOAT_CAP)?,
                pe_ratio: number(row, COL_PE)?,
            })
        })
        .collect()
}

/// `dt`/`dd` pairs of the board introduction block. Multi-line values are
/// joined with `/`.
pub fn parse_board_info<S>(source: &S) -> Result<Vec<BoardInfoItem>, ParseError>
where
    S: TableSource + ?Sized,
{
    Ok(source
        .locate(BOARD_INFO_PAIRS)?
        .into_iter()
        .filter_map(|row| match row.as_slice() {
            [item, value, ..] => Some(BoardInfoItem {
                item: item.clone(),
                value: value.replace('\n', "/"),
            }),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_short_codes() {
        assert_eq!(pad_code("1").unwrap(), "000001");
        assert_eq!(pad_code(" 600519 ").unwrap(), "600519");
        assert!(pad_code("60051A").is_err());
        assert!(pad_code("1234567").is_err());
    }

    #[test]
    fn numbers_with_units_and_placeholders() {
        assert_eq!(parse_number("x", "--").unwrap(), None);
        assert_eq!(parse_number("x", "1.5亿").unwrap(), Some(1.5e8));
        assert_eq!(parse_number("x", "12万").unwrap(), Some(120_000.0));
        assert_eq!(parse_number("x", "-3.20").unwrap(), Some(-3.2));
        assert_eq!(parse_number("x", "1,234.5").unwrap(), Some(1234.5));
        assert!(parse_number("x", "abc").is_err());
    }

    #[test]
    fn percent_suffix_is_stripped() {
        assert_eq!(strip_percent_suffix("涨跌幅(%)"), "涨跌幅");
        assert_eq!(strip_percent_suffix("名称"), "名称");
    }
}
