use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::error::ParseError;

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("table selector"));
static THEAD: Lazy<Selector> = Lazy::new(|| Selector::parse("thead").expect("thead selector"));
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("tr selector"));

/// Untyped table: header texts plus body rows of cell texts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, ParseError> {
        self.column_index(name)
            .ok_or_else(|| ParseError::MissingColumn(name.to_string()))
    }

    /// Append the rows of `other`, keeping their order. Headers are taken from
    /// the first non-empty side.
    pub fn append(&mut self, other: Table) {
        if self.headers.is_empty() {
            self.headers = other.headers;
        }
        self.rows.extend(other.rows);
    }

    /// Cell at `row`/`column`, empty string when the row is short.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Something rows can be located in by a CSS-like selector.
///
/// The portal's listing markup changes over time; the catalog, pager and
/// board page parsers only go through this seam, so the locating strategy can
/// be swapped per site structure.
pub trait TableSource {
    /// Rows under every element matching `selector`, in document order.
    ///
    /// A match containing `tr` rows contributes those rows. Any other match
    /// contributes one row of its `td`/`th`/`dt`/`dd` children, or of its own
    /// text when it has none. Cell texts keep line breaks between non-blank
    /// lines, each line trimmed. No match is [`ParseError::MissingElement`].
    fn locate(&self, selector: &str) -> Result<Vec<Vec<String>>, ParseError>;

    /// Trimmed values of `attribute` on the matching elements that carry it.
    fn attributes(&self, selector: &str, attribute: &str) -> Result<Vec<String>, ParseError>;
}

/// `scraper` backed [`TableSource`] over one parsed HTML document.
pub struct HtmlTableSource {
    document: Html,
}

impl HtmlTableSource {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// All `<table>` elements in document order.
    pub fn tables(&self) -> Vec<Table> {
        self.document.select(&TABLE).map(table_from_element).collect()
    }
}

impl TableSource for HtmlTableSource {
    fn locate(&self, selector: &str) -> Result<Vec<Vec<String>>, ParseError> {
        let parsed = parse_selector(selector)?;
        let mut matched = self.document.select(&parsed).peekable();
        if matched.peek().is_none() {
            return Err(ParseError::missing(selector));
        }
        Ok(matched.flat_map(located_rows).collect())
    }

    fn attributes(&self, selector: &str, attribute: &str) -> Result<Vec<String>, ParseError> {
        let parsed = parse_selector(selector)?;
        Ok(self
            .document
            .select(&parsed)
            .filter_map(|element| element.value().attr(attribute))
            .map(|value| value.trim().to_string())
            .collect())
    }
}

/// Every table of `html`, in document order.
pub fn extract_tables(html: &str) -> Vec<Table> {
    HtmlTableSource::parse(html).tables()
}

/// The first `<table>` of `html`.
pub fn first_table(html: &str) -> Result<Table, ParseError> {
    extract_tables(html)
        .into_iter()
        .next()
        .ok_or_else(|| ParseError::missing("table"))
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|_| ParseError::InvalidSelector(selector.to_string()))
}

/// Header row comes from `thead`, or from a leading row made only of `th`.
fn table_from_element(table: ElementRef<'_>) -> Table {
    let mut headers = table
        .select(&THEAD)
        .next()
        .and_then(|thead| thead.select(&ROW).next())
        .map(row_cells)
        .unwrap_or_default();

    let mut rows = Vec::new();
    for tr in table.select(&ROW) {
        if inside_thead(tr) {
            continue;
        }
        if headers.is_empty() && rows.is_empty() && is_header_row(tr) {
            headers = row_cells(tr);
            continue;
        }
        let cells = row_cells(tr);
        if !cells.is_empty() {
            rows.push(cells);
        }
    }

    Table { headers, rows }
}

fn cell_text(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn located_rows(element: ElementRef<'_>) -> Vec<Vec<String>> {
    let rows: Vec<Vec<String>> = element
        .select(&ROW)
        .map(|tr| cells_of(tr).map(cell_lines).collect())
        .collect();
    if !rows.is_empty() {
        return rows;
    }

    let cells: Vec<String> = element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|e| matches!(e.value().name(), "td" | "th" | "dt" | "dd"))
        .map(cell_lines)
        .collect();
    if cells.is_empty() {
        vec![vec![cell_lines(element)]]
    } else {
        vec![cells]
    }
}

fn cell_lines(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn row_cells(tr: ElementRef<'_>) -> Vec<String> {
    cells_of(tr).map(cell_text).collect()
}

fn cells_of<'a>(tr: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    tr.children()
        .filter_map(ElementRef::wrap)
        .filter(|e| matches!(e.value().name(), "td" | "th"))
}

fn is_header_row(tr: ElementRef<'_>) -> bool {
    let mut cells = cells_of(tr).peekable();
    cells.peek().is_some() && cells.all(|c| c.value().name() == "th")
}

fn inside_thead(tr: ElementRef<'_>) -> bool {
    tr.ancestors()
        .filter_map(|node| node.value().as_element().map(|e| e.name() == "thead"))
        .any(|is_thead| is_thead)
}
