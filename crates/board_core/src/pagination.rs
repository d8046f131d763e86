use crate::error::ParseError;
use crate::model::PageCount;
use crate::table::TableSource;

const PAGE_ANCHOR: &str = "a.changePage";
const PAGE_INFO: &str = "span.page_info";

/// Highest page count a listing may announce. The largest real listing (the
/// concept catalog) spans a few dozen pages.
pub const MAX_PAGE_COUNT: usize = 1_000;

/// Work out how many pages a listing has from its first page.
///
/// The last `a.changePage` anchor carries the highest page number in its
/// `page` attribute. Listings without anchors may still show a
/// `span.page_info` of the form `current/total`. Neither present means the
/// whole listing is on this page. A count above [`MAX_PAGE_COUNT`] is
/// rejected.
pub fn probe_page_count<S>(source: &S) -> Result<PageCount, ParseError>
where
    S: TableSource + ?Sized,
{
    let from_anchor = source
        .attributes(PAGE_ANCHOR, "page")?
        .last()
        .and_then(|page| page.parse::<usize>().ok());

    let total = match from_anchor {
        Some(total) => Some(total),
        None => source
            .locate(PAGE_INFO)
            .ok()
            .and_then(|rows| rows.into_iter().flatten().next())
            .and_then(|text| parse_page_info(&text)),
    };

    match total {
        Some(count) if count > MAX_PAGE_COUNT => Err(ParseError::PageCountOutOfRange {
            count,
            max: MAX_PAGE_COUNT,
        }),
        Some(count) => Ok(PageCount::Known(count)),
        None => Ok(PageCount::SingleBoard),
    }
}

fn parse_page_info(text: &str) -> Option<usize> {
    let (_, total) = text.split_once('/')?;
    total.trim().parse().ok()
}
