use std::ops::RangeInclusive;

use board_core::{
    classify_year_blob, probe_page_count, HtmlTableSource, IndexBar, ParseError, RawPage, YearBlob,
};
use board_logging::{board_debug, board_info, board_warn};

use crate::decode::decode_body;
use crate::fetch::{Fetcher, PageRequest};
use crate::token::TokenProvider;
use crate::{BoardError, CollectProgress, CollectUnit, FailureKind, NoopProgress, ProgressSink};

static NOOP_PROGRESS: NoopProgress = NoopProgress;

/// Drives token acquisition, fetching and extraction across the pages of a
/// listing (or the years of an index line), strictly one request at a time.
///
/// Every request issued here is preceded by exactly one `get_token` call.
pub struct PaginatedCollector<'a> {
    fetcher: &'a dyn Fetcher,
    tokens: &'a dyn TokenProvider,
    progress: &'a dyn ProgressSink,
}

impl<'a> PaginatedCollector<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, tokens: &'a dyn TokenProvider) -> Self {
        Self {
            fetcher,
            tokens,
            progress: &NOOP_PROGRESS,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    /// Fetch one gated page with a freshly derived token.
    pub async fn fetch_page(&self, url: &str, page_number: usize) -> Result<RawPage, BoardError> {
        let token = self.tokens.get_token()?;
        board_debug!("fetching page {} from {}", page_number, url);
        let output = self
            .fetcher
            .fetch(&PageRequest::new(url).with_token(token))
            .await?;
        let decoded = decode_body(&output.bytes, output.metadata.content_type.as_deref())?;
        board_debug!(
            "page {} from {}: {} bytes as {}, {} redirect(s)",
            page_number,
            output.metadata.final_url,
            output.metadata.byte_len,
            decoded.encoding_label,
            output.metadata.redirect_count
        );
        Ok(RawPage {
            page_number,
            html_content: decoded.text,
        })
    }

    /// Collect every page of a listing.
    ///
    /// Page 1 is fetched first and probed for its page count; its body is
    /// reused, pages `2..=total` follow in order. The result holds one
    /// extraction per page, in page order. Extraction errors abort the run.
    pub async fn collect_pages<T, U, E>(&self, page_url: U, mut extract: E) -> Result<Vec<T>, BoardError>
    where
        U: Fn(usize) -> String,
        E: FnMut(&RawPage) -> Result<T, ParseError>,
    {
        let first = self.fetch_page(&page_url(1), 1).await?;
        let total = probe_page_count(&HtmlTableSource::parse(&first.html_content))?.total();
        board_info!("listing {} spans {} page(s)", page_url(1), total);

        let mut pages = Vec::new();
        pages.push(extract(&first)?);
        self.report(CollectUnit::Page, 1, 1, total, true);

        for page in 2..=total {
            let raw = self.fetch_page(&page_url(page), page).await?;
            pages.push(extract(&raw)?);
            self.report(CollectUnit::Page, page as i64, page, total, true);
        }

        Ok(pages)
    }

    /// Collect the yearly index lines for `years`, ascending.
    ///
    /// A year whose payload cannot be decoded, or whose response is rejected
    /// (non-success status, oversized body, unexpected content type),
    /// contributes nothing and the run continues. Transport failures still
    /// abort.
    pub async fn collect_years<U>(
        &self,
        years: RangeInclusive<i32>,
        year_url: U,
        referer: &str,
    ) -> Result<Vec<IndexBar>, BoardError>
    where
        U: Fn(i32) -> String,
    {
        let total = years.clone().count();
        let mut bars = Vec::new();

        for (done, year) in years.enumerate() {
            let token = self.tokens.get_token()?;
            let url = year_url(year);
            board_debug!("fetching index line {} from {}", year, url);
            let request = PageRequest::new(url).with_token(token).with_referer(referer);

            let blob = match self.fetcher.fetch(&request).await {
                Ok(output) => match output.text() {
                    Ok(body) => classify_year_blob(&body),
                    Err(err) => YearBlob::Unavailable {
                        reason: err.to_string(),
                    },
                },
                Err(err) if is_rejected_response(&err.kind) => {
                    YearBlob::Unavailable {
                        reason: err.to_string(),
                    }
                }
                Err(err) => return Err(err.into()),
            };

            let collected = match blob {
                YearBlob::Decoded(year_bars) => {
                    bars.extend(year_bars);
                    true
                }
                YearBlob::Unavailable { reason } => {
                    board_warn!("skipping index line for {}: {}", year, reason);
                    false
                }
            };
            self.report(CollectUnit::Year, year.into(), done + 1, total, collected);
        }

        Ok(bars)
    }

    fn report(&self, unit: CollectUnit, position: i64, done: usize, total: usize, collected: bool) {
        self.progress.emit(CollectProgress {
            unit,
            position,
            done,
            total,
            collected,
        });
    }
}

/// Failures that concern one response rather than the connection.
fn is_rejected_response(kind: &FailureKind) -> bool {
    matches!(
        kind,
        FailureKind::HttpStatus(_)
            | FailureKind::TooLarge { .. }
            | FailureKind::UnsupportedContentType { .. }
    )
}
