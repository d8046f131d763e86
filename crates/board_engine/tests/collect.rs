mod common;

use std::sync::Mutex;

use board_core::{first_table, BoardKind, ParseError, MAX_PAGE_COUNT};
use board_engine::{
    BoardError, CollectProgress, CollectUnit, FailureKind, PaginatedCollector, ProgressSink,
};
use common::{constituent_page, constituents_url, year_blob, year_url, CountingTokens, FakePortal};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct RecordingProgress {
    events: Mutex<Vec<CollectProgress>>,
}

impl RecordingProgress {
    fn take(&self) -> Vec<CollectProgress> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn emit(&self, progress: CollectProgress) {
        self.events.lock().unwrap().push(progress);
    }
}

fn concept_url(page: usize) -> String {
    let kind = BoardKind::Concept;
    constituents_url(kind.path_segment(), kind.listing_field(), "301558", page)
}

#[tokio::test]
async fn pages_are_collected_in_order_with_one_token_each() {
    common::init_logging();
    let portal = FakePortal::new();
    portal.serve(concept_url(1), constituent_page(&[("1", "平安银行")], Some(3)));
    portal.serve(concept_url(2), constituent_page(&[("2", "万科A")], Some(3)));
    portal.serve(concept_url(3), constituent_page(&[("600519", "贵州茅台")], Some(3)));
    let tokens = CountingTokens::default();
    let progress = RecordingProgress::default();

    let collector = PaginatedCollector::new(portal.as_ref(), &tokens).with_progress(&progress);
    let pages = collector
        .collect_pages(concept_url, |raw| first_table(&raw.html_content))
        .await
        .unwrap();

    let codes: Vec<&str> = pages.iter().map(|t| t.cell(0, 1)).collect();
    assert_eq!(codes, vec!["1", "2", "600519"]);
    assert_eq!(
        portal.requested_urls(),
        vec![concept_url(1), concept_url(2), concept_url(3)]
    );

    let cookies: Vec<Option<String>> = portal
        .requests()
        .iter()
        .map(|r| r.cookie_header())
        .collect();
    assert_eq!(
        cookies,
        vec![
            Some("v=tok-1".to_string()),
            Some("v=tok-2".to_string()),
            Some("v=tok-3".to_string()),
        ]
    );
    assert_eq!(tokens.calls(), 3);

    let done: Vec<(CollectUnit, usize, usize)> = progress
        .take()
        .into_iter()
        .map(|p| (p.unit, p.done, p.total))
        .collect();
    assert_eq!(
        done,
        vec![
            (CollectUnit::Page, 1, 3),
            (CollectUnit::Page, 2, 3),
            (CollectUnit::Page, 3, 3),
        ]
    );
}

#[tokio::test]
async fn listing_without_pager_costs_a_single_request() {
    let portal = FakePortal::new();
    portal.serve(
        concept_url(1),
        constituent_page(&[("1", "平安银行"), ("2", "万科A")], None),
    );
    let tokens = CountingTokens::default();

    let collector = PaginatedCollector::new(portal.as_ref(), &tokens);
    let pages = collector
        .collect_pages(concept_url, |raw| first_table(&raw.html_content))
        .await
        .unwrap();

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].len(), 2);
    assert_eq!(portal.requested_urls(), vec![concept_url(1)]);
    assert_eq!(tokens.calls(), 1);
}

#[tokio::test]
async fn absurd_page_count_is_rejected_without_further_requests() {
    let portal = FakePortal::new();
    let page = format!(
        "{}<a class=\"changePage\" page=\"{}\">尾页</a>",
        constituent_page(&[("1", "平安银行")], None),
        usize::MAX
    );
    portal.serve(concept_url(1), page);
    let tokens = CountingTokens::default();

    let collector = PaginatedCollector::new(portal.as_ref(), &tokens);
    let err = collector
        .collect_pages(concept_url, |raw| first_table(&raw.html_content))
        .await
        .unwrap_err();

    match err {
        BoardError::Parse(ParseError::PageCountOutOfRange { count, max }) => {
            assert_eq!(count, usize::MAX);
            assert_eq!(max, MAX_PAGE_COUNT);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(portal.requested_urls(), vec![concept_url(1)]);
}

#[tokio::test]
async fn extraction_failure_aborts_the_run() {
    let portal = FakePortal::new();
    portal.serve(concept_url(1), constituent_page(&[("1", "平安银行")], Some(2)));
    portal.serve(concept_url(2), "<html><body>验证</body></html>");
    let tokens = CountingTokens::default();

    let collector = PaginatedCollector::new(portal.as_ref(), &tokens);
    let err = collector
        .collect_pages(concept_url, |raw| first_table(&raw.html_content))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BoardError::Parse(ParseError::MissingElement { .. })
    ));
}

#[tokio::test]
async fn failed_page_surfaces_network_error() {
    let portal = FakePortal::new();
    portal.serve(concept_url(1), constituent_page(&[("1", "平安银行")], Some(2)));
    portal.fail(concept_url(2), FailureKind::HttpStatus(403));
    let tokens = CountingTokens::default();

    let collector = PaginatedCollector::new(portal.as_ref(), &tokens);
    let err = collector
        .collect_pages(concept_url, |raw| first_table(&raw.html_content))
        .await
        .unwrap_err();

    match err {
        BoardError::Network(fetch) => assert_eq!(fetch.kind, FailureKind::HttpStatus(403)),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn token_failure_stops_before_any_request() {
    let portal = FakePortal::new();
    let tokens = common::FailingTokens;

    let collector = PaginatedCollector::new(portal.as_ref(), &tokens);
    let err = collector
        .collect_pages(concept_url, |raw| first_table(&raw.html_content))
        .await
        .unwrap_err();

    assert!(matches!(err, BoardError::Script(_)));
    assert!(portal.requests().is_empty());
}

#[tokio::test]
async fn unavailable_years_are_skipped() {
    let portal = FakePortal::new();
    portal.serve(
        year_url("885728", 2019),
        year_blob("885728", 2019, &["20191230", "20191231"]),
    );
    // 2020 is not served at all and answers 404.
    portal.serve(year_url("885728", 2021), "<html>系统繁忙</html>");
    portal.serve(
        year_url("885728", 2022),
        year_blob("885728", 2022, &["20220104"]),
    );
    let tokens = CountingTokens::default();
    let progress = RecordingProgress::default();

    let collector = PaginatedCollector::new(portal.as_ref(), &tokens).with_progress(&progress);
    let bars = collector
        .collect_years(
            2019..=2022,
            |year| year_url("885728", year),
            "http://quote.test",
        )
        .await
        .unwrap();

    let dates: Vec<String> = bars.iter().map(|b| b.date.to_string()).collect();
    assert_eq!(dates, vec!["2019-12-30", "2019-12-31", "2022-01-04"]);
    assert_eq!(tokens.calls(), 4);
    assert!(portal
        .requests()
        .iter()
        .all(|r| r.referer.as_deref() == Some("http://quote.test") && r.token.is_some()));

    let collected: Vec<(i64, bool)> = progress
        .take()
        .into_iter()
        .map(|p| (p.position, p.collected))
        .collect();
    assert_eq!(
        collected,
        vec![(2019, true), (2020, false), (2021, false), (2022, true)]
    );
}

#[tokio::test]
async fn rejected_year_responses_are_skipped() {
    let portal = FakePortal::new();
    portal.fail(
        year_url("885728", 2020),
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11),
        },
    );
    portal.fail(
        year_url("885728", 2021),
        FailureKind::UnsupportedContentType {
            content_type: "image/png".to_string(),
        },
    );
    portal.serve(
        year_url("885728", 2022),
        year_blob("885728", 2022, &["20220104"]),
    );
    let tokens = CountingTokens::default();

    let collector = PaginatedCollector::new(portal.as_ref(), &tokens);
    let bars = collector
        .collect_years(2020..=2022, |year| year_url("885728", year), "http://quote.test")
        .await
        .unwrap();

    let dates: Vec<String> = bars.iter().map(|b| b.date.to_string()).collect();
    assert_eq!(dates, vec!["2022-01-04"]);
    assert_eq!(portal.requests().len(), 3);
}

#[tokio::test]
async fn transport_failure_aborts_year_collection() {
    let portal = FakePortal::new();
    portal.fail(year_url("885728", 2020), FailureKind::Timeout);
    let tokens = CountingTokens::default();

    let collector = PaginatedCollector::new(portal.as_ref(), &tokens);
    let err = collector
        .collect_years(2020..=2021, |year| year_url("885728", year), "http://quote.test")
        .await
        .unwrap_err();

    assert!(matches!(err, BoardError::Network(ref e) if e.kind == FailureKind::Timeout));
    assert_eq!(portal.requests().len(), 1);
}

#[tokio::test]
async fn empty_year_range_issues_no_requests() {
    let portal = FakePortal::new();
    let tokens = CountingTokens::default();

    let collector = PaginatedCollector::new(portal.as_ref(), &tokens);
    #[allow(clippy::reversed_empty_ranges)]
    let bars = collector
        .collect_years(2022..=2020, |year| year_url("885728", year), "http://quote.test")
        .await
        .unwrap();

    assert!(bars.is_empty());
    assert_eq!(tokens.calls(), 0);
}
