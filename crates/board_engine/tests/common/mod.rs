#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use board_engine::{
    BoardSettings, FailureKind, FetchError, FetchMetadata, FetchOutput, Fetcher, PageRequest,
    TokenError, TokenProvider,
};

pub const QUOTE_BASE: &str = "http://quote.test";
pub const LINE_BASE: &str = "http://line.test";

pub fn init_logging() {
    board_logging::initialize_for_tests();
}

pub fn test_settings() -> BoardSettings {
    BoardSettings {
        quote_base: QUOTE_BASE.to_string(),
        line_base: LINE_BASE.to_string(),
        ..BoardSettings::default()
    }
}

/// Hands out `tok-1`, `tok-2`, ... and counts calls.
#[derive(Default)]
pub struct CountingTokens {
    calls: AtomicUsize,
}

impl CountingTokens {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TokenProvider for CountingTokens {
    fn get_token(&self) -> Result<String, TokenError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("tok-{n}"))
    }
}

pub struct FailingTokens;

impl TokenProvider for FailingTokens {
    fn get_token(&self) -> Result<String, TokenError> {
        Err(TokenError::MissingFunction("v".to_string()))
    }
}

/// In-memory portal: URL -> canned response. Unknown URLs answer 404.
#[derive(Default)]
pub struct FakePortal {
    routes: Mutex<HashMap<String, Result<String, FetchError>>>,
    requests: Mutex<Vec<PageRequest>>,
}

impl FakePortal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn serve(&self, url: impl Into<String>, body: impl Into<String>) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.into(), Ok(body.into()));
    }

    pub fn fail(&self, url: impl Into<String>, kind: FailureKind) {
        let error = FetchError {
            message: kind.to_string(),
            kind,
        };
        self.routes.lock().unwrap().insert(url.into(), Err(error));
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

#[async_trait::async_trait]
impl Fetcher for FakePortal {
    async fn fetch(&self, request: &PageRequest) -> Result<FetchOutput, FetchError> {
        self.requests.lock().unwrap().push(request.clone());
        let route = self.routes.lock().unwrap().get(&request.url).cloned();
        let body = match route {
            Some(result) => result?,
            None => {
                return Err(FetchError {
                    kind: FailureKind::HttpStatus(404),
                    message: "404 Not Found".to_string(),
                })
            }
        };
        Ok(FetchOutput {
            metadata: FetchMetadata {
                original_url: request.url.clone(),
                final_url: request.url.clone(),
                redirect_count: 0,
                content_type: Some("text/html; charset=utf-8".to_string()),
                byte_len: body.len() as u64,
            },
            bytes: body.into_bytes(),
        })
    }
}

pub fn constituents_url(kind_segment: &str, field: &str, code: &str, page: usize) -> String {
    format!("{QUOTE_BASE}/{kind_segment}/detail/field/{field}/order/desc/page/{page}/ajax/1/code/{code}")
}

pub fn catalog_url(page: usize) -> String {
    format!("{QUOTE_BASE}/gn/index/field/addtime/order/desc/page/{page}/ajax/1/")
}

pub fn board_url(code: &str) -> String {
    format!("{QUOTE_BASE}/gn/detail/code/{code}/")
}

pub fn year_url(index_code: &str, year: i32) -> String {
    format!("{LINE_BASE}/v4/line/bk_{index_code}/01/{year}.js")
}

/// Constituent listing page. `last_page` adds pagination anchors.
pub fn constituent_page(rows: &[(&str, &str)], last_page: Option<usize>) -> String {
    let body: String = rows
        .iter()
        .enumerate()
        .map(|(i, (code, name))| {
            format!(
                "<tr><td>{}</td><td><a href=\"#\">{code}</a></td><td>{name}</td><td>10.00</td>\
                 <td>1.00</td><td>0.10</td><td>0.00</td><td>2.00</td><td>1.1</td><td>3.0</td>\
                 <td>1.2亿</td><td>5.0亿</td><td>50.0亿</td><td>30.5</td><td>+</td></tr>",
                i + 1
            )
        })
        .collect();
    let pager = match last_page {
        Some(last) => format!(
            "<div class=\"m-pager\"><a class=\"cur\" page=\"1\">1</a>\
             <a class=\"changePage\" page=\"2\">下一页</a>\
             <a class=\"changePage\" page=\"{last}\">尾页</a></div>"
        ),
        None => String::new(),
    };
    format!(
        "<table class=\"m-table m-pager-table\"><thead><tr><th>序号</th><th>代码</th><th>名称</th>\
         <th>现价</th><th>涨跌幅(%)</th><th>涨跌</th><th>涨速(%)</th><th>换手(%)</th><th>量比</th>\
         <th>振幅(%)</th><th>成交额</th><th>流通股</th><th>流通市值</th><th>市盈率</th><th>加自选</th>\
         </tr></thead><tbody>{body}</tbody></table>{pager}"
    )
}

/// Catalog listing page: `(date, name, count, code)` per row.
pub fn catalog_page(rows: &[(&str, &str, u32, &str)], current: usize, total: usize) -> String {
    let body: String = rows
        .iter()
        .map(|(date, name, count, code)| {
            format!(
                "<tr><td>{date}</td><td><a href=\"{QUOTE_BASE}/gn/detail/code/{code}/\" \
                 target=\"_blank\">{name}</a></td><td></td><td>龙头</td><td>{count}</td></tr>"
            )
        })
        .collect();
    format!(
        "<table class=\"m-table m-pager-table\"><thead><tr><th>日期</th><th>概念名称</th>\
         <th>驱动事件</th><th>龙头股</th><th>成分股数量</th></tr></thead><tbody>{body}</tbody>\
         </table><div class=\"m-pager\"><span class=\"page_info\">{current}/{total}</span></div>"
    )
}

pub fn board_page(index_code: &str) -> String {
    format!(
        "<div class=\"board-hq\"><h3>板块<span>{index_code}</span></h3></div>\
         <div class=\"board-infos\"><dl><dt>板块简介</dt><dd>第一行\n第二行</dd></dl>\
         <dl><dt>成分股数量</dt><dd>3</dd></dl></div>"
    )
}

/// Yearly line payload with 11-field records for the given `yyyymmdd` dates.
pub fn year_blob(index_code: &str, year: i32, dates: &[&str]) -> String {
    let data: Vec<String> = dates
        .iter()
        .map(|d| format!("{d},10,11,9,10.5,1000,10500.5,,,,0"))
        .collect();
    format!(
        "quotebridge_v4_line_bk_{index_code}_01_{year}({{\"total\":\"{}\",\"data\":\"{}\"}})",
        dates.len(),
        data.join(";")
    )
}
