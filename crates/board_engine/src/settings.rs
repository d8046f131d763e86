use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use board_core::BoardKind;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::catalog::CatalogPolicy;
use crate::fetch::{FetchSettings, DEFAULT_USER_AGENT};

pub const DEFAULT_QUOTE_BASE: &str = "http://q.10jqka.com.cn";
pub const DEFAULT_LINE_BASE: &str = "http://d.10jqka.com.cn";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings: {0}")]
    Parse(String),
    #[error("invalid base url `{url}`: {message}")]
    InvalidUrl { url: String, message: String },
}

/// Engine configuration. Every field has a default, so a RON file only
/// needs the values it overrides, e.g.
///
/// ```ron
/// (
///     request_timeout_ms: 15000,
///     token_script: Some("vendor/ths.js"),
///     catalog_policy: Cached,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    pub quote_base: String,
    pub line_base: String,
    pub user_agent: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    /// Vendor token script to use instead of the bundled one.
    pub token_script: Option<PathBuf>,
    pub catalog_policy: CatalogPolicy,
}

impl Default for BoardSettings {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            quote_base: DEFAULT_QUOTE_BASE.to_string(),
            line_base: DEFAULT_LINE_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout_ms: fetch.connect_timeout.as_millis() as u64,
            request_timeout_ms: fetch.request_timeout.as_millis() as u64,
            redirect_limit: fetch.redirect_limit,
            max_bytes: fetch.max_bytes,
            token_script: None,
            catalog_policy: CatalogPolicy::default(),
        }
    }
}

impl BoardSettings {
    /// Read and validate a RON settings file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&text)
    }

    pub fn from_ron(text: &str) -> Result<Self, SettingsError> {
        let settings: BoardSettings =
            ron::from_str(text).map_err(|err| SettingsError::Parse(err.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        for base in [&self.quote_base, &self.line_base] {
            Url::parse(base).map_err(|err| SettingsError::InvalidUrl {
                url: base.clone(),
                message: err.to_string(),
            })?;
        }
        Ok(())
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            redirect_limit: self.redirect_limit,
            max_bytes: self.max_bytes,
            user_agent: self.user_agent.clone(),
            ..FetchSettings::default()
        }
    }

    /// Referer sent with yearly line requests.
    pub fn referer(&self) -> &str {
        self.quote_base.trim_end_matches('/')
    }

    pub fn catalog_page_url(&self, page: usize) -> String {
        format!(
            "{}/gn/index/field/addtime/order/desc/page/{page}/ajax/1/",
            self.quote()
        )
    }

    pub fn constituents_page_url(&self, kind: BoardKind, code: &str, page: usize) -> String {
        format!(
            "{}/{}/detail/field/{}/order/desc/page/{page}/ajax/1/code/{code}",
            self.quote(),
            kind.path_segment(),
            kind.listing_field()
        )
    }

    pub fn board_page_url(&self, kind: BoardKind, code: &str) -> String {
        format!(
            "{}/{}/detail/code/{code}/",
            self.quote(),
            kind.path_segment()
        )
    }

    pub fn year_line_url(&self, index_code: &str, year: i32) -> String {
        format!(
            "{}/v4/line/bk_{index_code}/01/{year}.js",
            self.line_base.trim_end_matches('/')
        )
    }

    fn quote(&self) -> &str {
        self.quote_base.trim_end_matches('/')
    }
}
