//! Board engine: token-gated fetching, pagination and board operations.
mod blocking;
mod catalog;
mod client;
mod collect;
mod decode;
mod error;
mod fetch;
mod settings;
mod token;
mod types;

pub use blocking::BlockingBoardClient;
pub use catalog::{Catalog, CatalogPolicy};
pub use client::BoardClient;
pub use collect::PaginatedCollector;
pub use decode::{decode_body, DecodeError, DecodedText};
pub use error::BoardError;
pub use fetch::{FetchSettings, Fetcher, PageRequest, ReqwestFetcher, DEFAULT_USER_AGENT};
pub use settings::{BoardSettings, SettingsError, DEFAULT_LINE_BASE, DEFAULT_QUOTE_BASE};
pub use token::{ScriptTokenProvider, TokenError, TokenProvider, BUNDLED_SCRIPT, TOKEN_FUNCTION};
pub use types::{
    CollectProgress, CollectUnit, FailureKind, FetchError, FetchMetadata, FetchOutput,
    NoopProgress, ProgressSink,
};
