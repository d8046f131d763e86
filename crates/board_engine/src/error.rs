use board_core::ParseError;
use thiserror::Error;

use crate::decode::DecodeError;
use crate::settings::SettingsError;
use crate::token::TokenError;
use crate::FetchError;

/// Error surfaced by every board operation.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("network error: {0}")]
    Network(#[from] FetchError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("script evaluation error: {0}")]
    Script(#[from] TokenError),
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("board `{name}` not found in catalog")]
    NotFound { name: String },
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("runtime error: {0}")]
    Runtime(String),
}
