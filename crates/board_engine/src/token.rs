use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use boa_engine::{Context, JsString, JsValue, Source};

/// Script shipped with the crate; exports a global `v()`.
///
/// This is a stand-in generator with the vendor script's interface, not the
/// portal's own `ths.js`. The live portal is likely to reject its tokens, so
/// set `BoardSettings::token_script` to the vendor file for real use.
pub const BUNDLED_SCRIPT: &str = include_str!("../assets/ths.js");

/// Name of the global function producing the cookie token.
pub const TOKEN_FUNCTION: &str = "v";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token script {path:?} unavailable: {message}")]
    MissingResource { path: PathBuf, message: String },
    #[error("token script failed: {0}")]
    Evaluation(String),
    #[error("token script does not define a callable `{0}`")]
    MissingFunction(String),
}

/// Source of the `v` cookie value required by gated listing endpoints.
///
/// Implementations are called once per gated request and must not hand out
/// a cached token.
pub trait TokenProvider: Send + Sync {
    fn get_token(&self) -> Result<String, TokenError>;
}

/// Runs the token script in a fresh JS context on every call.
///
/// Only the script text is kept between calls; no interpreter state survives,
/// so tokens never depend on earlier requests.
#[derive(Debug, Clone)]
pub struct ScriptTokenProvider {
    source: Arc<str>,
}

impl ScriptTokenProvider {
    pub fn bundled() -> Self {
        Self::from_source(BUNDLED_SCRIPT)
    }

    pub fn from_source(source: impl Into<Arc<str>>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, TokenError> {
        let source = fs::read_to_string(path).map_err(|err| TokenError::MissingResource {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Ok(Self::from_source(source))
    }
}

impl Default for ScriptTokenProvider {
    fn default() -> Self {
        Self::bundled()
    }
}

impl TokenProvider for ScriptTokenProvider {
    fn get_token(&self) -> Result<String, TokenError> {
        let mut context = Context::default();
        context
            .eval(Source::from_bytes(self.source.as_bytes()))
            .map_err(|err| TokenError::Evaluation(err.to_string()))?;

        let value = context
            .global_object()
            .get(JsString::from(TOKEN_FUNCTION), &mut context)
            .map_err(|err| TokenError::Evaluation(err.to_string()))?;
        let function = value
            .as_callable()
            .ok_or_else(|| TokenError::MissingFunction(TOKEN_FUNCTION.to_string()))?;

        let token = function
            .call(&JsValue::undefined(), &[], &mut context)
            .map_err(|err| TokenError::Evaluation(err.to_string()))?;
        let token = token
            .to_string(&mut context)
            .map_err(|err| TokenError::Evaluation(err.to_string()))?;
        Ok(token.to_std_string_escaped())
    }
}
