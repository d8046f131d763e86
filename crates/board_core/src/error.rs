use thiserror::Error;

/// Failure to find or interpret an expected structure in a fetched page or payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no element matches selector `{selector}`")]
    MissingElement { selector: String },
    #[error("element `{selector}` has no `{attribute}` attribute")]
    MissingAttribute { selector: String, attribute: String },
    #[error("invalid selector `{0}`")]
    InvalidSelector(String),
    #[error("column `{0}` not found")]
    MissingColumn(String),
    #[error("invalid number `{value}` in column `{column}`")]
    InvalidNumber { column: String, value: String },
    #[error("invalid stock code `{0}`")]
    InvalidCode(String),
    #[error("invalid date `{0}`")]
    InvalidDate(String),
    #[error("malformed payload: {0}")]
    Payload(String),
    #[error("unsupported bar layout with {0} fields")]
    UnsupportedLayout(usize),
    #[error("listing claims {count} pages, more than the {max} allowed")]
    PageCountOutOfRange { count: usize, max: usize },
}

impl ParseError {
    pub(crate) fn missing(selector: &str) -> Self {
        ParseError::MissingElement {
            selector: selector.to_string(),
        }
    }
}
