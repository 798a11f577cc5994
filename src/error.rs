use std::fmt;

/// Category of a failed tag expansion. All of them abort the render; the
/// document tree may already be partially rewritten and must be discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpandErrorKind {
    /// Capacities not divisible by rows-per-item, unknown fill mode, bad numbers.
    Configuration,
    /// Bound data is not a collection where one is required.
    DataType,
    /// Anchor outside a table cell, template rows missing, malformed merges.
    Structural,
}

impl fmt::Display for ExpandErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpandErrorKind::Configuration => write!(f, "configuration error"),
            ExpandErrorKind::DataType => write!(f, "data type error"),
            ExpandErrorKind::Structural => write!(f, "structural error"),
        }
    }
}

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    InvalidDocx(String),
    Xml(roxmltree::Error),
    Json(serde_json::Error),
    Expand {
        tag: String,
        kind: ExpandErrorKind,
        message: String,
    },
}

impl Error {
    pub(crate) fn config(tag: &str, message: impl Into<String>) -> Self {
        Self::expand(tag, ExpandErrorKind::Configuration, message)
    }

    pub(crate) fn data_type(tag: &str, message: impl Into<String>) -> Self {
        Self::expand(tag, ExpandErrorKind::DataType, message)
    }

    pub(crate) fn structural(tag: &str, message: impl Into<String>) -> Self {
        Self::expand(tag, ExpandErrorKind::Structural, message)
    }

    fn expand(tag: &str, kind: ExpandErrorKind, message: impl Into<String>) -> Self {
        Error::Expand {
            tag: tag.to_string(),
            kind,
            message: message.into(),
        }
    }

    /// The expansion category, if this error came from a tag expansion.
    pub fn kind(&self) -> Option<ExpandErrorKind> {
        match self {
            Error::Expand { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::InvalidDocx(msg) => write!(f, "invalid DOCX: {msg}"),
            Error::Xml(e) => write!(f, "XML error: {e}"),
            Error::Json(e) => write!(f, "JSON error: {e}"),
            Error::Expand { tag, kind, message } => {
                write!(f, "{kind} in loop tag '{tag}': {message}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Xml(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::Xml(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}
