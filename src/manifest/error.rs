use std::fmt;

/// Result alias for manifest reconstruction operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Errors surfaced to callers of the manifest engine.
///
/// Malformed entries inside an otherwise valid manifest are not errors: they are
/// dropped from the output and reported through `log`.
#[derive(Debug)]
pub enum ManifestError {
    /// The manifest root is absent or is not an object. Carries what was found instead.
    MissingRoot(&'static str),
    /// Decoded manifest JSON could not be read.
    Json(String),
    /// The package decoder collaborator failed.
    Decoder(String),
    /// A digest string does not have the length its algorithm produces.
    InvalidDigest {
        algorithm: &'static str,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestError::MissingRoot(found) => {
                write!(f, "No manifest available: expected an object root, found {found}")
            }
            ManifestError::Json(msg) => write!(f, "Decoded manifest is not valid JSON: {msg}"),
            ManifestError::Decoder(msg) => write!(f, "Package decoder failed: {msg}"),
            ManifestError::InvalidDigest {
                algorithm,
                expected,
                found,
            } => write!(
                f,
                "{algorithm} digest must be {expected} hex characters, got {found}"
            ),
        }
    }
}

impl std::error::Error for ManifestError {}

impl From<serde_json::Error> for ManifestError {
    fn from(value: serde_json::Error) -> Self {
        ManifestError::Json(value.to_string())
    }
}
