//! Mark image filename errors.

/// Errors from parsing a mark image filename.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    /// The filename matches none of the mark image naming patterns
    #[error("invalid mark image filename {0}")]
    InvalidFilename(String),

    /// The filename matches a pattern but is not in canonical case
    /// (uppercase name, lowercase extension)
    #[error("incorrect image filename capitalization {filename} => {normalized}")]
    Capitalization { filename: String, normalized: String },
}
