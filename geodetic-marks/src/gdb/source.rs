//! The seam between the fetcher and wherever mark data comes from.

use crate::domain::MarkCode;

use super::error::SourceError;

/// A place raw mark payloads can be fetched from.
///
/// Implementations make a single attempt per call and never retry.
pub trait MarkSource: Send {
    /// Fetch the raw JSON payload for a mark.
    ///
    /// Returns `Ok(None)` when the source was reached but the mark does not
    /// exist.
    fn fetch(&self, code: &MarkCode) -> Result<Option<String>, SourceError>;

    /// Short name for log messages.
    fn name(&self) -> &'static str;
}
