//! Parsed mark image filenames.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::MarkCode;

use super::error::ImageError;
use super::pattern::{ImageFormat, ImageType, match_name};
use super::path::image_path;

/// Metadata derived from a mark image filename.
///
/// Filenames must be in canonical case: uppercase name and lowercase
/// extension (`ABCD12P1.jpg`). Names that match a pattern in any other case
/// are rejected rather than corrected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkImage {
    filename: String,
    normalized_filename: String,
    code: MarkCode,
    image_type: ImageType,
    format: ImageFormat,
    date: NaiveDate,
    sequence: Option<u8>,
    size: Option<u64>,
    modified: Option<DateTime<Utc>>,
}

impl MarkImage {
    /// Parse a filename with no file size or modification time.
    pub fn parse(filename: &str) -> Result<Self, ImageError> {
        Self::new(filename, None, None)
    }

    /// Parse a filename, carrying file size and modification time through
    /// unchanged.
    pub fn new(
        filename: &str,
        size: Option<u64>,
        modified: Option<DateTime<Utc>>,
    ) -> Result<Self, ImageError> {
        let invalid = || ImageError::InvalidFilename(filename.to_string());

        let m = match_name(filename).ok_or_else(invalid)?;

        // A match means the name is ASCII and ends in a 3-letter extension
        let split = filename.len() - 4;
        let normalized = format!(
            "{}{}",
            filename[..split].to_ascii_uppercase(),
            filename[split..].to_ascii_lowercase()
        );
        if normalized != filename {
            return Err(ImageError::Capitalization {
                filename: filename.to_string(),
                normalized,
            });
        }

        let code = MarkCode::parse(&m.code).map_err(|_| invalid())?;
        let date = NaiveDate::from_ymd_opt(m.year, m.month, 1).ok_or_else(invalid)?;

        Ok(Self {
            filename: filename.to_string(),
            normalized_filename: normalized,
            code,
            image_type: m.image_type,
            format: m.format,
            date,
            sequence: m.sequence,
            size,
            modified,
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn normalized_filename(&self) -> &str {
        &self.normalized_filename
    }

    /// The mark the image belongs to.
    pub fn code(&self) -> &MarkCode {
        &self.code
    }

    pub fn image_type(&self) -> ImageType {
        self.image_type
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// First day of the month the image was taken.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn sequence(&self) -> Option<u8> {
        self.sequence
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }

    /// Storage path under the default base directory.
    pub fn path(&self) -> String {
        image_path(&self.filename)
    }
}

/// Check that a filename is a valid, canonically cased mark image name.
pub fn validate(filename: &str) -> Result<(), ImageError> {
    MarkImage::parse(filename).map(|_| ())
}
