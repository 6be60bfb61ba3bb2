//! Mark image naming patterns.
//!
//! Every image name is `CCCCYY<type part><sequence>.<ext>`: a 4-character
//! mark code, a 2-digit year, a type-specific part, an optional single
//! sequence digit and a type-specific extension.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Kind of mark image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImageType {
    /// Site photo, `ABCD12P1.jpg`
    Site,
    /// Diagnostic photo with month, `ABCD12031.jpg`
    Diag,
    /// Reflector/benchmark photo, `ABCD12R1.tif`
    Relb,
    /// Calibration disc, variant A, `ABCD12AD1.png`
    Acdp,
    /// Calibration disc, variant B, `ABCD12BD1.png`
    Bcdp,
}

impl ImageType {
    /// The short tag used in the image catalogue.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::Site => "SITE",
            ImageType::Diag => "DIAG",
            ImageType::Relb => "RELB",
            ImageType::Acdp => "ACDP",
            ImageType::Bcdp => "BCDP",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImageFormat {
    Jpeg,
    Tiff,
    Png,
}

impl ImageFormat {
    /// Map a file extension (any case) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" => Some(ImageFormat::Jpeg),
            "tif" => Some(ImageFormat::Tiff),
            "png" => Some(ImageFormat::Png),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Tiff => "TIFF",
            ImageFormat::Png => "PNG",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct NamePattern {
    image_type: ImageType,
    regex: Regex,
}

impl NamePattern {
    fn new(image_type: ImageType, type_part: &str, extensions: &str) -> Self {
        // ASCII-only, case-insensitive
        let pattern = format!(
            r"(?i-u)^(?P<code>[A-Z0-9]{{4}})(?P<year>[0-9]{{2}}){type_part}(?P<seq>[0-9]?)\.(?P<ext>{extensions})$"
        );
        let regex = Regex::new(&pattern).expect("mark image patterns are valid regexes");
        Self { image_type, regex }
    }
}

/// Patterns in match order.
static PATTERNS: LazyLock<Vec<NamePattern>> = LazyLock::new(|| {
    vec![
        NamePattern::new(ImageType::Site, "P", "jpg"),
        NamePattern::new(
            ImageType::Diag,
            "(?P<month>0[1-9]|1[0-2])",
            "jpg|tif",
        ),
        NamePattern::new(ImageType::Relb, "R", "tif"),
        NamePattern::new(ImageType::Acdp, "AD", "png"),
        NamePattern::new(ImageType::Bcdp, "BD", "png"),
    ]
});

/// Month used for image types whose names carry no month.
const DEFAULT_MONTH: u32 = 6;

/// Fields pulled out of a matching filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NameMatch {
    pub image_type: ImageType,
    /// Uppercased mark code
    pub code: String,
    pub year: i32,
    pub month: u32,
    pub sequence: Option<u8>,
    pub format: ImageFormat,
}

/// Match a filename against the naming patterns, in order.
pub(crate) fn match_name(filename: &str) -> Option<NameMatch> {
    PATTERNS.iter().find_map(|pattern| {
        let caps = pattern.regex.captures(filename)?;

        let two_digit: i32 = caps.name("year")?.as_str().parse().ok()?;
        let month = match caps.name("month") {
            Some(m) => m.as_str().parse().ok()?,
            None => DEFAULT_MONTH,
        };
        let sequence = caps
            .name("seq")
            .filter(|m| !m.as_str().is_empty())
            .and_then(|m| m.as_str().parse().ok());

        Some(NameMatch {
            image_type: pattern.image_type,
            code: caps.name("code")?.as_str().to_ascii_uppercase(),
            year: expand_year(two_digit),
            month,
            sequence,
            format: ImageFormat::from_extension(caps.name("ext")?.as_str())?,
        })
    })
}

/// Two-digit years below 50 are in the 2000s, the rest in the 1900s.
pub(crate) fn expand_year(two_digit: i32) -> i32 {
    if two_digit < 50 {
        2000 + two_digit
    } else {
        1900 + two_digit
    }
}
