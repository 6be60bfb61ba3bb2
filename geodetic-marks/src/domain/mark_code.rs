//! Geodetic mark code types.

use std::fmt;

use serde::{Serialize, Serializer};

/// Error returned when parsing an invalid mark code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{input} is not a valid geodetic code: {reason}")]
pub struct InvalidMarkCode {
    input: String,
    reason: &'static str,
}

impl InvalidMarkCode {
    /// The rejected input, as given.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// A valid geodetic mark identifier.
///
/// Marks are normally identified by a 4-character code (letters, digits or
/// underscore). The database also assigns every mark a numeric id, written
/// `ID:<digits>`. Parsing is case-insensitive and the stored form is always
/// uppercase, so `abcd` and `ABCD` compare equal.
///
/// # Examples
///
/// ```
/// use geodetic_marks::domain::MarkCode;
///
/// let code = MarkCode::parse("ab12").unwrap();
/// assert_eq!(code.to_string(), "AB12");
///
/// let id = MarkCode::parse("id:1234").unwrap();
/// assert_eq!(id.id(), Some(1234));
///
/// // Ids of any length are accepted
/// let long = MarkCode::parse("ID:123456789012345678901234").unwrap();
/// assert_eq!(long.id(), None);
/// assert_eq!(id.to_string(), "ID:1234");
///
/// // Wrong length is rejected
/// assert!(MarkCode::parse("AB").is_err());
/// assert!(MarkCode::parse("12345").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum MarkCode {
    /// Four uppercase ASCII characters from `[A-Z0-9_]`.
    Code([u8; 4]),
    /// Numeric database id as decimal digits, without leading zeros.
    Id(Box<str>),
}

impl MarkCode {
    /// Parse a mark code from a string.
    ///
    /// Accepts `^(\w{4}|ID:\d+)$` ignoring case, where `\w` is an ASCII
    /// letter, digit or underscore.
    pub fn parse(s: &str) -> Result<Self, InvalidMarkCode> {
        let invalid = |reason| InvalidMarkCode {
            input: s.to_string(),
            reason,
        };

        let upper = s.to_ascii_uppercase();

        if let Some(digits) = upper.strip_prefix("ID:") {
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid("numeric id must be digits after ID:"));
            }
            return Ok(MarkCode::Id(trim_leading_zeros(digits).into()));
        }

        let bytes = upper.as_bytes();
        if bytes.len() != 4 {
            return Err(invalid("must be exactly 4 characters or ID:<number>"));
        }

        for &b in bytes {
            if !(b.is_ascii_alphanumeric() || b == b'_') {
                return Err(invalid("must be ASCII letters, digits or underscore"));
            }
        }

        Ok(MarkCode::Code([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Build the code for a numeric database id.
    pub fn from_id(id: u64) -> Self {
        MarkCode::Id(id.to_string().into())
    }

    /// The 4-character code, if this is not a numeric id.
    pub fn code(&self) -> Option<&str> {
        match self {
            // Only ASCII bytes are ever stored
            MarkCode::Code(bytes) => std::str::from_utf8(bytes).ok(),
            MarkCode::Id(_) => None,
        }
    }

    /// The numeric database id, if this is an id code that fits in a `u64`.
    pub fn id(&self) -> Option<u64> {
        match self {
            MarkCode::Code(_) => None,
            MarkCode::Id(digits) => digits.parse().ok(),
        }
    }

    /// The decimal digits of an id code.
    pub fn id_digits(&self) -> Option<&str> {
        match self {
            MarkCode::Code(_) => None,
            MarkCode::Id(digits) => Some(digits),
        }
    }

    /// Whether this is a numeric `ID:` code.
    pub fn is_id(&self) -> bool {
        matches!(self, MarkCode::Id(_))
    }
}

fn trim_leading_zeros(digits: &str) -> &str {
    match digits.trim_start_matches('0') {
        "" => "0",
        trimmed => trimmed,
    }
}

impl fmt::Debug for MarkCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MarkCode({self})")
    }
}

impl fmt::Display for MarkCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkCode::Code(_) => f.write_str(self.code().unwrap_or_default()),
            MarkCode::Id(digits) => write!(f, "ID:{digits}"),
        }
    }
}

impl Serialize for MarkCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_codes() {
        assert!(MarkCode::parse("ABCD").is_ok());
        assert!(MarkCode::parse("AB12").is_ok());
        assert!(MarkCode::parse("1234").is_ok());
        assert!(MarkCode::parse("A_BC").is_ok());
        assert!(MarkCode::parse("ID:1").is_ok());
        assert!(MarkCode::parse("ID:00042").is_ok());
    }

    #[test]
    fn normalizes_case() {
        assert_eq!(MarkCode::parse("abcd").unwrap(), MarkCode::parse("ABCD").unwrap());
        assert_eq!(MarkCode::parse("ABcd").unwrap().to_string(), "ABCD");
        assert_eq!(MarkCode::parse("id:7").unwrap(), MarkCode::parse("ID:7").unwrap());
    }

    #[test]
    fn reject_wrong_length() {
        assert!(MarkCode::parse("").is_err());
        assert!(MarkCode::parse("AB").is_err());
        assert!(MarkCode::parse("ABC").is_err());
        assert!(MarkCode::parse("12345").is_err());
    }

    #[test]
    fn reject_bad_characters() {
        assert!(MarkCode::parse("AB-D").is_err());
        assert!(MarkCode::parse("AB D").is_err());
        assert!(MarkCode::parse("ABÖ").is_err());
        assert!(MarkCode::parse(" ABCD").is_err());
    }

    #[test]
    fn reject_bad_ids() {
        assert!(MarkCode::parse("ID:").is_err());
        assert!(MarkCode::parse("ID:12a").is_err());
        assert!(MarkCode::parse("ID:-1").is_err());
        assert!(MarkCode::parse("ID 12").is_err());
    }

    #[test]
    fn ids_beyond_u64_are_accepted() {
        let code = MarkCode::parse("id:99999999999999999999999").unwrap();
        assert!(code.is_id());
        assert_eq!(code.id(), None);
        assert_eq!(code.id_digits(), Some("99999999999999999999999"));
        assert_eq!(code.to_string(), "ID:99999999999999999999999");

        let code = MarkCode::parse("ID:99999999999").unwrap();
        assert_eq!(code.id(), Some(99_999_999_999));
    }

    #[test]
    fn zero_id() {
        assert_eq!(MarkCode::parse("ID:000").unwrap().to_string(), "ID:0");
        assert_eq!(MarkCode::parse("ID:0").unwrap(), MarkCode::from_id(0));
    }

    #[test]
    fn id_accessors() {
        let code = MarkCode::parse("ID:1234").unwrap();
        assert!(code.is_id());
        assert_eq!(code.id(), Some(1234));
        assert_eq!(code.code(), None);
        assert_eq!(MarkCode::from_id(1234), code);
    }

    #[test]
    fn code_accessors() {
        let code = MarkCode::parse("ab12").unwrap();
        assert!(!code.is_id());
        assert_eq!(code.code(), Some("AB12"));
        assert_eq!(code.id(), None);
    }

    #[test]
    fn id_display_drops_leading_zeros() {
        let code = MarkCode::parse("id:0042").unwrap();
        assert_eq!(code.to_string(), "ID:42");
    }

    #[test]
    fn debug() {
        let code = MarkCode::parse("ABCD").unwrap();
        assert_eq!(format!("{:?}", code), "MarkCode(ABCD)");
    }

    #[test]
    fn error_message_names_input() {
        let err = MarkCode::parse("AB").unwrap_err();
        assert_eq!(err.input(), "AB");
        assert!(err.to_string().starts_with("AB is not a valid geodetic code"));
    }

    #[test]
    fn serializes_as_string() {
        let code = MarkCode::parse("ID:5").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"ID:5\"");
    }

    #[test]
    fn hash_consistent_with_eq() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(MarkCode::parse("abcd").unwrap());
        assert!(set.contains(&MarkCode::parse("ABCD").unwrap()));
        assert!(!set.contains(&MarkCode::parse("ABCE").unwrap()));
    }
}
