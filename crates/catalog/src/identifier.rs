//! Product identifier extraction.
//!
//! File and folder names downloaded from the catalog usually carry the
//! product code somewhere in them (`[RJ123456] Title`, `rj01234567.zip`,
//! `VJ012345_v2`). [`Identifier::extract`] pulls it back out.
//!
//! The prefixes are tried in the fixed order of [`PREFIXES`], **not** in the
//! order they appear in the name. Only the first occurrence of each prefix is
//! examined. A name such as `VJ001122RJ00334455` therefore resolves to
//! `RJ00334455`: `RJ` is checked before `VJ`, even though `VJ` comes first in
//! the text. Existing libraries were named with this rule, so it stays.

use crate::error::{Error, ErrorKind};
use std::fmt;
use std::str::FromStr;

/// Recognized identifier prefixes, in the order they are tried.
pub const PREFIXES: [&str; 5] = ["RJ", "VJ", "BJ", "RG", "RE"];

/// A catalog product identifier: an uppercase prefix from [`PREFIXES`]
/// followed by exactly 6 or 8 ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    /// Extracts the identifier embedded in a file stem or folder name.
    ///
    /// ```
    /// use dlren_catalog::Identifier;
    ///
    /// let id = Identifier::extract("[circle] rj123456 some title").unwrap();
    /// assert_eq!(id.as_str(), "RJ123456");
    /// // Prefix list order wins over position in the name.
    /// assert_eq!(Identifier::extract("VJ001122RJ00334455").unwrap().as_str(), "RJ00334455");
    /// // Five digits is not a valid identifier.
    /// assert!(Identifier::extract("note_RJ01234_x").is_none());
    /// ```
    pub fn extract(name: &str) -> Option<Self> {
        PREFIXES.iter().find_map(|prefix| digits_after(name, prefix)).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Looks up the first occurrence of `prefix` and, if it is immediately
/// followed by a run of 6 or 8 digits, returns the normalized identifier.
fn digits_after(name: &str, prefix: &str) -> Option<String> {
    let bytes = name.as_bytes();
    let start = find_ignore_ascii_case(bytes, prefix.as_bytes())? + prefix.len();
    let digits = bytes[start..].iter().take_while(|b| b.is_ascii_digit()).count();
    // Prefix and digits are ASCII, so these byte offsets are char boundaries.
    matches!(digits, 6 | 8).then(|| format!("{prefix}{}", &name[start..start + digits]))
}

fn find_ignore_ascii_case(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window.eq_ignore_ascii_case(needle))
}

impl FromStr for Identifier {
    type Err = Error;

    /// Parses a bare identifier (`"rj123456"`, `"BJ01234567"`). Unlike
    /// [`extract`](Self::extract), the whole string must be the identifier.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::from(ErrorKind::InvalidIdentifier(s.to_string()));
        let (prefix, number) = s.split_at_checked(2).ok_or_else(invalid)?;
        let prefix = PREFIXES.iter().find(|p| p.eq_ignore_ascii_case(prefix)).ok_or_else(invalid)?;
        if !matches!(number.len(), 6 | 8) || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        Ok(Self(format!("{prefix}{number}")))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("RJ123456", Some("RJ123456"))]
    #[case("RJ12345678", Some("RJ12345678"))]
    #[case("rj123456", Some("RJ123456"))]
    #[case("[Circle] Title (rJ01234567)", Some("RJ01234567"))]
    #[case("VJ012345", Some("VJ012345"))]
    #[case("bj01234567_extra", Some("BJ01234567"))]
    #[case("RG123456", Some("RG123456"))]
    #[case("re654321", Some("RE654321"))]
    #[case("タイトル RJ123456", Some("RJ123456"))]
    // Invalid digit run lengths.
    #[case("note_RJ01234_x", None)]
    #[case("RJ1234567", None)]
    #[case("RJ123456789", None)]
    #[case("RJ", None)]
    #[case("RJ_123456", None)]
    #[case("nothing to see here", None)]
    #[case("", None)]
    fn test_extract(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(Identifier::extract(name).as_ref().map(Identifier::as_str), expected);
    }

    #[test]
    fn test_prefix_list_order_beats_position() {
        let id = Identifier::extract("VJ001122RJ00334455").unwrap();
        assert_eq!(id.as_str(), "RJ00334455");
        let id = Identifier::extract("RE111111 BJ222222").unwrap();
        assert_eq!(id.as_str(), "BJ222222");
    }

    #[test]
    fn test_invalid_run_falls_through_to_next_prefix() {
        // RJ is found first but only has 7 digits, VJ is valid.
        let id = Identifier::extract("RJ1234567 VJ123456").unwrap();
        assert_eq!(id.as_str(), "VJ123456");
    }

    #[test]
    fn test_only_first_occurrence_of_a_prefix_is_checked() {
        // The first "RJ" has no digits; the later valid one is never looked at.
        assert!(Identifier::extract("RJ-RJ123456").is_none());
        // ... but another prefix can still match.
        assert_eq!(Identifier::extract("RJ-RJ123456 RE000001").unwrap().as_str(), "RE000001");
    }

    #[test]
    fn test_prefix_inside_a_word() {
        // No word boundary is needed before the prefix.
        assert_eq!(Identifier::extract("fjorj123456").unwrap().as_str(), "RJ123456");
    }

    #[test]
    fn test_parse_normalizes_case() {
        let id: Identifier = "vj01234567".parse().unwrap();
        assert_eq!(id.as_str(), "VJ01234567");
        assert_eq!(id.to_string(), "VJ01234567");
    }

    #[rstest]
    #[case("RJ12345")]
    #[case("RJ1234567")]
    #[case("XX123456")]
    #[case("RJ12345a")]
    #[case("R")]
    #[case("")]
    #[case(" RJ123456")]
    #[case("ＲJ123456")]
    fn test_parse_rejects(#[case] s: &str) {
        let err = s.parse::<Identifier>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidIdentifier(_)));
    }
}
