//! # Codepages
//!
//! Byte-level case-folding tables used by case-insensitive collation.
//!
//! A codepage maps each byte to its lowercase form. Bytes the table does not
//! map fold to themselves, so folding never fails.
//!
//! | Codepage | Folds |
//! |----------|-------|
//! | `utf8` (default) | `A`–`Z` |
//! | `ascii` | `A`–`Z` |
//! | `iso8859-1` | `A`–`Z`, `À`–`Þ` except `×` |

use std::fmt;

/// Character set whose lowercasing table drives case-insensitive collation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Codepage {
    /// UTF-8. Multi-byte sequences are left untouched byte-wise.
    #[default]
    Utf8,
    /// 7-bit US-ASCII.
    Ascii,
    /// ISO 8859-1 (Latin-1).
    Iso8859_1,
}

impl Codepage {
    /// Canonical name, as accepted by the `iocharset=` mount option.
    pub fn name(self) -> &'static str {
        match self {
            Codepage::Utf8 => "utf8",
            Codepage::Ascii => "ascii",
            Codepage::Iso8859_1 => "iso8859-1",
        }
    }

    /// Look up a codepage by name (case-insensitive, common aliases accepted).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "utf8" | "utf-8" => Some(Codepage::Utf8),
            "ascii" | "us-ascii" => Some(Codepage::Ascii),
            "iso8859-1" | "iso-8859-1" | "latin1" => Some(Codepage::Iso8859_1),
            _ => None,
        }
    }

    /// Lowercase a single byte.
    #[inline]
    pub fn to_lower(self, byte: u8) -> u8 {
        match self {
            Codepage::Utf8 | Codepage::Ascii => byte.to_ascii_lowercase(),
            Codepage::Iso8859_1 => match byte {
                // 0xD7 is the multiplication sign, not a letter.
                0xC0..=0xDE if byte != 0xD7 => byte + 0x20,
                _ => byte.to_ascii_lowercase(),
            },
        }
    }

    /// Compare two equal-length byte strings ignoring case.
    pub fn eq_ignore_case(self, a: &[u8], b: &[u8]) -> bool {
        a.len() == b.len()
            && a
                .iter()
                .zip(b)
                .all(|(&x, &y)| self.to_lower(x) == self.to_lower(y))
    }
}

impl fmt::Display for Codepage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_utf8() {
        assert_eq!(Codepage::default(), Codepage::Utf8);
    }

    #[test]
    fn from_name_accepts_aliases() {
        assert_eq!(Codepage::from_name("UTF-8"), Some(Codepage::Utf8));
        assert_eq!(Codepage::from_name("latin1"), Some(Codepage::Iso8859_1));
        assert_eq!(Codepage::from_name("us-ascii"), Some(Codepage::Ascii));
        assert_eq!(Codepage::from_name("koi8-r"), None);
    }

    #[test]
    fn name_round_trips_through_from_name() {
        for cp in [Codepage::Utf8, Codepage::Ascii, Codepage::Iso8859_1] {
            assert_eq!(Codepage::from_name(cp.name()), Some(cp));
        }
    }

    #[test]
    fn utf8_folds_ascii_only() {
        assert_eq!(Codepage::Utf8.to_lower(b'Q'), b'q');
        assert_eq!(Codepage::Utf8.to_lower(b'q'), b'q');
        // Leading byte of a two-byte sequence is left alone.
        assert_eq!(Codepage::Utf8.to_lower(0xC3), 0xC3);
    }

    #[test]
    fn latin1_folds_accented_capitals() {
        assert_eq!(Codepage::Iso8859_1.to_lower(0xC9), 0xE9); // É -> é
        assert_eq!(Codepage::Iso8859_1.to_lower(0xDE), 0xFE); // Þ -> þ
        assert_eq!(Codepage::Iso8859_1.to_lower(0xD7), 0xD7); // × stays
        assert_eq!(Codepage::Iso8859_1.to_lower(0xDF), 0xDF); // ß stays
    }

    #[test]
    fn unmapped_bytes_fold_to_themselves() {
        for cp in [Codepage::Utf8, Codepage::Ascii, Codepage::Iso8859_1] {
            assert_eq!(cp.to_lower(0xFF), 0xFF);
            assert_eq!(cp.to_lower(b'0'), b'0');
            assert_eq!(cp.to_lower(0), 0);
        }
    }

    #[test]
    fn eq_ignore_case_requires_equal_length() {
        assert!(Codepage::Utf8.eq_ignore_case(b"Foo", b"fOO"));
        assert!(!Codepage::Utf8.eq_ignore_case(b"Foo", b"Fooo"));
        assert!(!Codepage::Utf8.eq_ignore_case(b"Foo", b"Bar"));
    }
}
