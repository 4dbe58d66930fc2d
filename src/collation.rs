//! # Collation Policy
//!
//! Strategy for hashing and comparing entry names within a directory.
//!
//! ## Variants
//!
//! | Policy | Equality | Side effect on match |
//! |--------|----------|----------------------|
//! | [`CollationPolicy::CaseSensitive`] | byte-exact | none |
//! | [`CollationPolicy::CaseInsensitive`] | equal after codepage folding | stored name takes the query's bytes |
//!
//! ## Canonicalization
//!
//! Under case-insensitive collation the most recently presented casing wins:
//! a successful comparison overwrites the stored name with the query bytes.
//! Nothing is persisted, so there is no durable casing to protect.
//! [`CollationPolicy::hash`] only sees the folded name and is therefore stable
//! across these rewrites.
//!
//! ```rust
//! use samplefs::{Codepage, Collation, CollationPolicy};
//!
//! let policy = CollationPolicy::CaseInsensitive(Codepage::Utf8);
//! let mut stored = b"Foo".to_vec();
//!
//! assert_eq!(policy.hash(b"Foo"), policy.hash(b"FOO"));
//! assert_eq!(
//!     policy.compare_and_canonicalize(&mut stored, b"FOO"),
//!     Collation::Equal { canonicalized: true }
//! );
//! assert_eq!(stored, b"FOO");
//! ```

use std::borrow::Cow;

use crate::Codepage;

/// Name collation strategy for one mount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollationPolicy {
    /// Names match only when byte-identical.
    #[default]
    CaseSensitive,
    /// Names match when they fold to the same bytes under the codepage.
    CaseInsensitive(Codepage),
}

/// Verdict of [`CollationPolicy::compare_and_canonicalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collation {
    /// The names collate equal.
    Equal {
        /// Whether the stored name's bytes were rewritten to the query's.
        canonicalized: bool,
    },
    /// The names differ.
    NotEqual,
}

impl Collation {
    /// Returns `true` for [`Collation::Equal`].
    #[inline]
    pub fn is_equal(self) -> bool {
        matches!(self, Collation::Equal { .. })
    }
}

impl CollationPolicy {
    /// Returns `true` when names are compared without regard to case.
    #[inline]
    pub fn ignores_case(self) -> bool {
        matches!(self, CollationPolicy::CaseInsensitive(_))
    }

    /// Fold a name to its collation form.
    ///
    /// Borrows when no byte changes. Folding is idempotent.
    pub fn fold<'a>(&self, name: &'a [u8]) -> Cow<'a, [u8]> {
        match *self {
            CollationPolicy::CaseSensitive => Cow::Borrowed(name),
            CollationPolicy::CaseInsensitive(cp) => {
                if name.iter().all(|&b| cp.to_lower(b) == b) {
                    Cow::Borrowed(name)
                } else {
                    Cow::Owned(name.iter().map(|&b| cp.to_lower(b)).collect())
                }
            }
        }
    }

    /// Hash a name for directory lookup.
    ///
    /// Uses the classic dcache mixing: `h = (h + (c << 4) + (c >> 4)) * 11`
    /// over the folded bytes, truncated to 32 bits.
    pub fn hash(&self, name: &[u8]) -> u32 {
        let hash = self
            .fold(name)
            .iter()
            .fold(0u64, |hash, &c| partial_name_hash(c, hash));
        end_name_hash(hash)
    }

    /// Side-effect free equality check.
    pub fn matches(&self, a: &[u8], b: &[u8]) -> bool {
        match *self {
            CollationPolicy::CaseSensitive => a == b,
            CollationPolicy::CaseInsensitive(cp) => cp.eq_ignore_case(a, b),
        }
    }

    /// Compare a stored name with a query and canonicalize on a match.
    ///
    /// Under [`CollationPolicy::CaseInsensitive`] an equal verdict overwrites
    /// `existing` with the bytes of `query`; `canonicalized` reports whether
    /// that changed anything. Case-sensitive collation never mutates.
    pub fn compare_and_canonicalize(&self, existing: &mut Vec<u8>, query: &[u8]) -> Collation {
        if !self.matches(existing, query) {
            return Collation::NotEqual;
        }
        let canonicalized = self.ignores_case() && existing.as_slice() != query;
        if canonicalized {
            existing.clear();
            existing.extend_from_slice(query);
        }
        Collation::Equal { canonicalized }
    }
}

#[inline]
fn partial_name_hash(c: u8, prev: u64) -> u64 {
    let c = u64::from(c);
    prev.wrapping_add(c << 4).wrapping_add(c >> 4).wrapping_mul(11)
}

#[inline]
fn end_name_hash(hash: u64) -> u32 {
    hash as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const CI: CollationPolicy = CollationPolicy::CaseInsensitive(Codepage::Utf8);
    const CS: CollationPolicy = CollationPolicy::CaseSensitive;

    #[test]
    fn default_is_case_sensitive() {
        assert_eq!(CollationPolicy::default(), CS);
        assert!(!CS.ignores_case());
        assert!(CI.ignores_case());
    }

    #[test]
    fn fold_is_idempotent() {
        for name in [&b"Hello.TXT"[..], b"already", b"MiXeD_123", b"", b"\xC3\x89t\xC3\xA9"] {
            let once = CI.fold(name).into_owned();
            let twice = CI.fold(&once).into_owned();
            assert_eq!(once, twice);
            assert_eq!(CI.hash(&once), CI.hash(&twice));
        }
    }

    #[test]
    fn fold_borrows_when_unchanged() {
        assert!(matches!(CI.fold(b"lower"), Cow::Borrowed(_)));
        assert!(matches!(CI.fold(b"Upper"), Cow::Owned(_)));
        assert!(matches!(CS.fold(b"Upper"), Cow::Borrowed(_)));
    }

    #[test]
    fn hash_ignores_case_only_when_insensitive() {
        assert_eq!(CI.hash(b"README"), CI.hash(b"readme"));
        assert_ne!(CS.hash(b"README"), CS.hash(b"readme"));
        assert_eq!(CS.hash(b"readme"), CI.hash(b"readme"));
    }

    #[test]
    fn hash_of_empty_name_is_zero() {
        assert_eq!(CS.hash(b""), 0);
    }

    #[test]
    fn case_insensitive_equal_canonicalizes_to_query() {
        let mut stored = b"Foo".to_vec();
        let verdict = CI.compare_and_canonicalize(&mut stored, b"FOO");
        assert_eq!(verdict, Collation::Equal { canonicalized: true });
        assert_eq!(stored, b"FOO");
    }

    #[test]
    fn identical_query_reports_no_canonicalization() {
        let mut stored = b"Foo".to_vec();
        let verdict = CI.compare_and_canonicalize(&mut stored, b"Foo");
        assert_eq!(verdict, Collation::Equal { canonicalized: false });
    }

    #[test]
    fn case_sensitive_never_mutates() {
        let mut stored = b"Foo".to_vec();
        assert_eq!(
            CS.compare_and_canonicalize(&mut stored, b"FOO"),
            Collation::NotEqual
        );
        assert_eq!(
            CS.compare_and_canonicalize(&mut stored, b"Foo"),
            Collation::Equal { canonicalized: false }
        );
        assert_eq!(stored, b"Foo");
    }

    #[test]
    fn not_equal_leaves_stored_name() {
        let mut stored = b"Foo".to_vec();
        assert!(!CI.compare_and_canonicalize(&mut stored, b"Bar").is_equal());
        assert!(!CI.compare_and_canonicalize(&mut stored, b"Fooo").is_equal());
        assert_eq!(stored, b"Foo");
    }

    #[test]
    fn latin1_collation_folds_accents() {
        let policy = CollationPolicy::CaseInsensitive(Codepage::Iso8859_1);
        assert!(policy.matches(b"\xC9T\xC9", b"\xE9t\xE9"));
        assert_eq!(policy.hash(b"\xC9T\xC9"), policy.hash(b"\xE9t\xE9"));
        // The same bytes are not letters under UTF-8 folding.
        assert!(!CI.matches(b"\xC9", b"\xE9"));
    }
}
