//! # Mount Configuration
//!
//! Per-mount configuration parsed from the host's option string, and the
//! explicit load-time parameters passed to [`Namespace::mount`].
//!
//! ## Option Grammar
//!
//! ```text
//! options = token ( "," token )*
//! token   = key [ "=" value ]
//! ```
//!
//! | Key | Effect |
//! |-----|--------|
//! | `rsize=<n>` | read-size hint; non-positive or non-numeric values are ignored |
//! | `wsize=<n>` | write-size hint; same rules as `rsize` |
//! | `nocase`, `ignorecase` | case-insensitive collation; takes no value |
//! | `iocharset=<name>` | codepage for case folding |
//!
//! Keys match case-insensitively. Numbers may be decimal, `0x` hex or
//! leading-`0` octal. Tokens apply left to right, so the last occurrence of a
//! key wins. Parsing never aborts: an unknown key, a flag given a value or an
//! unusable `iocharset` is logged and reported as [`FsError::BadMountOption`],
//! and the remaining tokens are still applied.
//!
//! [`Namespace::mount`]: crate::Namespace::mount

use crate::{Codepage, CollationPolicy, Credentials, FsError};

/// Largest accepted [`MountParams::load_parm`].
pub const LOAD_PARM_MAX: u32 = 256;

/// Value an out-of-range [`MountParams::load_parm`] is reset to.
pub const LOAD_PARM_FALLBACK: u32 = 10;

/// Configuration of one mount instance.
///
/// # Example
///
/// ```rust
/// use samplefs::{CollationPolicy, Codepage, MountConfig};
///
/// let (config, reports) = MountConfig::parse("rsize=4096,bogus,wsize=-1,ignorecase");
/// assert_eq!(config.rsize, 4096);
/// assert_eq!(config.wsize, 0);
/// assert_eq!(
///     config.collation(),
///     CollationPolicy::CaseInsensitive(Codepage::Utf8)
/// );
/// assert_eq!(reports.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MountConfig {
    /// Advisory read size (0 = host default).
    pub rsize: u32,
    /// Advisory write size (0 = host default).
    pub wsize: u32,
    /// Compare names case-insensitively.
    pub ignore_case: bool,
    /// Codepage used for case folding.
    pub codepage: Codepage,
}

impl MountConfig {
    /// Parse an option string on top of the defaults.
    ///
    /// Returns the configuration together with one
    /// [`FsError::BadMountOption`] per rejected token.
    pub fn parse(options: &str) -> (Self, Vec<FsError>) {
        let mut config = Self::default();
        let reports = config.apply_options(options);
        (config, reports)
    }

    /// Apply an option string to this configuration.
    ///
    /// Every token is processed; rejected tokens are logged and returned.
    pub fn apply_options(&mut self, options: &str) -> Vec<FsError> {
        tracing::info!(options, "parsing mount options");

        let mut reports = Vec::new();
        for token in options.split(',').filter(|t| !t.is_empty()) {
            if let Err(err) = self.apply_token(token) {
                tracing::warn!(option = token, "bad mount option");
                reports.push(err);
            }
        }
        reports
    }

    fn apply_token(&mut self, token: &str) -> Result<(), FsError> {
        let (key, value) = match token.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (token, None),
        };

        if key.eq_ignore_ascii_case("rsize") {
            if let Some(size) = value.and_then(parse_size) {
                self.rsize = size;
                tracing::info!(rsize = size, "read size hint");
            }
        } else if key.eq_ignore_ascii_case("wsize") {
            if let Some(size) = value.and_then(parse_size) {
                self.wsize = size;
                tracing::info!(wsize = size, "write size hint");
            }
        } else if key.eq_ignore_ascii_case("nocase") || key.eq_ignore_ascii_case("ignorecase") {
            // A flag; `nocase=off` is malformed, not a way to disable it.
            if value.is_some() {
                return Err(bad_option(token));
            }
            self.ignore_case = true;
            tracing::info!("ignore case");
        } else if key.eq_ignore_ascii_case("iocharset") {
            let codepage = value
                .and_then(Codepage::from_name)
                .ok_or_else(|| bad_option(token))?;
            self.codepage = codepage;
            tracing::info!(%codepage, "codepage");
        } else {
            return Err(bad_option(token));
        }
        Ok(())
    }

    /// The collation policy this configuration selects.
    pub fn collation(&self) -> CollationPolicy {
        if self.ignore_case {
            CollationPolicy::CaseInsensitive(self.codepage)
        } else {
            CollationPolicy::CaseSensitive
        }
    }
}

fn bad_option(token: &str) -> FsError {
    FsError::BadMountOption {
        option: token.to_owned(),
    }
}

/// Parse a size hint the way `strtoul(value, _, 0)` reads it, keeping only
/// positive values that fit a signed 32-bit integer.
fn parse_size(value: &str) -> Option<u32> {
    let (digits, radix) = if let Some(hex) = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        (hex, 16)
    } else if value.len() > 1 && value.starts_with('0') {
        (&value[1..], 8)
    } else {
        (value, 10)
    };

    // from_str_radix accepts a leading '+', strtoul does not
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let size = u32::from_str_radix(digits, radix).ok()?;
    (size > 0 && size <= i32::MAX as u32).then_some(size)
}

/// Explicit load-time parameters for a mount.
///
/// Validated once by [`MountParams::validated`] when the mount is created.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MountParams {
    /// Opaque tunable, `0..=256`. Out-of-range values are reset to
    /// [`LOAD_PARM_FALLBACK`].
    pub load_parm: u32,
    /// Maximum number of live nodes, root included (`None` = unlimited).
    pub max_nodes: Option<u64>,
    /// Owner of the root directory.
    pub root_owner: Credentials,
}

impl Default for MountParams {
    fn default() -> Self {
        Self {
            load_parm: 0,
            max_nodes: None,
            root_owner: Credentials::ROOT,
        }
    }
}

impl MountParams {
    /// Clamp out-of-range values, logging each correction.
    pub fn validated(mut self) -> Self {
        if self.load_parm > LOAD_PARM_MAX {
            tracing::warn!(
                load_parm = self.load_parm,
                reset_to = LOAD_PARM_FALLBACK,
                "load_parm too large"
            );
            self.load_parm = LOAD_PARM_FALLBACK;
        }
        self
    }
}
