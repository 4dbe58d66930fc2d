//! Error types for the samplefs namespace engine.

/// Namespace error type with contextual variants.
///
/// Every failed operation leaves the namespace exactly as it was before the
/// call. [`FsError::BadMountOption`] is never returned from an operation; the
/// mount option parser collects it as a non-fatal report instead.
///
/// # Examples
///
/// ```rust
/// use samplefs::FsError;
///
/// let err = FsError::NameTooLong { len: 300, max: 255 };
/// assert_eq!(err.to_string(), "name too long: 300 bytes (max 255)");
/// assert_eq!(err.to_errno(), -36);
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FsError {
    // Name errors
    /// Candidate name exceeds [`NAME_MAX`](crate::NAME_MAX) (or a symlink
    /// target does not fit one page).
    #[error("name too long: {len} bytes (max {max})")]
    NameTooLong {
        /// Length of the rejected name.
        len: usize,
        /// The limit that was exceeded.
        max: usize,
    },

    /// A name is already bound in the parent directory.
    #[error("{operation}: already exists: {name}")]
    AlreadyExists {
        /// The name that is already bound (lossy UTF-8).
        name: String,
        /// The operation that failed.
        operation: &'static str,
    },

    /// No entry is bound to the name.
    #[error("{operation}: not found: {name}")]
    NotFound {
        /// The name that was not found (lossy UTF-8).
        name: String,
        /// The operation that failed.
        operation: &'static str,
    },

    // Node kind errors
    /// Expected a directory node.
    #[error("not a directory: inode {inode}")]
    NotADirectory {
        /// The offending inode.
        inode: u64,
    },

    /// Operation is not valid on a directory node.
    #[error("is a directory: inode {inode}")]
    IsADirectory {
        /// The offending inode.
        inode: u64,
    },

    /// Directory still has bound entries.
    #[error("directory not empty: inode {inode}")]
    DirectoryNotEmpty {
        /// The non-empty directory.
        inode: u64,
    },

    /// Argument does not fit the operation.
    #[error("{operation}: invalid argument ({reason})")]
    InvalidArgument {
        /// The operation that failed.
        operation: &'static str,
        /// Why the argument was rejected.
        reason: &'static str,
    },

    // Resource errors
    /// Node or content allocation could not be satisfied.
    #[error("{operation}: out of resources")]
    OutOfResources {
        /// The operation that needed the allocation.
        operation: &'static str,
    },

    // Mount errors
    /// Unrecognized or malformed mount option token.
    #[error("bad mount option: {option}")]
    BadMountOption {
        /// The token as it appeared in the option string.
        option: String,
    },
}

impl FsError {
    /// Convert to the negative POSIX errno a host returns to its caller.
    pub fn to_errno(&self) -> i32 {
        match self {
            FsError::NotFound { .. } => -2,
            FsError::OutOfResources { .. } => -28,
            FsError::AlreadyExists { .. } => -17,
            FsError::NotADirectory { .. } => -20,
            FsError::IsADirectory { .. } => -21,
            FsError::InvalidArgument { .. } | FsError::BadMountOption { .. } => -22,
            FsError::NameTooLong { .. } => -36,
            FsError::DirectoryNotEmpty { .. } => -39,
        }
    }

    pub(crate) fn already_exists(name: &[u8], operation: &'static str) -> Self {
        FsError::AlreadyExists {
            name: String::from_utf8_lossy(name).into_owned(),
            operation,
        }
    }

    pub(crate) fn not_found(name: &[u8], operation: &'static str) -> Self {
        FsError::NotFound {
            name: String::from_utf8_lossy(name).into_owned(),
            operation,
        }
    }
}
