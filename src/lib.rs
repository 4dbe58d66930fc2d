//! # samplefs
//!
//! An in-memory hierarchical namespace with a mount-time **collation policy**.
//!
//! The crate holds directories, regular files, symbolic links and special
//! nodes entirely in memory. A host VFS drives it through the [`DirOps`],
//! [`LinkOps`] and [`FsStats`] traits; the crate never performs path walking,
//! permission checks or data I/O on its own. Regular file bytes live in an
//! external [`ContentStore`]; a node only keeps the handle.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use samplefs::{Credentials, DirOps, FsStats, LinkOps, Mode, MountParams, Namespace};
//!
//! fn main() -> Result<(), samplefs::FsError> {
//!     let ns = Namespace::mount(Some("rsize=4096,nocase"), MountParams::default())?;
//!     let cred = Credentials::new(1000, 1000);
//!
//!     let docs = ns.mkdir(ns.root(), b"Docs", Mode::default_dir(), &cred)?;
//!     ns.create(&docs, b"notes.txt", Mode::default_file(), &cred)?;
//!     ns.symlink(ns.root(), b"latest", b"Docs/notes.txt", &cred)?;
//!
//!     // Case-insensitive lookup; the stored name adopts the queried casing.
//!     let found = ns.lookup(ns.root(), b"DOCS")?;
//!     assert!(!found.is_negative());
//!
//!     ns.unlink(&docs, b"NOTES.TXT")?;
//!     assert_eq!(ns.statfs()?.used_inodes, 3);
//!     Ok(())
//! }
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Namespace`] | One mounted instance: config, collation policy, root |
//! | [`Node`] / [`NodeRef`] | Shared inode-equivalent object |
//! | [`NodeKind`] | File, directory, symlink or special node |
//! | [`Dentry`] | Result of a lookup: bound or negative |
//! | [`CollationPolicy`] | Exact or case-insensitive name comparison |
//! | [`MountConfig`] | Parsed mount options |
//! | [`MountParams`] | Load-time parameters |
//! | [`FsError`] | Error type with context and errno mapping |
//!
//! ---
//!
//! ## Collation
//!
//! Collation is fixed for the life of a mount. Case-sensitive mounts compare
//! names byte for byte. Mounting with `nocase` (or `ignorecase`) folds names
//! through the selected [`Codepage`]: hashing, comparison and the existence
//! check of every create operation all use the folded form, and a successful
//! lookup rewrites the stored name to the casing it was looked up with.
//!
//! ---
//!
//! ## Error Handling
//!
//! All operations return `Result<T, FsError>`. Errors carry the operation and
//! the offending name or inode, and map onto negative errno values:
//!
//! ```rust
//! use samplefs::FsError;
//!
//! let err = FsError::AlreadyExists { name: "a.txt".into(), operation: "create" };
//! assert_eq!(err.to_string(), "create: already exists: a.txt");
//! assert_eq!(err.to_errno(), -17);
//! ```
//!
//! ---
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` and take `&self`. Mutating operations on a
//! directory assume the host holds that directory's exclusive lock, as a VFS
//! does; node attributes use interior mutability under that model.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Enable serialization for [`MountConfig`], [`MountParams`], [`Metadata`], [`DirEntry`], etc. |

// Private modules
mod codepage;
mod collation;
mod dentry;
mod error;
mod mount;
mod namespace;
mod node;
mod traits;
mod types;

// Public re-exports - error types
pub use error::FsError;

// Public re-exports - core types
pub use types::{
    Credentials, DeviceId, DirEntry, FileType, Metadata, Mode, StatFs, DIRENT_SIZE, NAME_MAX,
    PAGE_SIZE, ROOT_INODE, SAMPLEFS_MAGIC,
};

// Public re-exports - collation
pub use codepage::Codepage;
pub use collation::{Collation, CollationPolicy};

// Public re-exports - namespace objects
pub use dentry::{Dentry, Directory, Resolution};
pub use node::{Content, Node, NodeKind, NodeRef};

// Public re-exports - mount lifecycle
pub use mount::{MountConfig, MountParams, LOAD_PARM_FALLBACK, LOAD_PARM_MAX};
pub use namespace::Namespace;

// Public re-exports - traits
pub use traits::{
    ContentHandle, ContentStore, CountingStore, DirOps, FsNamespace, FsStats, LinkOps,
};
