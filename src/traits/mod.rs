//! # Namespace Traits
//!
//! The surface a host VFS dispatches into, plus the seam to the external
//! content store.
//!
//! ## Quick Reference
//!
//! | Trait | Methods | Role |
//! |-------|---------|------|
//! | [`DirOps`] | `root`, `lookup`, `create`, `mkdir`, `mknod`, `symlink`, `readdir` | resolution and creation |
//! | [`LinkOps`] | `link`, `unlink`, `rmdir`, `rename`, `readlink` | edits of existing bindings |
//! | [`FsStats`] | `statfs` | filesystem statistics |
//! | [`FsNamespace`] | all of the above | composite, blanket-implemented |
//! | [`ContentStore`] | `allocate`, `release` | external store for file bytes |
//!
//! ## Blanket Implementation
//!
//! [`FsNamespace`] is implemented for every type implementing its three
//! component traits:
//!
//! ```rust
//! use samplefs::{FsNamespace, MountParams, Namespace};
//!
//! fn use_namespace<N: FsNamespace>(_ns: &N) { /* ... */ }
//!
//! let ns = Namespace::mount(None, MountParams::default()).unwrap();
//! use_namespace(&ns);
//! ```
//!
//! ## Object Safety
//!
//! All traits are object-safe:
//!
//! ```rust
//! use samplefs::{DirOps, MountParams, Namespace};
//!
//! fn entries(ops: &dyn DirOps) -> usize {
//!     ops.readdir(ops.root()).map(|e| e.len()).unwrap_or(0)
//! }
//!
//! let ns = Namespace::mount(None, MountParams::default()).unwrap();
//! assert_eq!(entries(&ns), 0);
//! ```

mod content_store;
mod dir_ops;
mod fs_stats;
mod link_ops;

pub use content_store::{ContentHandle, ContentStore, CountingStore};
pub use dir_ops::DirOps;
pub use fs_stats::FsStats;
pub use link_ops::LinkOps;

/// Complete namespace surface: resolution, creation, edits and statistics.
///
/// # Blanket Implementation
///
/// Automatically implemented for any type implementing
/// `DirOps + LinkOps + FsStats`.
///
/// # Example
///
/// ```rust
/// use samplefs::{Credentials, FsError, FsNamespace, Mode};
///
/// fn scratch_dir<N: FsNamespace>(ns: &N) -> Result<u64, FsError> {
///     let cred = Credentials::ROOT;
///     let dir = ns.mkdir(ns.root(), b"scratch", Mode::default_dir(), &cred)?;
///     ns.create(&dir, b"a", Mode::default_file(), &cred)?;
///     ns.unlink(&dir, b"a")?;
///     ns.rmdir(ns.root(), b"scratch")?;
///     Ok(ns.statfs()?.used_inodes)
/// }
/// ```
pub trait FsNamespace: DirOps + LinkOps + FsStats {}

impl<T: DirOps + LinkOps + FsStats> FsNamespace for T {}
