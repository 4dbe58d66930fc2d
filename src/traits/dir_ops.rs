//! Name resolution and node creation within a directory.

use crate::{Credentials, Dentry, DeviceId, DirEntry, FileType, FsError, Mode, NodeRef};

/// Directory operations a host dispatches into the namespace.
///
/// # Locking Precondition
///
/// Every method that mutates a directory assumes the caller holds exclusive
/// access to that directory for the duration of the call, as a VFS does with
/// its per-directory lock. Implementations do not serialize concurrent
/// mutations of the same directory on their own.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn DirOps`.
pub trait DirOps: Send + Sync {
    /// The namespace root directory.
    fn root(&self) -> &NodeRef;

    /// Resolve `name` within `dir`.
    ///
    /// Returns a [`Dentry`] that is either bound to a node or negative. A
    /// negative result is not remembered: the next lookup of the same name
    /// is resolved from scratch. Under case-insensitive collation a match
    /// rewrites the stored name to the casing of `name`.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotADirectory`] if `dir` is not a directory
    /// - [`FsError::NameTooLong`] if `name` exceeds [`NAME_MAX`](crate::NAME_MAX)
    /// - [`FsError::InvalidArgument`] if `name` is empty, `.` or `..`, or
    ///   contains `/` or NUL
    fn lookup(&self, dir: &NodeRef, name: &[u8]) -> Result<Dentry, FsError>;

    /// Create a regular file.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotADirectory`] if `dir` is not a directory
    /// - [`FsError::NameTooLong`] if `name` exceeds [`NAME_MAX`](crate::NAME_MAX)
    /// - [`FsError::InvalidArgument`] if `name` is not a single path component
    /// - [`FsError::AlreadyExists`] if `name` is already bound
    /// - [`FsError::OutOfResources`] if the node cannot be allocated
    fn create(
        &self,
        dir: &NodeRef,
        name: &[u8],
        mode: Mode,
        cred: &Credentials,
    ) -> Result<NodeRef, FsError>;

    /// Create a directory. The parent gains one link for the child's `..`.
    ///
    /// # Errors
    ///
    /// Same as [`DirOps::create`].
    fn mkdir(
        &self,
        dir: &NodeRef,
        name: &[u8],
        mode: Mode,
        cred: &Credentials,
    ) -> Result<NodeRef, FsError>;

    /// Create a regular file or a special node (device, fifo, socket).
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidArgument`] for [`FileType::Directory`] or
    ///   [`FileType::Symlink`]
    /// - otherwise the same as [`DirOps::create`]
    fn mknod(
        &self,
        dir: &NodeRef,
        name: &[u8],
        file_type: FileType,
        mode: Mode,
        rdev: DeviceId,
        cred: &Credentials,
    ) -> Result<NodeRef, FsError>;

    /// Create a symbolic link to `target`. The target is stored literally.
    ///
    /// # Errors
    ///
    /// - [`FsError::NameTooLong`] if `target` does not fit one page; no node
    ///   or entry is left behind
    /// - otherwise the same as [`DirOps::create`]
    fn symlink(
        &self,
        dir: &NodeRef,
        name: &[u8],
        target: &[u8],
        cred: &Credentials,
    ) -> Result<NodeRef, FsError>;

    /// List the bound entries of `dir` in insertion order.
    ///
    /// `.` and `..` are not included.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotADirectory`] if `dir` is not a directory
    fn readdir(&self, dir: &NodeRef) -> Result<Vec<DirEntry>, FsError>;
}
