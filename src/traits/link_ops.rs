//! Hard link, unlink, rename and symlink reading.

use crate::{FsError, NodeRef};

/// Graph edits on existing bindings.
///
/// These follow the generic semantics of an in-memory VFS: the namespace keeps
/// link counts, advisory directory sizes and timestamps consistent, and
/// refuses to move a directory below itself. Permission checks stay with the
/// caller.
///
/// # Locking Precondition
///
/// As for [`DirOps`](super::DirOps), the caller holds exclusive access to every
/// directory an operation touches.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn LinkOps`.
pub trait LinkOps: Send + Sync {
    /// Bind an existing non-directory node under a new name.
    ///
    /// # Errors
    ///
    /// - [`FsError::IsADirectory`] if `node` is a directory
    /// - [`FsError::NotADirectory`] if `dir` is not a directory
    /// - [`FsError::NameTooLong`] if `name` exceeds [`NAME_MAX`](crate::NAME_MAX)
    /// - [`FsError::AlreadyExists`] if `name` is already bound
    fn link(&self, node: &NodeRef, dir: &NodeRef, name: &[u8]) -> Result<(), FsError>;

    /// Remove a non-directory binding.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `name` is not bound
    /// - [`FsError::IsADirectory`] if `name` is bound to a directory
    fn unlink(&self, dir: &NodeRef, name: &[u8]) -> Result<(), FsError>;

    /// Remove an empty directory.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `name` is not bound
    /// - [`FsError::NotADirectory`] if `name` is not bound to a directory
    /// - [`FsError::DirectoryNotEmpty`] if the directory has entries
    fn rmdir(&self, dir: &NodeRef, name: &[u8]) -> Result<(), FsError>;

    /// Move the binding `old_dir/old_name` to `new_dir/new_name`, replacing
    /// an existing binding of compatible type.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `old_name` is not bound
    /// - [`FsError::NotADirectory`] if a directory would replace a non-directory
    /// - [`FsError::IsADirectory`] if a non-directory would replace a directory
    /// - [`FsError::DirectoryNotEmpty`] if the replaced directory has entries
    /// - [`FsError::InvalidArgument`] if a directory would move into itself or
    ///   below one of its descendants
    fn rename(
        &self,
        old_dir: &NodeRef,
        old_name: &[u8],
        new_dir: &NodeRef,
        new_name: &[u8],
    ) -> Result<(), FsError>;

    /// Read a symlink's target.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidArgument`] if `node` is not a symlink
    fn readlink(&self, node: &NodeRef) -> Result<Vec<u8>, FsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_ops_is_object_safe() {
        fn _check(_: &dyn LinkOps) {}
    }

    #[test]
    fn link_ops_requires_send_sync() {
        fn _assert_send_sync<T: Send + Sync>() {}
        fn _check<T: LinkOps>() {
            _assert_send_sync::<T>();
        }
    }
}
