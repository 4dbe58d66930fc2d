//! # Namespace
//!
//! One mounted instance of the in-memory namespace: its configuration, the
//! active collation policy, the node budget and the root directory.
//!
//! ## Lifecycle
//!
//! ```text
//! MountParams ──validated──┐
//! option string ──parse──▶ MountConfig ──▶ CollationPolicy
//!                          └──────────────▶ root directory (0755)
//! ```
//!
//! [`Namespace::unmount`] releases the configuration. Nodes are released by
//! reference counting once the host drops its last handle to them.
//!
//! ## Example
//!
//! ```rust
//! use samplefs::{Credentials, DirOps, Mode, MountParams, Namespace};
//!
//! let ns = Namespace::mount(Some("nocase"), MountParams::default()).unwrap();
//! let cred = Credentials::new(1000, 1000);
//!
//! ns.create(ns.root(), b"Foo", Mode::default_file(), &cred).unwrap();
//!
//! let dentry = ns.lookup(ns.root(), b"FOO").unwrap();
//! assert!(!dentry.is_negative());
//! assert_eq!(ns.readdir(ns.root()).unwrap()[0].name, b"FOO");
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use crate::dentry::{Directory, Resolution};
use crate::node::{InodeTable, Node, NodeSpec};
use crate::{
    CollationPolicy, ContentStore, CountingStore, Credentials, Dentry, DeviceId, DirEntry,
    DirOps, DIRENT_SIZE, FileType, FsError, FsStats, LinkOps, Mode, MountConfig, MountParams,
    NAME_MAX, NodeRef, PAGE_SIZE, SAMPLEFS_MAGIC, StatFs,
};

/// A mounted in-memory namespace.
pub struct Namespace {
    config: MountConfig,
    params: MountParams,
    policy: CollationPolicy,
    option_reports: Vec<FsError>,
    inodes: Arc<InodeTable>,
    store: Arc<dyn ContentStore>,
    root: NodeRef,
}

impl Namespace {
    /// Mount with the default [`CountingStore`] for file content.
    ///
    /// # Errors
    ///
    /// - [`FsError::OutOfResources`] if the root directory cannot be allocated
    pub fn mount(options: Option<&str>, params: MountParams) -> Result<Self, FsError> {
        Self::mount_with_store(options, params, Arc::new(CountingStore::new()))
    }

    /// Mount with a host-supplied content store.
    ///
    /// Validates `params`, parses `options` on top of the default
    /// configuration, selects the collation policy and creates the root
    /// directory. Bad options never fail the mount; they are available from
    /// [`Namespace::option_reports`].
    ///
    /// # Errors
    ///
    /// - [`FsError::OutOfResources`] if the root directory cannot be allocated
    pub fn mount_with_store(
        options: Option<&str>,
        params: MountParams,
        store: Arc<dyn ContentStore>,
    ) -> Result<Self, FsError> {
        let params = params.validated();

        let mut config = MountConfig::default();
        let option_reports = options
            .map(|options| config.apply_options(options))
            .unwrap_or_default();
        let policy = config.collation();

        let inodes = InodeTable::new(params.max_nodes);
        let root = Node::allocate(
            &inodes,
            &store,
            NodeSpec::Directory,
            Mode::default_dir(),
            &params.root_owner,
            "mount",
        )?;

        tracing::info!(
            ignore_case = config.ignore_case,
            codepage = %config.codepage,
            rsize = config.rsize,
            wsize = config.wsize,
            "mounted samplefs"
        );

        Ok(Self {
            config,
            params,
            policy,
            option_reports,
            inodes,
            store,
            root,
        })
    }

    /// Unmount, releasing the configuration and codepage selection.
    ///
    /// Nodes still referenced by the caller stay valid until dropped.
    pub fn unmount(self) {
        tracing::info!(live_nodes = self.inodes.live(), "unmounting samplefs");
    }

    /// The parsed mount configuration.
    #[inline]
    pub fn config(&self) -> &MountConfig {
        &self.config
    }

    /// The validated load-time parameters.
    #[inline]
    pub fn params(&self) -> &MountParams {
        &self.params
    }

    /// The collation policy selected at mount time.
    #[inline]
    pub fn collation(&self) -> CollationPolicy {
        self.policy
    }

    /// Mount options rejected while parsing, in order of appearance.
    #[inline]
    pub fn option_reports(&self) -> &[FsError] {
        &self.option_reports
    }

    /// Number of live nodes, root included.
    pub fn live_nodes(&self) -> u64 {
        self.inodes.live()
    }

    /// Validate a single path component and hash it under the mount's policy.
    fn hash_name(&self, name: &[u8], operation: &'static str) -> Result<u32, FsError> {
        if name.len() > NAME_MAX {
            return Err(FsError::NameTooLong {
                len: name.len(),
                max: NAME_MAX,
            });
        }
        let reason = match name {
            b"" => Some("empty name"),
            b"." | b".." => Some("reserved name"),
            _ if name.iter().any(|&b| b == b'/' || b == 0) => Some("name contains '/' or NUL"),
            _ => None,
        };
        if let Some(reason) = reason {
            return Err(FsError::InvalidArgument { operation, reason });
        }
        Ok(self.policy.hash(name))
    }

    /// Shared creation path of create, mkdir, mknod and symlink.
    ///
    /// Validation happens before allocation so that a failure leaves
    /// nothing behind.
    fn make_node(
        &self,
        dir: &NodeRef,
        name: &[u8],
        spec: NodeSpec<'_>,
        mode: Mode,
        cred: &Credentials,
        operation: &'static str,
    ) -> Result<NodeRef, FsError> {
        let table = directory(dir)?;
        let hash = self.hash_name(name, operation)?;
        if table.get(self.policy, name, hash).is_some() {
            return Err(FsError::already_exists(name, operation));
        }

        let node = Node::allocate(&self.inodes, &self.store, spec, mode, cred, operation)?;

        let parent_mode = dir.mode();
        if parent_mode.contains(Mode::S_ISGID) {
            let parent_gid = dir.gid();
            let is_dir = node.is_dir();
            node.update(|attrs| {
                attrs.gid = parent_gid;
                if is_dir {
                    attrs.mode |= Mode::S_ISGID;
                }
            });
        }

        table.insert(name, hash, Arc::clone(&node));
        let now = SystemTime::now();
        dir.update(|attrs| {
            attrs.size += DIRENT_SIZE;
            attrs.touch_modified(now);
        });

        tracing::debug!(
            parent = dir.ino(),
            inode = node.ino(),
            name = %String::from_utf8_lossy(name),
            operation,
            "bound entry"
        );
        Ok(node)
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("config", &self.config)
            .field("params", &self.params)
            .field("policy", &self.policy)
            .field("live_nodes", &self.inodes.live())
            .finish_non_exhaustive()
    }
}

fn directory(node: &NodeRef) -> Result<&Directory, FsError> {
    node.directory()
        .ok_or(FsError::NotADirectory { inode: node.ino() })
}

/// Whether `dir` is `root` or lies anywhere below it.
fn subtree_contains(root: &NodeRef, dir: &NodeRef) -> bool {
    let mut pending = vec![NodeRef::clone(root)];
    while let Some(next) = pending.pop() {
        if Arc::ptr_eq(&next, dir) {
            return true;
        }
        if let Some(table) = next.directory() {
            pending.extend(table.subdirectories());
        }
    }
    false
}

impl DirOps for Namespace {
    fn root(&self) -> &NodeRef {
        &self.root
    }

    fn lookup(&self, dir: &NodeRef, name: &[u8]) -> Result<Dentry, FsError> {
        let table = directory(dir)?;
        let hash = self.hash_name(name, "lookup")?;
        let resolution = match table.resolve(self.policy, name, hash) {
            Some(node) => Resolution::Bound(node),
            None => Resolution::Unresolved,
        };
        Ok(Dentry::new(name, hash, self.policy, resolution))
    }

    fn create(
        &self,
        dir: &NodeRef,
        name: &[u8],
        mode: Mode,
        cred: &Credentials,
    ) -> Result<NodeRef, FsError> {
        self.make_node(dir, name, NodeSpec::File, mode, cred, "create")
    }

    fn mkdir(
        &self,
        dir: &NodeRef,
        name: &[u8],
        mode: Mode,
        cred: &Credentials,
    ) -> Result<NodeRef, FsError> {
        let node = self.make_node(dir, name, NodeSpec::Directory, mode, cred, "mkdir")?;
        dir.update(|attrs| attrs.nlink += 1);
        Ok(node)
    }

    fn mknod(
        &self,
        dir: &NodeRef,
        name: &[u8],
        file_type: FileType,
        mode: Mode,
        rdev: DeviceId,
        cred: &Credentials,
    ) -> Result<NodeRef, FsError> {
        let spec = match file_type {
            FileType::File => NodeSpec::File,
            special if special.is_special() => NodeSpec::Special(special, rdev),
            _ => {
                return Err(FsError::InvalidArgument {
                    operation: "mknod",
                    reason: "directories and symlinks have their own operations",
                });
            }
        };
        self.make_node(dir, name, spec, mode, cred, "mknod")
    }

    fn symlink(
        &self,
        dir: &NodeRef,
        name: &[u8],
        target: &[u8],
        cred: &Credentials,
    ) -> Result<NodeRef, FsError> {
        self.make_node(
            dir,
            name,
            NodeSpec::Symlink(target),
            Mode::ALL_RWX,
            cred,
            "symlink",
        )
    }

    fn readdir(&self, dir: &NodeRef) -> Result<Vec<DirEntry>, FsError> {
        let entries = directory(dir)?.list();
        dir.update(|attrs| attrs.atime = SystemTime::now());
        Ok(entries)
    }
}

impl LinkOps for Namespace {
    fn link(&self, node: &NodeRef, dir: &NodeRef, name: &[u8]) -> Result<(), FsError> {
        let table = directory(dir)?;
        if node.is_dir() {
            return Err(FsError::IsADirectory { inode: node.ino() });
        }
        let hash = self.hash_name(name, "link")?;
        if table.get(self.policy, name, hash).is_some() {
            return Err(FsError::already_exists(name, "link"));
        }

        let now = SystemTime::now();
        node.update(|attrs| {
            attrs.nlink += 1;
            attrs.ctime = now;
        });
        table.insert(name, hash, Arc::clone(node));
        dir.update(|attrs| {
            attrs.size += DIRENT_SIZE;
            attrs.touch_modified(now);
        });
        Ok(())
    }

    fn unlink(&self, dir: &NodeRef, name: &[u8]) -> Result<(), FsError> {
        let table = directory(dir)?;
        let hash = self.hash_name(name, "unlink")?;
        let node = table
            .get(self.policy, name, hash)
            .ok_or_else(|| FsError::not_found(name, "unlink"))?;
        if node.is_dir() {
            return Err(FsError::IsADirectory { inode: node.ino() });
        }

        table.remove(self.policy, name, hash);
        let now = SystemTime::now();
        node.update(|attrs| {
            attrs.nlink = attrs.nlink.saturating_sub(1);
            attrs.ctime = now;
        });
        dir.update(|attrs| {
            attrs.size = attrs.size.saturating_sub(DIRENT_SIZE);
            attrs.touch_modified(now);
        });
        Ok(())
    }

    fn rmdir(&self, dir: &NodeRef, name: &[u8]) -> Result<(), FsError> {
        let table = directory(dir)?;
        let hash = self.hash_name(name, "rmdir")?;
        let child = table
            .get(self.policy, name, hash)
            .ok_or_else(|| FsError::not_found(name, "rmdir"))?;
        if !directory(&child)?.is_empty() {
            return Err(FsError::DirectoryNotEmpty { inode: child.ino() });
        }

        table.remove(self.policy, name, hash);
        let now = SystemTime::now();
        child.update(|attrs| {
            attrs.nlink = 0;
            attrs.ctime = now;
        });
        dir.update(|attrs| {
            attrs.nlink = attrs.nlink.saturating_sub(1);
            attrs.size = attrs.size.saturating_sub(DIRENT_SIZE);
            attrs.touch_modified(now);
        });
        Ok(())
    }

    fn rename(
        &self,
        old_dir: &NodeRef,
        old_name: &[u8],
        new_dir: &NodeRef,
        new_name: &[u8],
    ) -> Result<(), FsError> {
        let old_table = directory(old_dir)?;
        let new_table = directory(new_dir)?;
        let old_hash = self.hash_name(old_name, "rename")?;
        let new_hash = self.hash_name(new_name, "rename")?;

        let node = old_table
            .get(self.policy, old_name, old_hash)
            .ok_or_else(|| FsError::not_found(old_name, "rename"))?;
        if node.is_dir() && subtree_contains(&node, new_dir) {
            return Err(FsError::InvalidArgument {
                operation: "rename",
                reason: "directory moved below itself",
            });
        }
        let target = new_table.get(self.policy, new_name, new_hash);

        if let Some(target) = &target {
            if Arc::ptr_eq(target, &node) {
                // Same entry under another casing: adopt the new casing.
                if Arc::ptr_eq(old_dir, new_dir) && self.policy.matches(old_name, new_name) {
                    new_table.resolve(self.policy, new_name, new_hash);
                }
                return Ok(());
            }
            match (node.is_dir(), target.is_dir()) {
                (true, false) => return Err(FsError::NotADirectory { inode: target.ino() }),
                (false, true) => return Err(FsError::IsADirectory { inode: target.ino() }),
                (true, true) if !directory(target)?.is_empty() => {
                    return Err(FsError::DirectoryNotEmpty { inode: target.ino() });
                }
                _ => {}
            }
        }

        let now = SystemTime::now();
        let moves_dir = node.is_dir();

        if let Some(target) = target {
            new_table.remove(self.policy, new_name, new_hash);
            target.update(|attrs| {
                attrs.nlink = if moves_dir {
                    0
                } else {
                    attrs.nlink.saturating_sub(1)
                };
                attrs.ctime = now;
            });
            new_dir.update(|attrs| attrs.size = attrs.size.saturating_sub(DIRENT_SIZE));
            if moves_dir {
                // The replaced directory's ".." link in new_dir is taken over
                // by the moved one; only old_dir loses a link.
                old_dir.update(|attrs| attrs.nlink = attrs.nlink.saturating_sub(1));
            }
        } else if moves_dir {
            old_dir.update(|attrs| attrs.nlink = attrs.nlink.saturating_sub(1));
            new_dir.update(|attrs| attrs.nlink += 1);
        }

        old_table.remove(self.policy, old_name, old_hash);
        new_table.insert(new_name, new_hash, Arc::clone(&node));

        old_dir.update(|attrs| {
            attrs.size = attrs.size.saturating_sub(DIRENT_SIZE);
            attrs.touch_modified(now);
        });
        new_dir.update(|attrs| {
            attrs.size += DIRENT_SIZE;
            attrs.touch_modified(now);
        });
        node.update(|attrs| attrs.ctime = now);

        tracing::debug!(
            inode = node.ino(),
            from = old_dir.ino(),
            to = new_dir.ino(),
            name = %String::from_utf8_lossy(new_name),
            "renamed entry"
        );
        Ok(())
    }

    fn readlink(&self, node: &NodeRef) -> Result<Vec<u8>, FsError> {
        node.link_target()
            .map(<[u8]>::to_vec)
            .ok_or(FsError::InvalidArgument {
                operation: "readlink",
                reason: "not a symlink",
            })
    }
}

impl FsStats for Namespace {
    fn statfs(&self) -> Result<StatFs, FsError> {
        let used = self.inodes.live();
        let total = self.inodes.max().unwrap_or(0);
        Ok(StatFs {
            magic: SAMPLEFS_MAGIC,
            block_size: PAGE_SIZE as u64,
            max_name_len: NAME_MAX as u64,
            total_inodes: total,
            used_inodes: used,
            free_inodes: total.saturating_sub(used),
        })
    }
}
