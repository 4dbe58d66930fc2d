//! # Nodes
//!
//! The inode-equivalent objects of the namespace and the factory that
//! allocates them.
//!
//! A node's kind is fixed at creation and expressed as the [`NodeKind`] sum
//! type; operations `match` on it. Nodes are shared through [`NodeRef`]
//! (`Arc<Node>`): every directory entry binding a node and every handle the
//! host keeps holds one reference, and the node is reclaimed when the last one
//! is dropped. Reclaiming returns the node's inode slot to the mount budget
//! and its content handle to the content store.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use parking_lot::RwLock;

use crate::dentry::Directory;
use crate::{
    ContentHandle, ContentStore, Credentials, DeviceId, FileType, FsError, Metadata, Mode,
    PAGE_SIZE, ROOT_INODE,
};

/// Shared reference to a node.
pub type NodeRef = Arc<Node>;

/// An in-memory filesystem object.
#[derive(Debug)]
pub struct Node {
    slot: InodeSlot,
    kind: NodeKind,
    attrs: RwLock<Attributes>,
}

/// What a node is. Immutable after creation.
#[derive(Debug)]
pub enum NodeKind {
    /// Regular file whose bytes live in the external content store.
    RegularFile(Content),
    /// Directory with its entry table.
    Directory(Directory),
    /// Symbolic link with its literal, unvalidated target.
    Symlink(Box<[u8]>),
    /// Device, fifo or socket node; further handling belongs to the host.
    Special {
        /// One of the special file types.
        file_type: FileType,
        /// Device number.
        rdev: DeviceId,
    },
}

/// A regular file's content handle, released back to its store on drop.
pub struct Content {
    handle: ContentHandle,
    store: Arc<dyn ContentStore>,
}

impl Content {
    /// The opaque handle owned by the content store.
    #[inline]
    pub fn handle(&self) -> ContentHandle {
        self.handle
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Content")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl Drop for Content {
    fn drop(&mut self) {
        self.store.release(self.handle);
    }
}

/// Mutable attributes of a node.
///
/// Writers are serialized by the caller's per-directory exclusion; the lock
/// around these fields is never contended in that model.
#[derive(Debug, Clone)]
pub(crate) struct Attributes {
    pub(crate) mode: Mode,
    pub(crate) uid: u32,
    pub(crate) gid: u32,
    pub(crate) nlink: u64,
    pub(crate) size: u64,
    pub(crate) atime: SystemTime,
    pub(crate) mtime: SystemTime,
    pub(crate) ctime: SystemTime,
}

impl Attributes {
    /// Refresh modify and change times.
    pub(crate) fn touch_modified(&mut self, now: SystemTime) {
        self.mtime = now;
        self.ctime = now;
    }
}

/// What the factory should build.
#[derive(Debug, Clone, Copy)]
pub(crate) enum NodeSpec<'a> {
    File,
    Directory,
    Symlink(&'a [u8]),
    Special(FileType, DeviceId),
}

impl Node {
    /// Allocate a new node.
    ///
    /// Reserves an inode slot, then performs the kind-specific setup. Any
    /// failure drops what was reserved so far; nothing is left allocated.
    ///
    /// # Errors
    ///
    /// - [`FsError::OutOfResources`] if the node budget or the content store
    ///   is exhausted
    /// - [`FsError::NameTooLong`] if a symlink target does not fit one page
    pub(crate) fn allocate(
        inodes: &Arc<InodeTable>,
        store: &Arc<dyn ContentStore>,
        spec: NodeSpec<'_>,
        mode: Mode,
        cred: &Credentials,
        operation: &'static str,
    ) -> Result<NodeRef, FsError> {
        let slot = inodes
            .reserve()
            .ok_or(FsError::OutOfResources { operation })?;

        let (kind, size) = match spec {
            NodeSpec::File => {
                let handle = store
                    .allocate()
                    .ok_or(FsError::OutOfResources { operation })?;
                let content = Content {
                    handle,
                    store: Arc::clone(store),
                };
                (NodeKind::RegularFile(content), 0)
            }
            NodeSpec::Directory => (NodeKind::Directory(Directory::new()), 0),
            NodeSpec::Symlink(target) => {
                let target = write_link_target(target)?;
                let size = target.len() as u64;
                (NodeKind::Symlink(target), size)
            }
            NodeSpec::Special(file_type, rdev) => (NodeKind::Special { file_type, rdev }, 0),
        };

        let now = SystemTime::now();
        let node = Arc::new(Node {
            slot,
            attrs: RwLock::new(Attributes {
                mode,
                uid: cred.uid,
                gid: cred.gid,
                // "." and the parent's entry
                nlink: if matches!(kind, NodeKind::Directory(_)) { 2 } else { 1 },
                size,
                atime: now,
                mtime: now,
                ctime: now,
            }),
            kind,
        });

        tracing::debug!(
            inode = node.ino(),
            file_type = ?node.file_type(),
            mode = mode.bits(),
            "allocated node"
        );
        Ok(node)
    }

    /// Inode number, unique for the lifetime of the mount.
    #[inline]
    pub fn ino(&self) -> u64 {
        self.slot.ino
    }

    /// The node's kind.
    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The node's file type.
    pub fn file_type(&self) -> FileType {
        match &self.kind {
            NodeKind::RegularFile(_) => FileType::File,
            NodeKind::Directory(_) => FileType::Directory,
            NodeKind::Symlink(_) => FileType::Symlink,
            NodeKind::Special { file_type, .. } => *file_type,
        }
    }

    /// Returns `true` if this is a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory(_))
    }

    /// Snapshot of the node's attributes.
    pub fn metadata(&self) -> Metadata {
        let attrs = self.attrs.read();
        Metadata {
            inode: self.ino(),
            file_type: self.file_type(),
            mode: attrs.mode,
            uid: attrs.uid,
            gid: attrs.gid,
            size: attrs.size,
            nlink: attrs.nlink,
            accessed: attrs.atime,
            modified: attrs.mtime,
            changed: attrs.ctime,
            rdev: self.rdev(),
        }
    }

    /// Current hard link count.
    pub fn nlink(&self) -> u64 {
        self.attrs.read().nlink
    }

    /// Size in bytes (advisory for directories).
    pub fn size(&self) -> u64 {
        self.attrs.read().size
    }

    /// Permission bits.
    pub fn mode(&self) -> Mode {
        self.attrs.read().mode
    }

    /// Owning user id.
    pub fn uid(&self) -> u32 {
        self.attrs.read().uid
    }

    /// Owning group id.
    pub fn gid(&self) -> u32 {
        self.attrs.read().gid
    }

    /// Content handle of a regular file.
    pub fn content_handle(&self) -> Option<ContentHandle> {
        match &self.kind {
            NodeKind::RegularFile(content) => Some(content.handle()),
            _ => None,
        }
    }

    /// Target of a symlink.
    pub fn link_target(&self) -> Option<&[u8]> {
        match &self.kind {
            NodeKind::Symlink(target) => Some(target),
            _ => None,
        }
    }

    /// Device number of a special node.
    pub fn rdev(&self) -> Option<DeviceId> {
        match &self.kind {
            NodeKind::Special { rdev, .. } => Some(*rdev),
            _ => None,
        }
    }

    /// Replace the permission bits.
    pub fn chmod(&self, mode: Mode) {
        let mut attrs = self.attrs.write();
        attrs.mode = mode;
        attrs.ctime = SystemTime::now();
    }

    /// Change owner and group.
    pub fn chown(&self, uid: u32, gid: u32) {
        let mut attrs = self.attrs.write();
        attrs.uid = uid;
        attrs.gid = gid;
        attrs.ctime = SystemTime::now();
    }

    pub(crate) fn directory(&self) -> Option<&Directory> {
        match &self.kind {
            NodeKind::Directory(dir) => Some(dir),
            _ => None,
        }
    }

    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut Attributes) -> R) -> R {
        f(&mut self.attrs.write())
    }
}

/// Copy a symlink target into the node's page.
///
/// The target plus its terminating NUL must fit one page.
fn write_link_target(target: &[u8]) -> Result<Box<[u8]>, FsError> {
    if target.len() + 1 > PAGE_SIZE {
        return Err(FsError::NameTooLong {
            len: target.len(),
            max: PAGE_SIZE - 1,
        });
    }
    Ok(target.into())
}

// ============================================================================
// Inode budget
// ============================================================================

/// Mount-wide inode number allocator and node budget.
#[derive(Debug)]
pub(crate) struct InodeTable {
    next: AtomicU64,
    live: AtomicU64,
    max: Option<u64>,
}

impl InodeTable {
    pub(crate) fn new(max: Option<u64>) -> Arc<Self> {
        Arc::new(Self {
            next: AtomicU64::new(ROOT_INODE),
            live: AtomicU64::new(0),
            max,
        })
    }

    /// Reserve a slot for a new node, or `None` when the budget is spent.
    pub(crate) fn reserve(self: &Arc<Self>) -> Option<InodeSlot> {
        let limit = self.max.unwrap_or(u64::MAX);
        self.live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
                (live < limit).then_some(live + 1)
            })
            .ok()?;
        Some(InodeSlot {
            ino: self.next.fetch_add(1, Ordering::Relaxed),
            table: Arc::clone(self),
        })
    }

    pub(crate) fn live(&self) -> u64 {
        self.live.load(Ordering::Acquire)
    }

    pub(crate) fn max(&self) -> Option<u64> {
        self.max
    }
}

/// One unit of the node budget, held by a live node.
#[derive(Debug)]
pub(crate) struct InodeSlot {
    ino: u64,
    table: Arc<InodeTable>,
}

impl Drop for InodeSlot {
    fn drop(&mut self) {
        self.table.live.fetch_sub(1, Ordering::AcqRel);
    }
}
