//! Core types for the samplefs namespace.

use std::time::SystemTime;

/// The root directory always has inode 1.
pub const ROOT_INODE: u64 = 1;

/// Maximum length of a single entry name, in bytes.
pub const NAME_MAX: usize = 255;

/// Page size of the backing store; also the symlink target limit.
pub const PAGE_SIZE: usize = 4096;

/// Advisory size added to a directory for each entry bound in it.
pub const DIRENT_SIZE: u64 = 0x20;

/// Filesystem magic reported by `statfs` ("samp").
pub const SAMPLEFS_MAGIC: u64 = 0x7361_6d70;

bitflags::bitflags! {
    /// Permission and special bits of a node (the `07777` part of a POSIX mode).
    ///
    /// The node kind is carried separately by [`FileType`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Mode: u32 {
        /// Set user id.
        const S_ISUID = 0o4000;
        /// Set group id.
        const S_ISGID = 0o2000;
        /// Sticky bit.
        const S_ISVTX = 0o1000;

        /// Owner read.
        const S_IRUSR = 0o400;
        /// Owner write.
        const S_IWUSR = 0o200;
        /// Owner execute.
        const S_IXUSR = 0o100;

        /// Group read.
        const S_IRGRP = 0o040;
        /// Group write.
        const S_IWGRP = 0o020;
        /// Group execute.
        const S_IXGRP = 0o010;

        /// Other read.
        const S_IROTH = 0o004;
        /// Other write.
        const S_IWOTH = 0o002;
        /// Other execute.
        const S_IXOTH = 0o001;
    }
}

impl Mode {
    /// Build from a raw mode, dropping the file type bits.
    #[inline]
    pub const fn from_mode(mode: u32) -> Self {
        Self::from_bits_truncate(mode)
    }

    /// `rwxrwxrwx`, used for symlinks.
    pub const ALL_RWX: Self = Self::from_bits_truncate(0o777);

    /// Default permissions of the root directory (`rwxr-xr-x`).
    #[inline]
    pub const fn default_dir() -> Self {
        Self::from_bits_truncate(0o755)
    }

    /// Default permissions for a new file (`rw-r--r--`).
    #[inline]
    pub const fn default_file() -> Self {
        Self::from_bits_truncate(0o644)
    }
}

/// Type of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Character device.
    CharDevice,
    /// Block device.
    BlockDevice,
    /// Named pipe.
    Fifo,
    /// Unix socket.
    Socket,
}

impl FileType {
    /// Returns `true` for device, fifo and socket nodes.
    #[inline]
    pub fn is_special(self) -> bool {
        matches!(
            self,
            FileType::CharDevice | FileType::BlockDevice | FileType::Fifo | FileType::Socket
        )
    }
}

/// Device number of a special node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceId {
    /// Major number.
    pub major: u32,
    /// Minor number.
    pub minor: u32,
}

impl DeviceId {
    /// Create from major and minor numbers.
    #[inline]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Encode as a Linux `dev_t`.
    pub const fn to_raw(self) -> u64 {
        let (major, minor) = (self.major as u64, self.minor as u64);
        ((major & 0xffff_f000) << 32)
            | ((major & 0x0000_0fff) << 8)
            | ((minor & 0xffff_ff00) << 12)
            | (minor & 0x0000_00ff)
    }
}

/// The acting user context for an operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Credentials {
    /// Filesystem user id.
    pub uid: u32,
    /// Filesystem group id.
    pub gid: u32,
}

impl Credentials {
    /// uid 0, gid 0.
    pub const ROOT: Self = Self { uid: 0, gid: 0 };

    /// Create from a user and group id.
    #[inline]
    pub const fn new(uid: u32, gid: u32) -> Self {
        Self { uid, gid }
    }
}

/// Snapshot of a node's attributes (like `stat`).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    /// Inode number.
    pub inode: u64,
    /// Type of the node.
    pub file_type: FileType,
    /// Permission bits.
    pub mode: Mode,
    /// Owning user.
    pub uid: u32,
    /// Owning group.
    pub gid: u32,
    /// Size in bytes (advisory for directories).
    pub size: u64,
    /// Number of hard links.
    pub nlink: u64,
    /// Last access time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub accessed: SystemTime,
    /// Last modification time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub modified: SystemTime,
    /// Last status change time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub changed: SystemTime,
    /// Device number for special nodes.
    pub rdev: Option<DeviceId>,
}

impl Metadata {
    /// Returns `true` if this is a regular file.
    #[inline]
    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }

    /// Returns `true` if this is a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }

    /// Returns `true` if this is a symbolic link.
    #[inline]
    pub fn is_symlink(&self) -> bool {
        self.file_type == FileType::Symlink
    }

    /// Device number as a Linux `dev_t` (`st_rdev`), 0 for non-special nodes.
    pub fn raw_rdev(&self) -> u64 {
        self.rdev.map_or(0, DeviceId::to_raw)
    }
}

/// A directory entry returned from `readdir`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirEntry {
    /// Stored name of the entry (current canonical casing).
    pub name: Vec<u8>,
    /// Inode number of the bound node.
    pub inode: u64,
    /// Type of the bound node.
    pub file_type: FileType,
}

/// Filesystem statistics (like `statfs`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatFs {
    /// Filesystem magic, always [`SAMPLEFS_MAGIC`].
    pub magic: u64,
    /// Block size in bytes.
    pub block_size: u64,
    /// Maximum filename length.
    pub max_name_len: u64,
    /// Node budget (0 = unlimited).
    pub total_inodes: u64,
    /// Live nodes.
    pub used_inodes: u64,
    /// Remaining node budget (0 when unlimited).
    pub free_inodes: u64,
}

/// Serde support for SystemTime (when serde feature is enabled).
#[cfg(feature = "serde")]
mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        (duration.as_secs(), duration.subsec_nanos()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (secs, nanos): (u64, u32) = Deserialize::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::new(secs, nanos))
    }
}
