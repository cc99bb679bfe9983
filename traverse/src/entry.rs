//! Entry metadata records produced by the walk.

use std::{
    ffi::OsStr,
    fmt::Display,
    fs::Metadata,
    os::unix::fs::{FileTypeExt, MetadataExt},
    path::Path,
};

use getset::{CopyGetters, Getters};

/// Classification of a file-system entry.
///
/// The numeric codes are stable public API and appear verbatim in the `type`
/// column.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum FileType {
    /// No entry; the zero-filled state.
    #[default]
    None,
    /// Regular file.
    Regular,
    /// Directory.
    Directory,
    /// Character device.
    Character,
    /// Block device.
    Block,
    /// Named pipe.
    Pipe,
    /// Symbolic link. Links are never followed by the walk.
    Link,
    /// Socket.
    Socket,
    /// Anything the platform reports that does not fit the above.
    Unknown,
}

impl FileType {
    /// The numeric code projected into the `type` column.
    pub fn code(self) -> i32 {
        match self {
            FileType::None => 0,
            FileType::Regular => 1,
            FileType::Directory => 2,
            FileType::Character => 3,
            FileType::Block => 4,
            FileType::Pipe => 5,
            FileType::Link => 6,
            FileType::Socket => 7,
            FileType::Unknown => 127,
        }
    }

    pub(crate) fn of(kind: std::fs::FileType) -> Self {
        if kind.is_symlink() {
            FileType::Link
        } else if kind.is_dir() {
            FileType::Directory
        } else if kind.is_file() {
            FileType::Regular
        } else if kind.is_char_device() {
            FileType::Character
        } else if kind.is_block_device() {
            FileType::Block
        } else if kind.is_fifo() {
            FileType::Pipe
        } else if kind.is_socket() {
            FileType::Socket
        } else {
            FileType::Unknown
        }
    }
}

impl Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FileType::None => "none",
            FileType::Regular => "regfile",
            FileType::Directory => "dir",
            FileType::Character => "character device",
            FileType::Block => "block device",
            FileType::Pipe => "pipe",
            FileType::Link => "link",
            FileType::Socket => "socket",
            FileType::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

/// One file-system entry, as projected into a row.
///
/// Zero-filled by default; the walk overwrites the whole record each time it
/// produces a row.
#[derive(Clone, Debug, Default, Getters, CopyGetters)]
pub struct Entry {
    /// The entry's short name.
    ///
    /// Falls back to the full path when no final component exists (the root
    /// `/`); empty when neither is available.
    #[getset(get = "pub")]
    name: String,

    /// The containing directory for files; the directory's own path for
    /// directory entries.
    #[getset(get = "pub")]
    path: String,

    /// Entry classification.
    #[getset(get_copy = "pub")]
    kind: FileType,

    /// Size in bytes.
    #[getset(get_copy = "pub")]
    size: i64,

    /// Owning user id.
    #[getset(get_copy = "pub")]
    uid: u32,

    /// Owning group id.
    #[getset(get_copy = "pub")]
    gid: u32,

    /// Permission bits.
    #[getset(get_copy = "pub")]
    prot: u32,

    /// Modification time, seconds.
    #[getset(get_copy = "pub")]
    mtime: i64,

    /// Change time, seconds.
    #[getset(get_copy = "pub")]
    ctime: i64,

    /// Access time, seconds.
    #[getset(get_copy = "pub")]
    atime: i64,

    /// Device id.
    #[getset(get_copy = "pub")]
    dev: i64,

    /// Hard-link count.
    #[getset(get_copy = "pub")]
    nlink: i64,

    /// Inode number. Not unique across a walk (hard links, multiple roots).
    #[getset(get_copy = "pub")]
    ino: i64,

    /// Inode of the containing directory, or 0 when the entry is a root.
    #[getset(get_copy = "pub")]
    dir: i64,
}

impl Entry {
    /// An entry for a directory itself: `path` is the directory's own path.
    pub(crate) fn directory(path: &Path, meta: &Metadata, dir: i64) -> Self {
        Self {
            name: name_or_path(path),
            path: path.to_string_lossy().into_owned(),
            dir,
            ..Self::from_meta(meta)
        }
    }

    /// An entry for a root that is not a directory: `path` is the portion up
    /// to, but not including, the final name component.
    pub(crate) fn leaf(path: &Path, meta: &Metadata) -> Self {
        let parent = path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name: name_or_path(path),
            path: parent,
            dir: 0,
            ..Self::from_meta(meta)
        }
    }

    /// An entry read from within an open directory.
    pub(crate) fn child(dir_path: &Path, dir: i64, name: &OsStr, meta: &Metadata) -> Self {
        Self {
            name: name.to_string_lossy().into_owned(),
            path: dir_path.to_string_lossy().into_owned(),
            dir,
            ..Self::from_meta(meta)
        }
    }

    fn from_meta(meta: &Metadata) -> Self {
        Self {
            kind: FileType::of(meta.file_type()),
            size: meta.size() as i64,
            uid: meta.uid(),
            gid: meta.gid(),
            prot: meta.mode() & 0o7777,
            mtime: meta.mtime(),
            ctime: meta.ctime(),
            atime: meta.atime(),
            dev: meta.dev() as i64,
            nlink: meta.nlink() as i64,
            ino: meta.ino() as i64,
            ..Self::default()
        }
    }
}

fn name_or_path(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.to_string_lossy().into_owned(),
    }
}
