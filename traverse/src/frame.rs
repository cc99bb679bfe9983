//! Directory frames: one record per open directory on the walk stack.

use std::{fs, io, os::unix::fs::MetadataExt, path::PathBuf};

use crate::Entry;

/// One open directory on the walk stack, or a root that turned out not to be
/// a directory.
///
/// The frame owns its directory handle; dropping the frame releases it. The
/// parent link of each frame is implicit in stack order: frame paths are
/// strictly nested from the bottom of the stack to the top.
#[derive(Debug)]
pub(crate) struct Frame {
    /// Path of the directory, owned by the frame.
    pub(crate) path: PathBuf,

    /// Directory iteration handle. `None` marks a root that is not a
    /// directory and therefore has nothing to iterate.
    pub(crate) handle: Option<fs::ReadDir>,

    /// Inode of the directory the frame represents.
    pub(crate) ino: i64,

    /// The current row at or within this frame.
    pub(crate) entry: Entry,
}

impl Frame {
    /// Build a frame around an opened directory handle. The frame's entry
    /// describes the directory itself, which is the next row to emit.
    pub(crate) fn opened(path: PathBuf, handle: fs::ReadDir, meta: &fs::Metadata, dir: i64) -> Frame {
        Frame {
            ino: meta.ino() as i64,
            handle: Some(handle),
            entry: Entry::directory(&path, meta, dir),
            path,
        }
    }

    /// Build a frame for a root that is not a directory. It has no children;
    /// its entry is the only row it produces.
    pub(crate) fn leaf(path: PathBuf, meta: &fs::Metadata) -> Frame {
        Frame {
            ino: meta.ino() as i64,
            handle: None,
            entry: Entry::leaf(&path, meta),
            path,
        }
    }

    /// Read the next record from the directory handle.
    ///
    /// `None` means the directory is exhausted, which is a normal outcome,
    /// not an error. The platform iterator never yields `.` or `..`.
    pub(crate) fn read(&mut self) -> Option<io::Result<fs::DirEntry>> {
        self.handle.as_mut().and_then(Iterator::next)
    }
}
