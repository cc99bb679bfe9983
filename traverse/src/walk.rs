//! The traversal engine: advance one row at a time across the root list.

use std::{fs, io, path::PathBuf};

use log::{debug, warn};

use crate::{frame::Frame, Entry, Error, Options, Warning, WarningSink};

/// A resumable depth-first walk across one or more root paths.
///
/// The walk suspends between [`Walk::advance`] calls with its open directory
/// handles intact; handles are released when their directory is exhausted or
/// when the walk is dropped, whichever comes first. Dropping a walk mid-scan
/// releases everything it holds.
pub struct Walk {
    /// Root paths still to visit, in order.
    roots: Vec<String>,

    /// Index of the next root to enter.
    next_root: usize,

    /// Open directory frames, bottom of the current root to the innermost
    /// directory being read. Empty between roots and after end-of-set.
    stack: Vec<Frame>,

    /// Rows produced so far.
    count: u64,

    /// Set once no more rows will be produced.
    eof: bool,

    /// Sink for non-fatal warnings; `log::warn!` when absent.
    warnings: Option<WarningSink>,
}

impl std::fmt::Debug for Walk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walk")
            .field("roots", &self.roots)
            .field("next_root", &self.next_root)
            .field("stack", &self.stack)
            .field("count", &self.count)
            .field("eof", &self.eof)
            .field("warnings", &self.warnings.is_some())
            .finish()
    }
}

impl Walk {
    /// Begin a walk and prime the first row.
    ///
    /// On return either [`Walk::eof`] is set (empty root list) or
    /// [`Walk::current`] is the first row: the first root itself.
    pub fn start(options: Options) -> Result<Walk, Error> {
        let mut walk = Walk {
            roots: options.roots,
            next_root: 0,
            stack: Vec::new(),
            count: 0,
            eof: false,
            warnings: options.warnings,
        };
        debug!("starting walk over roots {:?}", walk.roots);
        walk.enter_next_root()?;
        if !walk.eof {
            walk.count = 1;
        }
        Ok(walk)
    }

    /// Whether the walk has produced its last row.
    pub fn eof(&self) -> bool {
        self.eof
    }

    /// Rows produced so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// The row currently visible, or `None` once the walk has ended.
    pub fn current(&self) -> Option<&Entry> {
        if self.eof {
            return None;
        }
        self.stack.last().map(|frame| &frame.entry)
    }

    /// Advance exactly one row.
    ///
    /// At most one directory record is read and at most one descent is
    /// attempted per call. On return either `eof` is set or [`Walk::current`]
    /// is the next row. Advancing past the end is a no-op.
    pub fn advance(&mut self) -> Result<(), Error> {
        if self.eof {
            return Ok(());
        }
        // A root that is a file has no children; the only move from its frame
        // is on to the next root.
        let step = if self.stack.last().map_or(true, |top| top.handle.is_none()) {
            self.enter_next_root()
        } else {
            self.read_entry()
        };
        step?;
        if !self.eof {
            self.count += 1;
        }
        Ok(())
    }

    /// Read forward in the innermost open directory until a row is produced,
    /// ascending out of exhausted directories and rolling over to the next
    /// root when the current one drains.
    fn read_entry(&mut self) -> Result<(), Error> {
        loop {
            let item = match self.stack.last_mut() {
                Some(top) => top.read(),
                None => return self.enter_next_root(),
            };
            match item {
                // Directory exhausted: ascend. Popping the frame releases its
                // handle. Popping the root frame rolls over to the next root.
                None => {
                    self.stack.pop();
                    if self.stack.is_empty() {
                        return self.enter_next_root();
                    }
                }
                // A failed read is treated the same as exhaustion.
                Some(Err(error)) => {
                    let path = self.stack.pop().map(|top| top.path).unwrap_or_default();
                    self.warn(path, error);
                    if self.stack.is_empty() {
                        return self.enter_next_root();
                    }
                }
                Some(Ok(record)) => {
                    if self.take(record) {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Turn one directory record into the next row. Returns false when the
    /// record had to be skipped and the caller should keep reading.
    fn take(&mut self, record: fs::DirEntry) -> bool {
        let path = record.path();
        let meta = match fs::symlink_metadata(&path) {
            Ok(meta) => meta,
            // The entry raced away between the read and the stat.
            Err(error) => {
                self.warn(path, error);
                return false;
            }
        };
        if meta.is_dir() {
            self.descend(path, meta)
        } else {
            let Some(top) = self.stack.last_mut() else {
                return false;
            };
            top.entry = Entry::child(&top.path, top.ino, &record.file_name(), &meta);
            true
        }
    }

    /// Descend into a directory record; the new frame's entry, describing the
    /// directory itself, is the next row. A directory that cannot be opened
    /// is still emitted as a row of the parent frame, with a warning; only
    /// its children go missing.
    fn descend(&mut self, path: PathBuf, meta: fs::Metadata) -> bool {
        let parent = self.stack.last().map_or(0, |top| top.ino);
        match fs::read_dir(&path) {
            Ok(handle) => {
                self.stack.push(Frame::opened(path, handle, &meta, parent));
                true
            }
            Err(error) => {
                let entry = Entry::directory(&path, &meta, parent);
                if let Some(top) = self.stack.last_mut() {
                    top.entry = entry;
                }
                self.warn(path, error);
                true
            }
        }
    }

    /// Move the walk to the next root, releasing anything still on the
    /// stack. Exhaustion of the root list is the normal end of the set; a
    /// root that cannot be examined or opened ends the set with an error.
    fn enter_next_root(&mut self) -> Result<(), Error> {
        self.stack.clear();
        let Some(root) = self.roots.get(self.next_root).cloned() else {
            debug!("roots exhausted after {} rows", self.count);
            self.eof = true;
            return Ok(());
        };
        self.next_root += 1;
        debug!("entering root {root:?}");

        let path = PathBuf::from(&root);
        let meta = match fs::symlink_metadata(&path) {
            Ok(meta) => meta,
            Err(source) => {
                self.eof = true;
                return Err(Error::InvalidRoot { path: root, source });
            }
        };
        let frame = if meta.is_dir() {
            match fs::read_dir(&path) {
                Ok(handle) => Frame::opened(path, handle, &meta, 0),
                Err(source) => {
                    self.eof = true;
                    return Err(Error::OpenRoot { path: root, source });
                }
            }
        } else {
            // A root that is a file (or a symlink; links are never followed)
            // is itself the next row.
            Frame::leaf(path, &meta)
        };
        self.stack.push(frame);
        Ok(())
    }

    fn warn(&mut self, path: PathBuf, error: io::Error) {
        let warning = Warning::new(path, error);
        match self.warnings.as_mut() {
            Some(sink) => sink(warning),
            None => warn!("{warning}"),
        }
    }
}
