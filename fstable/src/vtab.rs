//! The virtual table module: planner callbacks driving a [`traverse::Walk`].

use std::{marker::PhantomData, os::raw::c_int};

use log::debug;
use rusqlite::{
    ffi,
    vtab::{
        read_only_module, Context, CreateVTab, IndexConstraintOp, IndexInfo, VTab, VTabConnection,
        VTabCursor, VTabKind, Values,
    },
    Connection, Error, Result,
};
use traverse::{paths, Entry, Options, Walk};

/// Column ordinals, as declared in [`DDL`].
const COL_NAME: c_int = 0;
const COL_PATH: c_int = 1;
const COL_TYPE: c_int = 2;
const COL_SIZE: c_int = 3;
const COL_UID: c_int = 4;
const COL_GID: c_int = 5;
const COL_PROT: c_int = 6;
const COL_MTIME: c_int = 7;
const COL_CTIME: c_int = 8;
const COL_ATIME: c_int = 9;
const COL_DEV: c_int = 10;
const COL_NLINK: c_int = 11;
const COL_INODE: c_int = 12;
const COL_DIR: c_int = 13;

/// The table structure declared to SQLite.
const DDL: &str = "CREATE TABLE fs (
  name  TEXT,
  path  TEXT,
  type  INTEGER,
  size  INTEGER,
  uid   INTEGER,
  gid   INTEGER,
  prot  INTEGER,
  mtime INTEGER,
  ctime INTEGER,
  atime INTEGER,
  dev   INTEGER,
  nlink INTEGER,
  inode INTEGER,
  dir   INTEGER
)";

/// Register the module under the name `filesystem`.
pub(crate) fn load(conn: &Connection) -> Result<()> {
    let aux: Option<()> = None;
    conn.create_module("filesystem", read_only_module::<FsTab>(), aux)
}

/// The virtual table. Carries no state of its own; every scan lives in its
/// cursor.
#[repr(C)]
pub(crate) struct FsTab {
    /// Base class. Must be first.
    base: ffi::sqlite3_vtab,
}

unsafe impl<'vtab> VTab<'vtab> for FsTab {
    type Aux = ();
    type Cursor = FsCursor<'vtab>;

    fn connect(
        _db: &mut VTabConnection,
        _aux: Option<&()>,
        _args: &[&[u8]],
    ) -> Result<(String, FsTab)> {
        let vtab = FsTab {
            base: ffi::sqlite3_vtab::default(),
        };
        Ok((DDL.to_owned(), vtab))
    }

    /// Claim the first usable `path MATCH …` or `path = …` constraint; its
    /// value becomes the root list handed to `filter`. No cost estimate and
    /// no ordering claim: the scan is a full walk modulated by that one
    /// constant. Constraints on other columns, `name` included, are left for
    /// SQLite to apply to each emitted row.
    fn best_index(&self, info: &mut IndexInfo) -> Result<()> {
        let claimed = info.constraints().enumerate().find_map(|(i, constraint)| {
            if !constraint.is_usable() || constraint.column() != COL_PATH {
                return None;
            }
            match constraint.operator() {
                IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_EQ
                | IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_MATCH => Some(i),
                _ => None,
            }
        });
        if let Some(i) = claimed {
            info.constraint_usage(i).set_argv_index(1);
        }
        Ok(())
    }

    fn open(&'vtab mut self) -> Result<FsCursor<'vtab>> {
        Ok(FsCursor::new())
    }
}

impl CreateVTab<'_> for FsTab {
    const KIND: VTabKind = VTabKind::Default;
}

/// A cursor over one scan of the file system.
#[repr(C)]
pub(crate) struct FsCursor<'vtab> {
    /// Base class. Must be first.
    base: ffi::sqlite3_vtab_cursor,
    /// The active scan. `None` before `filter` runs and after a scan fails
    /// to start, so closing an unfiltered cursor releases nothing.
    walk: Option<Walk>,
    phantom: PhantomData<&'vtab FsTab>,
}

impl FsCursor<'_> {
    fn new() -> Self {
        FsCursor {
            base: ffi::sqlite3_vtab_cursor::default(),
            walk: None,
            phantom: PhantomData,
        }
    }

    fn current(&self) -> Option<&Entry> {
        self.walk.as_ref().and_then(Walk::current)
    }
}

unsafe impl VTabCursor for FsCursor<'_> {
    fn filter(
        &mut self,
        _idx_num: c_int,
        _idx_str: Option<&str>,
        args: &Values<'_>,
    ) -> Result<()> {
        // Any previous scan on this cursor ends here, releasing its frames.
        self.walk = None;

        let roots = if args.is_empty() {
            vec!["/".to_owned()]
        } else {
            let list: String = args.get(0)?;
            paths::split_roots(&list)
        };
        debug!("filesystem scan over roots {roots:?}");

        let options = Options::builder().roots(roots).build();
        match Walk::start(options) {
            Ok(walk) => {
                self.walk = Some(walk);
                Ok(())
            }
            Err(error) => Err(Error::ModuleError(error.to_string())),
        }
    }

    fn next(&mut self) -> Result<()> {
        match self.walk.as_mut() {
            Some(walk) => walk
                .advance()
                .map_err(|error| Error::ModuleError(error.to_string())),
            None => Ok(()),
        }
    }

    fn eof(&self) -> bool {
        self.walk.as_ref().map_or(true, Walk::eof)
    }

    fn column(&self, ctx: &mut Context, col: c_int) -> Result<()> {
        match self.current() {
            Some(entry) => project(ctx, entry, col),
            // No current row: a benign empty value rather than a crash.
            None => ctx.set_result(&""),
        }
    }

    fn rowid(&self) -> Result<i64> {
        Ok(self.current().map_or(0, Entry::ino))
    }
}

/// Map a column ordinal to the matching attribute of the current entry.
/// Unknown ordinals yield the empty string.
fn project(ctx: &mut Context, entry: &Entry, col: c_int) -> Result<()> {
    match col {
        COL_NAME => ctx.set_result(entry.name()),
        COL_PATH => ctx.set_result(entry.path()),
        COL_TYPE => ctx.set_result(&entry.kind().code()),
        COL_SIZE => ctx.set_result(&entry.size()),
        COL_UID => ctx.set_result(&entry.uid()),
        COL_GID => ctx.set_result(&entry.gid()),
        COL_PROT => ctx.set_result(&entry.prot()),
        COL_MTIME => ctx.set_result(&entry.mtime()),
        COL_CTIME => ctx.set_result(&entry.ctime()),
        COL_ATIME => ctx.set_result(&entry.atime()),
        COL_DEV => ctx.set_result(&entry.dev()),
        COL_NLINK => ctx.set_result(&entry.nlink()),
        COL_INODE => ctx.set_result(&entry.ino()),
        COL_DIR => ctx.set_result(&entry.dir()),
        _ => ctx.set_result(&""),
    }
}
