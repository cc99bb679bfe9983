//! Helpers: a registered connection and a small fixture tree.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rusqlite::Connection;
use tempfile::TempDir;

/// Build the reference tree: `t/a` (3 bytes) and `t/b/c` (5 bytes).
///
/// Returns the temp dir (keep it alive) and the path of `t`.
pub fn tree() -> (TempDir, PathBuf) {
    let _ = pretty_env_logger::try_init();
    let temp = TempDir::new().expect("create temp dir");
    let t = temp.path().join("t");
    fs::create_dir(&t).expect("create t");
    fs::write(t.join("a"), b"abc").expect("write a");
    fs::create_dir(t.join("b")).expect("create b");
    fs::write(t.join("b").join("c"), b"12345").expect("write c");
    (temp, t)
}

/// An in-memory database with the module registered and the table created.
pub fn connection() -> Connection {
    let conn = Connection::open_in_memory().expect("open database");
    fstable::register(&conn).expect("register module");
    conn.execute_batch("CREATE VIRTUAL TABLE f USING filesystem")
        .expect("create table");
    conn
}

/// Render a path the way roots are supplied: as text.
pub fn root(path: &Path) -> String {
    path.to_str().expect("fixture paths are utf-8").to_owned()
}
