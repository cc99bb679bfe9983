//! SQLite virtual table exposing the local file system as a queryable
//! relation.
//!
//! Registering the module makes the file system queryable as an ordinary
//! table, one row per directory entry:
//!
//! ```sql
//! CREATE VIRTUAL TABLE f USING filesystem;
//! SELECT inode, name, path, size FROM f
//!   WHERE path MATCH '/var/log, /usr/lib';
//! ```
//!
//! `MATCH` on the `path` column carries a comma-separated list of roots into
//! the scan; each root starts a depth-first sub-traversal, emitted in
//! pre-order. Without a `MATCH` the scan starts at `/`. Every other predicate
//! (`name = …`, `LIKE`, comparisons) is applied by SQLite to the emitted rows.
//!
//! The table is read-only; SQLite rejects writes against it.

#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

use rusqlite::{functions::FunctionFlags, Connection, Result};

mod vtab;

/// Register the `filesystem` module on a connection.
///
/// Also installs the `match` shim the `MATCH` operator resolves to:
/// `path MATCH 'a,b'` parses as `match('a,b', path)`, and the operand was
/// already consumed as the root list when the scan started, so rows that
/// reach the shim are in scope and it matches unconditionally.
pub fn register(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "match",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |_| Ok(1),
    )?;
    vtab::load(conn)
}
