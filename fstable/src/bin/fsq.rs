//! Minimal harness: open an in-memory database, register the `filesystem`
//! module, query the given roots, print rows.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

use clap::Parser;
use log::{debug, Level};
use rusqlite::Connection;
use stable_eyre::{eyre::Context, Result};
use stderrlog::ColorChoice;

/// Query the file system through SQL.
#[derive(Parser, Debug)]
#[clap(version, about)]
struct Cmd {
    /// Root paths to walk, in order.
    #[clap(required = true)]
    roots: Vec<String>,

    /// Enable debug logging.
    #[clap(long)]
    debug: bool,
}

fn main() -> Result<()> {
    stable_eyre::install()?;

    let cmd = Cmd::parse();
    init_logging(&cmd)?;

    let conn = Connection::open_in_memory().context("open database")?;
    fstable::register(&conn).context("register module")?;
    conn.execute_batch("CREATE VIRTUAL TABLE f USING filesystem")
        .context("create table")?;

    let list = cmd.roots.join(",");
    debug!("querying roots {list:?}");

    let mut stmt = conn
        .prepare("SELECT inode, name, path, size, prot, uid, gid FROM f WHERE path MATCH ?1")
        .context("prepare query")?;
    let mut rows = stmt.query([&list]).context("run query")?;
    while let Some(row) = rows.next().context("read row")? {
        let inode: i64 = row.get(0)?;
        let name: String = row.get(1)?;
        let path: String = row.get(2)?;
        let size: i64 = row.get(3)?;
        let prot: u32 = row.get(4)?;
        let uid: u32 = row.get(5)?;
        let gid: u32 = row.get(6)?;
        println!("{inode:>10} {name:<32} {path:<48} {size:>10} {prot:>4o} {uid:>5} {gid:>5}");
    }

    Ok(())
}

/// Configures the global logger for the application based on self.
fn init_logging(cmd: &Cmd) -> Result<()> {
    stderrlog::new()
        .modules(["fsq", "fstable", "traverse"])
        .color(ColorChoice::Never)
        .verbosity(if cmd.debug { Level::Debug } else { Level::Info })
        .init()?;
    Ok(())
}
