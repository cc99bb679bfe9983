//! SQL-level behavior of the `filesystem` table.

use std::{collections::HashSet, fs, os::unix::fs::MetadataExt};

use crate::fixture;

/// Collect `(name, size, type)` for every row of a `path MATCH` scan.
fn scan(conn: &rusqlite::Connection, roots: &str) -> Vec<(String, i64, i32)> {
    let mut stmt = conn
        .prepare("SELECT name, size, type FROM f WHERE path MATCH ?1")
        .expect("prepare scan");
    stmt.query_map([roots], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .expect("run scan")
        .collect::<Result<Vec<_>, _>>()
        .expect("collect rows")
}

#[test]
fn scan_is_preorder_and_includes_the_root() {
    let (_temp, t) = fixture::tree();
    let conn = fixture::connection();

    let rows = scan(&conn, &fixture::root(&t));
    assert_eq!(rows[0].0, "t");
    assert_eq!(rows[0].2, 2, "the root row is a directory");
    assert_eq!(
        rows.iter().map(|r| r.0.as_str()).collect::<HashSet<_>>(),
        HashSet::from(["t", "a", "b", "c"]),
    );

    let position = |name: &str| rows.iter().position(|r| r.0 == name).expect("row present");
    assert!(position("b") < position("c"), "a directory precedes its contents");

    let size = |name: &str| rows[position(name)].1;
    assert_eq!(size("a"), 3);
    assert_eq!(size("c"), 5);
}

#[test]
fn match_takes_multiple_roots_in_list_order() {
    let (_temp, t) = fixture::tree();
    let conn = fixture::connection();

    let list = format!("{}, {}", fixture::root(&t.join("a")), fixture::root(&t.join("b")));
    let rows = scan(&conn, &list);
    assert_eq!(
        rows.iter().map(|r| r.0.as_str()).collect::<Vec<_>>(),
        vec!["a", "b", "c"],
    );
}

#[test]
fn empty_directory_yields_exactly_its_own_row() {
    let (_temp, t) = fixture::tree();
    let empty = t.join("e");
    fs::create_dir(&empty).expect("create e");
    let conn = fixture::connection();

    let rows = scan(&conn, &fixture::root(&empty));
    assert_eq!(rows, vec![("e".to_owned(), rows[0].1, 2)]);
}

#[test]
fn symlink_root_yields_one_link_row_without_descent() {
    let (_temp, t) = fixture::tree();
    let link = t.parent().expect("temp parent").join("s");
    std::os::unix::fs::symlink(&t, &link).expect("create symlink");
    let conn = fixture::connection();

    let rows = scan(&conn, &fixture::root(&link));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, "s");
    assert_eq!(rows[0].2, 6, "links are not directories");
}

#[test]
fn name_equality_is_applied_to_emitted_rows() {
    let (_temp, t) = fixture::tree();
    let conn = fixture::connection();

    let mut stmt = conn
        .prepare("SELECT name, size FROM f WHERE path MATCH ?1 AND name = 'c'")
        .expect("prepare query");
    let rows = stmt
        .query_map([fixture::root(&t)], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })
        .expect("run query")
        .collect::<Result<Vec<_>, _>>()
        .expect("collect rows");

    assert_eq!(rows, vec![("c".to_owned(), 5)]);
}

#[test]
fn match_on_other_columns_matches_everything() {
    let (_temp, t) = fixture::tree();
    let conn = fixture::connection();

    let mut stmt = conn
        .prepare("SELECT name FROM f WHERE path MATCH ?1 AND name MATCH 'ignored'")
        .expect("prepare query");
    let rows = stmt
        .query_map([fixture::root(&t)], |row| row.get::<_, String>(0))
        .expect("run query")
        .collect::<Result<Vec<_>, _>>()
        .expect("collect rows");

    assert_eq!(rows.len(), 4, "the shim matches unconditionally");
}

#[test]
fn rowid_is_the_inode() {
    let (_temp, t) = fixture::tree();
    let conn = fixture::connection();

    let mut stmt = conn
        .prepare("SELECT rowid, inode, name FROM f WHERE path MATCH ?1")
        .expect("prepare query");
    let rows = stmt
        .query_map([fixture::root(&t)], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?, row.get::<_, String>(2)?))
        })
        .expect("run query")
        .collect::<Result<Vec<_>, _>>()
        .expect("collect rows");

    for (rowid, inode, _) in &rows {
        assert_eq!(rowid, inode);
    }
    let a = rows.iter().find(|r| r.2 == "a").expect("a row");
    let meta = fs::symlink_metadata(t.join("a")).expect("stat a");
    assert_eq!(a.1, meta.ino() as i64);
}

#[test]
fn ownership_and_times_come_from_stat() {
    let (_temp, t) = fixture::tree();
    let conn = fixture::connection();
    let meta = fs::symlink_metadata(t.join("a")).expect("stat a");

    let mut stmt = conn
        .prepare("SELECT uid, gid, prot, mtime, dir FROM f WHERE path MATCH ?1 AND name = 'a'")
        .expect("prepare query");
    let (uid, gid, prot, mtime, dir) = stmt
        .query_row([fixture::root(&t)], |row| {
            Ok((
                row.get::<_, u32>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })
        .expect("query a row");

    assert_eq!(uid, meta.uid());
    assert_eq!(gid, meta.gid());
    assert_eq!(prot, meta.mode() & 0o7777);
    assert_eq!(mtime, meta.mtime());
    let t_meta = fs::symlink_metadata(&t).expect("stat t");
    assert_eq!(dir, t_meta.ino() as i64, "dir is the containing directory");
}

#[test]
fn invalid_root_reports_an_error_and_no_rows() {
    let conn = fixture::connection();

    let mut stmt = conn
        .prepare("SELECT name FROM f WHERE path MATCH '/this/does/not/exist'")
        .expect("prepare query");
    let error = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .expect("run query")
        .collect::<Result<Vec<_>, _>>()
        .expect_err("scan must fail");

    assert!(
        error.to_string().contains("/this/does/not/exist"),
        "error names the root: {error}",
    );
}

#[test]
fn missing_match_defaults_to_the_file_system_root() {
    let conn = fixture::connection();

    let name = conn
        .query_row("SELECT name FROM f LIMIT 1", [], |row| {
            row.get::<_, String>(0)
        })
        .expect("query first row");
    assert_eq!(name, "/", "the first row is the root itself");
}

#[test]
fn writes_are_rejected() {
    let conn = fixture::connection();

    let result = conn.execute("INSERT INTO f (name) VALUES ('x')", []);
    assert!(result.is_err(), "the table is read-only");
}

#[test]
fn a_connection_hosts_independent_cursors() {
    let (_temp, t) = fixture::tree();
    let conn = fixture::connection();

    let mut one = conn
        .prepare("SELECT name FROM f WHERE path MATCH ?1")
        .expect("prepare first");
    let mut two = conn
        .prepare("SELECT name FROM f WHERE path MATCH ?1")
        .expect("prepare second");

    let mut rows_one = one.query([fixture::root(&t)]).expect("run first");
    let mut rows_two = two.query([fixture::root(&t)]).expect("run second");

    // Interleave the two scans; each keeps its own stack.
    let mut seen_one = Vec::new();
    let mut seen_two = Vec::new();
    for _ in 0..4 {
        let row = rows_one.next().expect("step first").expect("first has a row");
        seen_one.push(row.get::<_, String>(0).expect("name"));
        let row = rows_two.next().expect("step second").expect("second has a row");
        seen_two.push(row.get::<_, String>(0).expect("name"));
    }
    assert!(rows_one.next().expect("step first").is_none());
    assert!(rows_two.next().expect("step second").is_none());

    assert_eq!(seen_one, seen_two);
}

#[test]
fn finalize_before_eof_is_clean() {
    let (_temp, t) = fixture::tree();
    let conn = fixture::connection();

    {
        let mut stmt = conn
            .prepare("SELECT name FROM f WHERE path MATCH ?1")
            .expect("prepare query");
        let mut rows = stmt.query([fixture::root(&t)]).expect("run query");
        let first = rows.next().expect("step").expect("first row");
        assert_eq!(first.get::<_, String>(0).expect("name"), "t");
        // Dropped here, mid-scan.
    }

    // The connection is still fully usable afterwards.
    let rows = scan(&conn, &fixture::root(&t));
    assert_eq!(rows.len(), 4);
}

#[cfg(target_os = "linux")]
#[test]
fn finalize_before_eof_releases_directory_handles() {
    fn open_fds() -> usize {
        fs::read_dir("/proc/self/fd").expect("read fd table").count()
    }

    let (_temp, t) = fixture::tree();
    let conn = fixture::connection();

    let before = open_fds();
    {
        let mut stmt = conn
            .prepare("SELECT name FROM f WHERE path MATCH ?1")
            .expect("prepare query");
        let mut rows = stmt.query([fixture::root(&t)]).expect("run query");
        rows.next().expect("step").expect("first row");
        assert!(open_fds() > before, "the scan holds at least one handle");
        // Dropped here, mid-scan.
    }
    assert_eq!(open_fds(), before);
}
