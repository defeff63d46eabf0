#[path = "testutils/mod.rs"]
mod testutils;

use testutils::TestFixture;

use filedex::{Connection, FileRecord, Index};
use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, UNIX_EPOCH};

fn mtime_ns(path: &Path) -> u64 {
    fs::symlink_metadata(path)
        .expect("stat")
        .modified()
        .expect("modified")
        .duration_since(UNIX_EPOCH)
        .expect("after epoch")
        .as_nanos() as u64
}

#[test]
fn first_crawl_indexes_files_and_directories() {
    let mut fixture = TestFixture::with_tree();
    fixture.crawl();

    // The root itself, a.txt, b.txt, sub, and sub/c.txt.
    assert_eq!(fixture.catalog().len(), 5);

    let (_, mtime) = fixture
        .catalog()
        .ridtime(&fixture.rooted("b.txt"))
        .expect("b.txt indexed");
    assert_eq!(mtime, mtime_ns(&fixture.root().join("b.txt")));
}

#[test]
fn touching_a_file_reindexes_under_the_same_rid() {
    let mut fixture = TestFixture::with_tree();
    fixture.crawl();
    let (rid, before) = fixture
        .catalog()
        .ridtime(&fixture.rooted("a.txt"))
        .expect("a.txt indexed");

    fixture.write("a.txt", "alpha, touched");
    fixture.crawl();

    let (rid_after, after) = fixture
        .catalog()
        .ridtime(&fixture.rooted("a.txt"))
        .expect("a.txt still indexed");
    assert_eq!(rid, rid_after);
    assert_ne!(before, after);
    assert_eq!(fixture.catalog().len(), 5);
}

#[test]
fn removing_a_file_unindexes_it() {
    let mut fixture = TestFixture::with_tree();
    fixture.crawl();
    let (rid, _) = fixture
        .catalog()
        .ridtime(&fixture.rooted("b.txt"))
        .expect("b.txt indexed");
    let name = fixture.catalog().index("name").expect("name index");
    assert!(name.search("is", "b.txt").expect("search").contains(&rid));

    fixture.remove("b.txt");
    fixture.crawl();

    let catalog = fixture.catalog();
    assert!(catalog.ridtime(&fixture.rooted("b.txt")).is_none());
    assert!(!catalog.rids().contains(&rid));
    let name = catalog.index("name").expect("name index");
    assert!(name.search("is", "b.txt").expect("search").is_empty());
    let path = catalog.index("path").expect("path index");
    assert!(path
        .search("is", &fixture.rooted("b.txt"))
        .expect("search")
        .is_empty());
}

#[test]
fn an_unchanged_tree_crawls_to_the_same_state() {
    let mut fixture = TestFixture::with_tree();
    fixture.crawl();
    let before: Vec<_> = fixture
        .catalog()
        .paths()
        .map(|p| (p.to_string(), fixture.catalog().ridtime(p)))
        .collect();

    fixture.crawl();

    let after: Vec<_> = fixture
        .catalog()
        .paths()
        .map(|p| (p.to_string(), fixture.catalog().ridtime(p)))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn hidden_components_are_skipped() {
    let mut fixture = TestFixture::empty();
    fixture.write(".secret", "contents");
    fs::create_dir(fixture.root().join("_work")).expect("create _work");
    fixture.write("_work/inside.txt", "contents");
    fixture.write("plain.txt", "contents");

    fixture.crawl();

    // Only the root and plain.txt are visible.
    assert_eq!(fixture.catalog().len(), 2);
    assert!(fixture.catalog().ridtime(&fixture.rooted(".secret")).is_none());
    assert!(fixture
        .catalog()
        .ridtime(&fixture.rooted("_work/inside.txt"))
        .is_none());
    assert!(fixture.catalog().ridtime(&fixture.rooted("plain.txt")).is_some());
}

#[test]
fn a_large_tree_survives_checkpoint_commits() {
    let mut fixture = TestFixture::empty();
    for i in 0..45 {
        fs::write(
            fixture.root().join(format!("file{:02}.txt", i)),
            "contents",
        )
        .expect("write file");
    }
    fixture.crawl();
    assert_eq!(fixture.catalog().len(), 46);
}

#[test]
fn rids_are_unique_and_never_reused() {
    let mut fixture = TestFixture::with_tree();
    fixture.crawl();
    let (removed_rid, _) = fixture
        .catalog()
        .ridtime(&fixture.rooted("b.txt"))
        .expect("b.txt indexed");

    fixture.remove("b.txt");
    fixture.crawl();
    fixture.write("d.txt", "delta");
    fixture.write("e.txt", "echo");
    fixture.crawl();

    let catalog = fixture.catalog();
    assert!(!catalog.rids().contains(&removed_rid));
    assert_eq!(catalog.rids().len(), 6);
    for rid in catalog.rids() {
        assert!(catalog.resource(*rid).is_some());
    }
}

#[test]
fn connections_observe_committed_snapshots() {
    let mut fixture = TestFixture::with_tree();
    fixture.crawl();

    let mut reader: Connection<FileRecord> = fixture.db.connect().expect("connect reader");
    assert_eq!(reader.catalog().len(), 5);

    fixture.write("d.txt", "delta");
    fixture.crawl();

    // The reader still sees its snapshot until it refreshes.
    assert_eq!(reader.catalog().len(), 5);
    reader.refresh().expect("refresh");
    assert_eq!(reader.catalog().len(), 6);
}

#[test]
fn the_background_crawler_keeps_the_catalog_in_sync() {
    let mut fixture = TestFixture::with_tree();
    let crawler_conn: Connection<FileRecord> = fixture.db.connect().expect("connect crawler");
    let handle = filedex::start_crawling(crawler_conn).expect("start crawler");

    // Give the crawler a few passes, then ask it to wind down.
    thread::sleep(Duration::from_millis(600));
    handle.stop();

    fixture.conn.refresh().expect("refresh");
    assert_eq!(fixture.catalog().len(), 5);
}

#[test]
fn reset_empties_the_catalog_and_every_index() {
    let mut fixture = TestFixture::with_tree();
    fixture.crawl();
    assert_eq!(fixture.catalog().len(), 5);

    fixture.conn.catalog_mut().reset();
    fixture.conn.commit().expect("commit");

    let catalog = fixture.catalog();
    assert_eq!(catalog.len(), 0);
    assert_eq!(catalog.paths().count(), 0);
    let name = catalog.index("name").expect("name index");
    assert!(name.search("contains", "txt").expect("search").is_empty());
}

#[test]
fn abort_discards_uncommitted_mutations() {
    let mut fixture = TestFixture::with_tree();
    fixture.crawl();

    fixture.conn.catalog_mut().reset();
    fixture.conn.abort().expect("abort");
    assert_eq!(fixture.catalog().len(), 5);
}
