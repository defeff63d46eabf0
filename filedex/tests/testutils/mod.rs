//! Test fixture for filedex integration tests
//!
//! Provides an isolated catalog database over a seeded tempdir tree,
//! exercised only through the public API.

use filedex::{
    Address, Catalog, Connection, Database, EnumerationIndex, FileRecord, PathIndex, StringIndex,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Isolated database instance with the stock name/kind/path indices.
pub struct TestFixture {
    pub db: Database,
    pub conn: Connection<FileRecord>,
    root: PathBuf,
    address: Address,
    _temp_dir: tempfile::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Fixture over an empty tree root.
    pub fn empty() -> TestFixture {
        let _ = env_logger::builder().is_test(true).try_init();

        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let root = temp_dir.path().join("tree");
        fs::create_dir(&root).expect("create tree root");

        let catalog: Catalog<FileRecord> = Catalog::new(&root)
            .expect("create catalog")
            .with_index("name", StringIndex::new(false))
            .with_index(
                "kind",
                EnumerationIndex::new(["file", "dir"], None).expect("enumeration index"),
            )
            .with_index("path", PathIndex::new(None));

        let address = Address::File(temp_dir.path().join("db"));
        let db = Database::open(&address, Some(move || catalog)).expect("open database");
        let conn = db.connect().expect("connect");
        TestFixture {
            db,
            conn,
            root,
            address,
            _temp_dir: temp_dir,
        }
    }

    /// Fixture over a tree with three files: a.txt, b.txt and sub/c.txt.
    pub fn with_tree() -> TestFixture {
        let fixture = TestFixture::empty();
        fixture.write("a.txt", "alpha");
        fixture.write("b.txt", "bravo");
        fs::create_dir(fixture.root.join("sub")).expect("create sub");
        fixture.write("sub/c.txt", "charlie");
        fixture
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Absolute path of a tree entry, as catalog keys store it.
    pub fn rooted(&self, rel: &str) -> String {
        let root = self.root.canonicalize().expect("canonicalize root");
        let path = if rel.is_empty() { root } else { root.join(rel) };
        path.to_string_lossy().into_owned()
    }

    /// Write a file under the tree. Pauses briefly first so a rewrite
    /// moves the modtime even on coarse filesystem clocks.
    pub fn write(&self, rel: &str, contents: &str) {
        thread::sleep(Duration::from_millis(25));
        fs::write(self.root.join(rel), contents).expect("write file");
    }

    pub fn remove(&self, rel: &str) {
        fs::remove_file(self.root.join(rel)).expect("remove file");
    }

    pub fn crawl(&mut self) {
        filedex::crawl_once(&mut self.conn).expect("crawl");
    }

    pub fn catalog(&self) -> &Catalog<FileRecord> {
        self.conn.catalog()
    }
}
