#![allow(deprecated)]
use cucumber::given;

use crate::WordlinkWorld;

/// Initialize a fresh wordlink database into the world's temp dir.
#[given("a wordlink database is initialized")]
async fn a_wordlink_database_is_initialized(world: &mut WordlinkWorld) {
    init_with_args(world, &[]);
}

/// Initialize with a non-default number of words per generated path.
#[given(expr = "a wordlink database is initialized with {int} words per path")]
async fn a_wordlink_database_with_words(world: &mut WordlinkWorld, words: u32) {
    init_with_args(world, &["--words", &words.to_string()]);
}

fn init_with_args(world: &mut WordlinkWorld, extra: &[&str]) {
    let dir = tempfile::TempDir::new().expect("create temp dir");
    let db_path = dir.path().join("wordlink.db");

    let output = assert_cmd::Command::cargo_bin("wl")
        .expect("wl binary not found")
        .env("WORDLINK_DB", &db_path)
        .arg("init")
        .args(extra)
        .output()
        .expect("failed to run wl init");

    assert!(
        output.status.success(),
        "wl init failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    world.db_path = Some(db_path);
    // Keep the TempDir alive for the lifetime of the scenario.
    world.db_dir = Some(dir);
}
