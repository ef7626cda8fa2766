use std::path::Path;

use wordlink::db::{CONFIG_CONFLICT_RETRIES, CONFIG_WORDS, Database};

pub fn run(db_path: &Path, words: u32, conflict_retries: u32) -> Result<(), String> {
    if words == 0 {
        return Err("--words must be at least 1".to_string());
    }

    // Create the database directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| format!("failed to create directory: {e}"))?;
    }

    let db = Database::open(db_path).map_err(|e| e.to_string())?;
    db.migrate().map_err(|e| e.to_string())?;
    db.set_config(CONFIG_WORDS, &words.to_string())
        .map_err(|e| e.to_string())?;
    db.set_config(CONFIG_CONFLICT_RETRIES, &conflict_retries.to_string())
        .map_err(|e| e.to_string())?;
    db.set_config("version", env!("CARGO_PKG_VERSION"))
        .map_err(|e| e.to_string())?;

    println!("Initialized wordlink database at {}", db_path.display());
    println!("Words per path: {words}");
    Ok(())
}
