use std::path::Path;

use super::{open_allocator, to_json};

pub fn run(db_path: &Path, short_path: &str, json: bool) -> Result<(), String> {
    let allocator = open_allocator(db_path)?;
    // Accept the full "/go/<path>" form as printed by `shorten`.
    let short_path = short_path
        .strip_prefix(wordlink::models::REDIRECT_PREFIX)
        .unwrap_or(short_path);
    let link = allocator
        .find(short_path)
        .map_err(|e| format!("{} ({})", e, e.kind()))?;

    if json {
        println!("{}", to_json(&link)?);
    } else {
        println!("{}", link.original_url);
    }
    Ok(())
}
