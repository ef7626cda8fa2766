use std::path::Path;

use colored::Colorize;
use wordlink::models::short_url;

use super::{open_allocator, to_json};

pub fn run(db_path: &Path, url: &str, json: bool) -> Result<(), String> {
    let allocator = open_allocator(db_path)?;
    let link = allocator
        .allocate(url)
        .map_err(|e| format!("{} ({})", e, e.kind()))?;

    if json {
        println!("{}", to_json(&link)?);
    } else {
        println!("Shortened {url} -> {}", short_url(&link.short_path).green());
    }
    Ok(())
}
