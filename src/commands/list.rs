use std::path::Path;

use super::{open_allocator, print_links};

pub fn run(db_path: &Path, limit: u32, json: bool) -> Result<(), String> {
    let allocator = open_allocator(db_path)?;
    let links = allocator.recent(limit).map_err(|e| e.to_string())?;
    print_links(&links, json)
}
