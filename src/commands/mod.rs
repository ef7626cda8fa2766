pub mod init;
pub mod list;
pub mod resolve;
pub mod serve;
pub mod shorten;

use std::path::Path;

use colored::Colorize;
use wordlink::db::{self, Database};
use wordlink::models::{ShortLink, short_url};
use wordlink::shortener::Allocator;

/// Open the initialized database at `db_path` and build an allocator from its settings.
pub fn open_allocator(db_path: &Path) -> Result<Allocator, String> {
    let db = Database::open_existing(db_path).map_err(|e| e.to_string())?;
    db::allocator_for(db).map_err(|e| e.to_string())
}

pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("json error: {e}"))
}

/// Print a list of links as a table or JSON.
pub fn print_links(links: &[ShortLink], json: bool) -> Result<(), String> {
    if json {
        println!("{}", to_json(&links)?);
        return Ok(());
    }

    if links.is_empty() {
        println!("No links found.");
        return Ok(());
    }

    println!("{:<6} {:<32} {:<17} URL", "ID", "SHORT URL", "CREATED");
    println!("{}", "-".repeat(90));
    for l in links {
        let path = format!("{:<32}", short_url(&l.short_path));
        println!(
            "{:<6} {} {:<17} {}",
            l.id,
            path.cyan(),
            l.created_at.format("%Y-%m-%d %H:%M"),
            l.original_url,
        );
    }
    Ok(())
}
