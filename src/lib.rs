/// SQLite mapping store: open, migrate, config, link rows.
pub mod db;
/// Tracing subscriber setup.
pub mod logging;
/// Data types: ShortLink and the web request/response bodies.
pub mod models;
/// Short path allocation and resolution.
pub mod shortener;
/// Axum-based web server and router.
pub mod web;
