mod steps;

use std::collections::HashMap;
use std::path::PathBuf;

use cucumber::World;

/// Shared state carried through each scenario.
#[derive(Debug, World)]
pub struct WordlinkWorld {
    /// Temporary directory that owns the database file.
    pub db_dir: Option<tempfile::TempDir>,
    /// Path to the SQLite database file inside `db_dir`.
    pub db_path: Option<PathBuf>,
    /// The raw stdout of the most recent `wl` invocation.
    pub last_stdout: String,
    /// The raw stderr of the most recent `wl` invocation.
    pub last_stderr: String,
    /// Exit code of the most recent `wl` invocation.
    pub last_exit_code: i32,
    /// Alias to short path map, populated by shorten steps.
    pub short_paths: HashMap<String, String>,
    /// Port of the in-process web server, once started.
    pub server_port: Option<u16>,
    /// Handle of the spawned server task.
    pub server_handle: Option<tokio::task::JoinHandle<()>>,
    /// Client that does not follow redirects, so 307s can be asserted.
    pub http_client: reqwest::Client,
    pub last_response_status: Option<u16>,
    pub last_response_location: Option<String>,
    pub last_response_body: Option<String>,
}

impl Default for WordlinkWorld {
    fn default() -> Self {
        WordlinkWorld {
            db_dir: None,
            db_path: None,
            last_stdout: String::new(),
            last_stderr: String::new(),
            last_exit_code: 0,
            short_paths: HashMap::new(),
            server_port: None,
            server_handle: None,
            http_client: reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .expect("build http client"),
            last_response_status: None,
            last_response_location: None,
            last_response_body: None,
        }
    }
}

impl Drop for WordlinkWorld {
    fn drop(&mut self) {
        if let Some(handle) = self.server_handle.take() {
            handle.abort();
        }
    }
}

#[tokio::main]
async fn main() {
    WordlinkWorld::run("tests/features").await;
}
