use std::path::Path;

pub fn run(db_path: &Path, host: &str, port: u16) -> Result<(), String> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start runtime: {e}"))?;
    runtime.block_on(wordlink::web::serve(db_path, host, port))
}
