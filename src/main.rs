//! Entry point for the Fee Engine binary.
//!
//! Running this binary will start an HTTP server that exposes a
//! minimal API for computing parking fees.  The directory containing
//! fee model JSON files (and an optional `holidays.json` calendar) may
//! be specified via the `FEE_MODEL_DIR` environment variable; if unset
//! the server looks for a `fee_models` folder relative to the current
//! working directory.

use std::path::PathBuf;

#[tokio::main]
async fn main() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Determine where fee model files are located
    let model_dir = std::env::var("FEE_MODEL_DIR").unwrap_or_else(|_| "fee_models".to_string());
    let model_dir_path = PathBuf::from(model_dir);
    // Determine bind address
    let addr = std::env::var("FEE_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    if let Err(err) = fee_engine::api::serve(&addr, model_dir_path).await {
        eprintln!("Error running server: {}", err);
    }
}
