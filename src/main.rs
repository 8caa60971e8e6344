//! nuttyfi32 BSP release tool.
//!
//! This binary repackages the Arduino ESP32 board-support package as
//! nuttyfi32, keeps the board-manager index consistent with the built
//! archive, and hands the result to git for publication.

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match nuttyfi32_bsp_release::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
