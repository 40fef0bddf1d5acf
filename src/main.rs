//! Entry point for the Payroll Engine binary.
//!
//! Running this binary starts an HTTP server that exposes the payroll
//! engine over the employee and attendance files found in
//! `PAYROLL_DATA_DIR`.  See [`payroll_engine::config`] for every
//! recognised environment variable.

use payroll_engine::config::Settings;
use payroll_engine::{api, logging};

#[tokio::main]
async fn main() {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };
    logging::init_logger(settings.verbose);

    if let Err(err) = api::serve(&settings).await {
        tracing::error!("Error running server: {:#}", err);
        std::process::exit(1);
    }
}
