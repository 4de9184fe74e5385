//! WiFi QR provisioning server.
//!
//! Serves the credential API over HTTP (default port 8080, `PORT` overrides).
//!
//! # Usage
//!
//! ```bash
//! cargo run -- -p 9000
//! curl -d '{"ssid":"Home","enc":"WPA2","password":"secret"}' localhost:9000/wifi
//! curl -o home.png localhost:9000/qr/Home.png
//! ```

use log::{error, info};
use std::sync::Arc;
use wifi_qr::network::{usage, CliAction};
use wifi_qr::{CredentialStore, HttpServer, ServerConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match ServerConfig::from_env() {
        Ok(CliAction::Run(config)) => config,
        Ok(CliAction::Help) => {
            let program = std::env::args().next().unwrap_or_else(|| "wifi-qr".to_string());
            println!("{}", usage(&program));
            return;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run with --help for usage.");
            std::process::exit(1);
        }
    };

    info!("=== WiFi QR server starting ===");

    // Records live only as long as the process
    let store = Arc::new(CredentialStore::new());

    // Keep server alive - dropping it stops the workers
    let _server = match HttpServer::start(&config, store) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    loop {
        std::thread::park();
    }
}
