use std::sync::Arc;

use tracing::{error, info, warn};

use mailer::web::WebServer;
use mailer::{Config, ConfigStore, MailService, SchemaRegistry};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = mailer::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        mailer::logging::init_console_only(&config.logging.level);
    }

    info!("Mailer starting");

    if let Err(e) = config.validate() {
        warn!("Mail configuration is invalid: {}", e);
    }

    let store = match ConfigStore::new(&config) {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to build configuration store: {}", e);
            std::process::exit(1);
        }
    };

    let service = Arc::new(MailService::init(store, SchemaRegistry::with_defaults()));
    if service.is_enabled() {
        service.spawn_init_transports();
    }

    let server = match WebServer::new(&config.web, service) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to create web server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!("Web server error: {}", e);
        std::process::exit(1);
    }
}
