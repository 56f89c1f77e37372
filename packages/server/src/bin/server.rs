//! Bounce game server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin bounce-server
//! cargo run --bin bounce-server -- --host 0.0.0.0 --port 3000 --config-file bounce.json
//! ```

use bounce_server::{config::Config, ui::Server};
use bounce_shared::logger::setup_logger;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bounce-server")]
#[command(about = "Real-time multiplayer arena game server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "BNJ_HOST")]
    host: Option<String>,

    /// Port number to bind the server to (1000-9999)
    #[arg(short = 'p', long, env = "BNJ_PORT")]
    port: Option<u16>,

    /// JSON config file; missing fields take their defaults
    #[arg(short = 'c', long, env = "BNJ_CONFIG_FILE")]
    config_file: Option<String>,

    /// Milliseconds per simulation tick
    #[arg(long, env = "BNJ_TICK_MS")]
    tick_ms: Option<u64>,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, env = "BNJ_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Directory of the static client assets
    #[arg(long, env = "BNJ_STATIC_DIR")]
    static_dir: Option<String>,
}

impl Args {
    /// Defaults, then the config file, then flags and environment.
    fn into_config(self) -> Result<Config, Box<dyn std::error::Error>> {
        let mut config = match &self.config_file {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.tick_ms = tick_ms;
        }
        if let Some(static_dir) = self.static_dir {
            config.static_dir = static_dir;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        "World {}x{} tiles, up to {} players, {} ms per tick",
        config.world_map.width(),
        config.world_map.height(),
        config.world_rules.max_player,
        config.tick_ms
    );

    if let Err(e) = Server::new(config).run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
