//! Irori room server.
//!
//! Serves collaborative code editing rooms over WebSocket. Room state lives in
//! the room store; an empty room expires after `ROOM_TTL` seconds.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin irori-server
//! cargo run --bin irori-server -- --host 0.0.0.0 --port 4000 --room-ttl 600
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use irori_server::{
    config::{DEFAULT_FRONTEND_ORIGIN, ServerConfig},
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::StoreRoomRepository,
        store::InMemoryRoomStore,
    },
    ui::{AppState, Server},
};
use irori_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "irori-server")]
#[command(about = "Collaborative code editing room server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "4000")]
    port: u16,

    /// Seconds an empty room is kept before it expires
    #[arg(long, env = "ROOM_TTL", default_value = "3600")]
    room_ttl: u64,

    /// Origin allowed to connect from the browser
    #[arg(long, env = "FRONTEND_ORIGIN", default_value = DEFAULT_FRONTEND_ORIGIN)]
    frontend_origin: String,

    /// Seconds between sweeps of expired room keys (0 disables the sweeper)
    #[arg(long, env = "SWEEP_INTERVAL", default_value = "30")]
    sweep_interval: u64,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            room_ttl: Duration::from_secs(args.room_ttl),
            frontend_origin: args.frontend_origin,
            sweep_interval: Duration::from_secs(args.sweep_interval),
        }
    }
}

#[tokio::main]
async fn main() {
    // .env は無くてもよい
    dotenvy::dotenv().ok();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let config = ServerConfig::from(Args::parse());
    tracing::info!(
        "Room TTL {}s, frontend origin {}",
        config.room_ttl.as_secs(),
        config.frontend_origin
    );

    // Initialize dependencies in order:
    // 1. Room Store (+ sweeper)
    // 2. Repository
    // 3. MessagePusher
    // 4. UseCases (AppState)
    // 5. Server

    // 1. Create Room Store
    let store = Arc::new(InMemoryRoomStore::new());
    // 0 なら期限切れのキーはアクセス時にだけ消える
    let sweeper = (!config.sweep_interval.is_zero())
        .then(|| store.clone().spawn_sweeper(config.sweep_interval));

    // 2. Create Repository
    let repository = Arc::new(StoreRoomRepository::new(store));

    // 3. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 4. Create UseCases
    let state = AppState::new(
        repository,
        message_pusher,
        Arc::new(SystemClock),
        config.room_ttl,
    );

    // 5. Create and run the server
    let result = Server::new(config, state).run().await;
    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }

    if let Err(e) = result {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
