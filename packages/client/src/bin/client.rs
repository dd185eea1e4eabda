//! Irori CLI client with reconnection support.
//!
//! Joins a collaborative room, prints presence, chat and document edits as
//! they arrive, and sends chat lines and `/code`, `/load`, `/lang` edits
//! typed at the prompt.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin irori-client -- --room r1 --name Alice
//! cargo run --bin irori-client -- -r r1 -n Bob -u ws://127.0.0.1:4000/ws
//! ```

use clap::Parser;

use irori_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "irori-client")]
#[command(about = "CLI client for Irori collaborative code editing rooms", long_about = None)]
struct Args {
    /// Room to join
    #[arg(short = 'r', long)]
    room: String,

    /// Display name shown to other users
    #[arg(short = 'n', long, default_value = "Anonymous")]
    name: String,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:4000/ws")]
    url: String,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = irori_client::run_client(args.url, args.room, args.name).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
