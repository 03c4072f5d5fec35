//! Development server: one open game, dev tokens, words from a file.
//!
//! ```text
//! SCRIBBLE_ADDR=0.0.0.0:8080 RUST_LOG=scribble=debug scribble-server [words.txt]
//! ```
//!
//! Join with `ws://<addr>/games/1?token=<id>:<name>`. Player 1 owns the game.

use scribble::prelude::*;
use scribble_room::Dictionary;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_ADDR: &str = "0.0.0.0:8080";

const FALLBACK_WORDS: &[&str] = &[
    "apple", "bicycle", "castle", "dragon", "guitar", "island", "lighthouse", "octopus",
    "penguin", "rainbow", "rocket", "snowman", "sunflower", "umbrella", "volcano", "whale",
];

/// Accepts `<id>:<name>` tokens. Only for development!
struct DevAuthenticator;

impl Authenticator for DevAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<Identity, SessionError> {
        let (id, name) = token
            .split_once(':')
            .ok_or_else(|| SessionError::Unauthorized("expected <id>:<name>".into()))?;
        let id: u64 = id
            .parse()
            .map_err(|_| SessionError::Unauthorized("id must be a number".into()))?;
        if name.is_empty() {
            return Err(SessionError::Unauthorized("empty name".into()));
        }
        Ok(Identity::new(PlayerId(id), name))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let addr = std::env::var("SCRIBBLE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let words: Vec<String> = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)?;
            tracing::info!(%path, "loaded word list");
            Dictionary::from_lines(&text).words().to_vec()
        }
        None => FALLBACK_WORDS.iter().map(|w| w.to_string()).collect(),
    };

    let server = ScribbleServerBuilder::new()
        .bind(&addr)
        .build(DevAuthenticator, MemoryRoomStore::new())
        .await?;
    let room_id = server
        .create_room(RoomSettings::new(PlayerId(1), words))
        .await;
    tracing::info!(%room_id, addr = %server.local_addr()?, "open game ready");

    server.run().await?;
    Ok(())
}
