//! PixelTales Player - headless composition root.
//!
//! Logs what a renderer would draw and reads single-key commands from
//! stdin (`h` history, `l` live, `p`/`n` previous/next, `m`/`M` modal
//! open/close, `r` reconnect, `q` quit).

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixeltales_player::application::{parse_key, InputEvent, KeyCommand, SceneSession};
use pixeltales_player::infrastructure::clock::SystemClock;
use pixeltales_player::infrastructure::headless::{LogRenderer, LogStatusSink};
use pixeltales_player::{PlayerConfig, TransportChannel};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixeltales_player=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PlayerConfig::from_env().context("invalid player configuration")?;
    tracing::info!(
        url = %config.transport.url,
        max_reconnect_attempts = config.transport.max_reconnect_attempts,
        effect_restart = %config.effect_restart,
        discard_stale = config.discard_stale,
        "Starting PixelTales Player"
    );

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let channel = TransportChannel::new(config.transport.clone(), events_tx);
    let session = SceneSession::new(
        &config,
        channel,
        Box::new(LogRenderer::new()),
        Box::new(LogStatusSink),
        Arc::new(SystemClock::new()),
    );

    let (input_tx, input_rx) = mpsc::channel::<InputEvent>(32);
    tokio::spawn(read_keys(input_tx));

    session.run(events_rx, input_rx).await;
    Ok(())
}

/// Forward stdin keys until `q`; dropping the sender ends the session.
/// With stdin closed the session keeps running until Ctrl-C.
async fn read_keys(input: mpsc::Sender<InputEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_key(&line) {
                Some(KeyCommand::Input(event)) => {
                    if input.send(event).await.is_err() {
                        return;
                    }
                }
                Some(KeyCommand::Quit) => return,
                None => tracing::debug!(key = %line.trim(), "Unknown key"),
            },
            Ok(None) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stdin");
                return;
            }
        }
    }
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
