//! Searchlight Playback Server
//!
//! Serve the algorithm cards and their step-by-step playback.

use std::env;
use std::time::Duration;

use searchlight_vis::{PlaybackConfig, VisConfig, VisServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "searchlight_vis=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command line args: [port] [interval_ms]
    let args: Vec<String> = env::args().collect();
    let defaults = VisConfig::default();

    let port: u16 = args.get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(defaults.port);

    let playback = args.get(2)
        .and_then(|s| s.parse().ok())
        .map(|ms| PlaybackConfig::with_interval(Duration::from_millis(ms)))
        .unwrap_or(defaults.playback);

    println!("Searchlight");
    println!("===========");
    println!();
    println!("Auto-play interval: {} ms", playback.interval.as_millis());
    println!("Starting server on http://localhost:{}", port);
    println!("Open in browser to step through the algorithms.");
    println!();

    let server = VisServer::new(VisConfig { port, playback });
    server.serve().await?;

    Ok(())
}
