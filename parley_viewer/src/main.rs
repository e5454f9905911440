//! Parley Viewer CLI
//!
//! Connects to the conversation backend, starts a persona conversation,
//! and plays it back as a 3D scene: avatars on a ring, speech bubbles,
//! and message orbs arcing between speakers.

use clap::Parser;
use parley_core::playback::SPEED_STEPS;
use parley_feed::FeedConfig;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod app;
mod render;

use app::{SessionOptions, ViewerSession};
use render::SceneRenderer;

/// Watch persona conversations as an animated 3D scene.
#[derive(Parser, Debug)]
#[command(name = "parley-viewer")]
#[command(about = "Play back persona conversations in 3D", long_about = None)]
struct Args {
    /// Backend host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Backend port
    #[arg(long, default_value = "8000")]
    port: u16,

    /// Use wss/https instead of ws/http
    #[arg(long)]
    tls: bool,

    /// Persona profile id to converse with
    #[arg(short, long)]
    target: String,

    /// Predefined profile id to speak as (default: the session profile)
    #[arg(short, long)]
    user: Option<String>,

    /// Maximum conversation turns
    #[arg(long, default_value = "8")]
    max_turns: u32,

    /// Let the agents research each other first
    #[arg(long)]
    research: bool,

    /// Backend pause between streamed turns, in seconds
    #[arg(long, default_value = "2.5")]
    pause: f64,

    /// Playback speed (0.5, 1, 2, 4)
    #[arg(long, default_value = "1.0")]
    speed: f64,

    /// Fixed timeline length in seconds instead of deriving from events
    #[arg(long)]
    duration: Option<f64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    // The controls offer a small discrete set of speeds; anything else
    // is a typo, not a preference.
    if !SPEED_STEPS.iter().any(|s| (s - args.speed).abs() < 1e-9) {
        eprintln!("Error: unsupported speed {}", args.speed);
        eprintln!("Available speeds: 0.5, 1, 2, 4");
        std::process::exit(1);
    }

    let config = FeedConfig::new(args.host.clone(), args.port).with_tls(args.tls);
    info!(
        "session {} → {}:{}",
        config.session_id, args.host, args.port
    );

    let options = SessionOptions {
        target_profile_id: args.target,
        user_profile_id: args.user,
        max_turns: args.max_turns,
        enable_research: args.research,
        message_pause_seconds: args.pause,
        speed: args.speed,
        duration_override: args.duration,
    };

    let renderer = SceneRenderer::new("parley_viewer");
    let mut session = ViewerSession::connect(config, options, renderer).await?;

    session.start_conversation().await;
    session.run().await
}
