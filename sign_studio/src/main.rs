//! sign_studio — interactive entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sign_studio::app::{run, AppConfig};

#[derive(Parser, Debug)]
#[command(name = "sign_studio", about = "Hand-sign technique visualizer")]
struct Cli {
    /// Window width in pixels.
    #[arg(long, default_value_t = 960)]
    width: usize,

    /// Window height in pixels.
    #[arg(long, default_value_t = 540)]
    height: usize,

    /// Start with the skeleton/debug overlay hidden.
    #[arg(long)]
    no_skeleton: bool,

    /// Log filter, e.g. `info` or `sign_engine=debug`.
    #[arg(long, default_value = "info")]
    log: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log)),
        )
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║            Sign Studio — Hand-Sign Technique FX              ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Keyboard simulation  (use --features leap for hardware)");
    println!();
    println!("  Signs:  fist > two fingers = Slash");
    println!("          pinch > open hand  = Fireball");
    println!("          hold open hand     = Aura");
    println!();
    println!("  Opening visualizer window…");
    println!();

    run(AppConfig {
        width: cli.width.max(320),
        height: cli.height.max(240),
        show_skeleton: !cli.no_skeleton,
    })
}
