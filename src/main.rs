use chatdeck::core::config::{self, ResolvedConfig};
use chatdeck::core::model::InputMode;
use chatdeck::core::seed;
use chatdeck::tui;
use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chatdeck", about = "Browse company chat histories and send simulated queries")]
struct Args {
    /// Start in text or audio input mode
    #[arg(short, long, value_enum)]
    mode: Option<InputMode>,

    /// JSON file with companies to load instead of the built-in dataset
    #[arg(short, long)]
    seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to chatdeck.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("chatdeck.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("Config error, using defaults: {}", e);
        eprintln!("warning: {e}; using default settings");
        config::ChatdeckConfig::default()
    });
    let resolved: ResolvedConfig = config::resolve(&file_config, args.mode, args.seed.as_deref());

    log::info!(
        "chatdeck starting up in {} mode (seed: {:?})",
        resolved.input_mode.label(),
        resolved.seed_file
    );

    let companies = match &resolved.seed_file {
        Some(path) => seed::load_seed_file(path).map_err(|e| {
            log::error!("Failed to load seed file {}: {}", path.display(), e);
            std::io::Error::other(format!("{}: {e}", path.display()))
        })?,
        None => seed::seed_companies(),
    };

    tui::run(resolved, companies)
}
