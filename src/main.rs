use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::{info, warn};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use parley::backend::HttpBackend;
use parley::core::config::{self, CliOverrides, ParleyConfig};
use parley::core::state::App;

#[derive(Parser)]
#[command(name = "parley", about = "Terminal chat client for an AI assistant backend")]
struct Args {
    /// Backend URL that receives `POST {"message": ...}`
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Directory attachments are saved to
    #[arg(short, long)]
    download_dir: Option<PathBuf>,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Config errors are not fatal; fall back to defaults
    let (file_config, config_error) = match config::load_config() {
        Ok(c) => (c, None),
        Err(e) => (ParleyConfig::default(), Some(e)),
    };
    let cli = CliOverrides {
        endpoint: args.endpoint,
        download_dir: args.download_dir,
        log_file: args.log_file,
    };
    let resolved = config::resolve(&file_config, &cli);

    // File logger; the terminal belongs to the UI
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }
    if let Some(e) = config_error {
        warn!("Using default config: {}", e);
    }

    info!(
        "Parley starting up: endpoint={}, download_dir={}, {} conversation(s)",
        resolved.endpoint,
        resolved.download_dir.display(),
        resolved.conversations.len()
    );

    let backend = HttpBackend::new(&resolved.endpoint)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    let app = App::from_config(Arc::new(backend), &resolved);

    parley::tui::run(app)
}
