use anyhow::Result;
use clap::Parser;
use tracing::info;

use bucket_browser::app::App;
use bucket_browser::cli::Cli;
use bucket_browser::{logging, tui};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let path = cli.log_file.clone().unwrap_or_else(logging::default_log_path);
        logging::init_file_logging(&path)?;
        info!(path = %path.display(), "debug logging enabled");
    }

    let mut app = App::new(cli.output_dir.clone());
    tui::run(&mut app, cli.connect_options()).await?;

    if let Some(reason) = app.fatal_error() {
        eprintln!("{reason}");
        std::process::exit(1);
    }
    info!("session ended");
    Ok(())
}
