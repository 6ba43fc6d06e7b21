mod app;
mod cli;
mod config;
mod event;
mod logging;
mod modal;
mod offline;
mod site;
mod ui;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vitrine")]
#[command(about = "A terminal showcase site with project dialogs and an offline cache")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./vitrine.yaml, then $XDG_CONFIG_HOME/vitrine/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Browse the site (default)
  Browse,

  /// Manage the offline cache
  Offline {
    #[command(subcommand)]
    command: cli::OfflineCommand,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;

  match args.command.unwrap_or(Command::Browse) {
    Command::Browse => {
      // The terminal belongs to the UI, so logs go to a file
      logging::init_file()?;
      let mut app = app::App::new(config);
      app.run().await?;
    }
    Command::Offline { command } => {
      logging::init_stderr()?;
      cli::run(command, &config.offline).await?;
    }
  }

  Ok(())
}
