//! Non-interactive `offline` commands that drive the cache router directly.

use clap::{Args, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::OfflineConfig;
use crate::offline::{
  CacheRouter, CacheStorage, ControlMessage, Destination, HttpNetwork, Method, Network,
  OfflineError, Request, Response, Routed, SqliteStorage,
};

#[derive(Subcommand, Debug)]
pub enum OfflineCommand {
  /// Precache the manifest into the current cache generation.
  Install,

  /// Purge every cache generation except the current one.
  Activate,

  /// Route one request through the cache and report how it was answered.
  Fetch(FetchArgs),

  /// List cache generations and their entry counts.
  Status,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
  /// Path relative to the configured origin, e.g. /styles.css
  pub path: String,

  /// HTTP method
  #[arg(long, default_value = "GET")]
  pub method: String,

  /// Treat the request as a page navigation (same as `--destination document`)
  #[arg(long, conflicts_with = "destination")]
  pub document: bool,

  /// What the response is for; scripts, styles, images and fonts are served cache-first
  #[arg(long, value_enum, default_value = "other")]
  pub destination: Destination,
}

/// Run an offline command against the configured origin and cache database.
pub async fn run(command: OfflineCommand, config: &OfflineConfig) -> Result<()> {
  let database = config.database_path()?;
  info!(database = %database.display(), generation = %config.generation(), "opening cache");

  let storage = Arc::new(SqliteStorage::open(&database)?);
  let network = HttpNetwork::new(config.timeout())?;
  let mut router = CacheRouter::new(storage, network, config.router_options()?)?;

  let report = match command {
    OfflineCommand::Install => install(&mut router).await?,
    OfflineCommand::Activate => activate(&mut router).await?,
    OfflineCommand::Fetch(args) => fetch(&router, config, &args).await?,
    OfflineCommand::Status => status(&router)?,
  };
  debug!(state = ?router.state(), claimed = router.is_claimed(), "offline command finished");

  print!("{}", report);
  Ok(())
}

async fn install<S: CacheStorage, N: Network>(router: &mut CacheRouter<S, N>) -> Result<String> {
  let has_predecessor = router
    .storage()
    .generations()?
    .iter()
    .any(|g| g != router.generation());

  router.install().await?;
  let mut report = format!("installed {}\n", router.generation());

  if router.ready_to_activate(has_predecessor) {
    let purged = router.activate().await?;
    report.push_str(&purged_report(router.generation(), &purged));
  }
  Ok(report)
}

async fn activate<S: CacheStorage, N: Network>(router: &mut CacheRouter<S, N>) -> Result<String> {
  router.post_message(ControlMessage::SkipWaiting);
  match router.activate().await {
    Ok(purged) => Ok(purged_report(router.generation(), &purged)),
    Err(OfflineError::NotInstalled { generation }) => Ok(format!(
      "nothing installed for {}, run `vitrine offline install` first\n",
      generation
    )),
    Err(e) => Err(e.into()),
  }
}

fn purged_report(generation: &str, purged: &[String]) -> String {
  let mut report = format!("activated {}\n", generation);
  for name in purged {
    let _ = writeln!(report, "  removed {}", name);
  }
  report
}

async fn fetch<S: CacheStorage, N: Network>(
  router: &CacheRouter<S, N>,
  config: &OfflineConfig,
  args: &FetchArgs,
) -> Result<String> {
  let url = config
    .origin_url()?
    .join(&args.path)
    .map_err(|e| eyre!("Invalid path '{}': {}", args.path, e))?;
  let method = Method::from_bytes(args.method.to_uppercase().as_bytes())
    .map_err(|_| eyre!("Invalid HTTP method: {}", args.method))?;

  let request = if args.document {
    Request::document(url)
  } else {
    Request::get(url).with_destination(args.destination)
  }
  .with_method(method);

  let routed = router.route(&request).await;
  Ok(describe(&request, &routed))
}

/// One-line summary of how a request was answered.
fn describe(request: &Request, routed: &Routed) -> String {
  let outcome = match routed {
    Routed::Passthrough => "not intercepted".to_string(),
    Routed::Unanswered => "unanswered (offline, not cached)".to_string(),
    Routed::Respond { response, source } => format!("{} from {:?}", summarize(response), source),
  };
  format!("{} {} {}\n", request.method, request.url, outcome)
}

fn summarize(response: &Response) -> String {
  format!(
    "{} {}, {} bytes ({})",
    response.status,
    response.status_text,
    response.body.len(),
    response.header("content-type").unwrap_or("no content type")
  )
}

fn status<S: CacheStorage, N: Network>(router: &CacheRouter<S, N>) -> Result<String> {
  let storage = router.storage();
  let generations = storage.generations()?;
  if generations.is_empty() {
    return Ok("no cache generations\n".to_string());
  }

  let mut report = String::new();
  for name in generations {
    let marker = if name == router.generation() { "*" } else { " " };
    let _ = writeln!(report, "{} {} ({} entries)", marker, name, storage.entry_count(&name)?);
  }
  Ok(report)
}
