//! Request routing between network and the current cache generation.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info, warn};
use url::Url;

use super::classify::{classify, ResourceClass};
use super::error::{OfflineError, Result};
use super::network::Network;
use super::request::{Destination, Method, Request, RequestKey, Response};
use super::storage::CacheStorage;

/// Name of a cache generation, e.g. `appanwendung-v1`.
pub fn generation_name(prefix: &str, version: u32) -> String {
  format!("{}-v{}", prefix, version)
}

/// Lifecycle of one router instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
  Parsed,
  Installing,
  /// Populated, waiting to supersede the previous generation.
  Installed,
  Activating,
  Activated,
  /// Install failed; this instance will never activate.
  Redundant,
}

/// Out-of-band messages from the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
  /// Activate as soon as installed, without waiting for the previous instance.
  SkipWaiting,
}

/// Where a routed response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
  Network,
  Cache,
  /// The cached root document, served in place of a missing navigation.
  Fallback,
  /// Generated 503, nothing else was available.
  Synthesized,
}

/// Routing decision for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
  /// Not intercepted; the caller performs the request itself.
  Passthrough,
  Respond {
    response: Response,
    source: ResponseSource,
  },
  /// Cache-first asset with no cached copy and no network.
  Unanswered,
}

impl Routed {
  fn respond(response: Response, source: ResponseSource) -> Self {
    Self::Respond { response, source }
  }
}

/// Static configuration of a router.
#[derive(Debug, Clone)]
pub struct RouterOptions {
  pub origin: Url,
  pub generation: String,
  /// Paths precached on install, relative to `origin`.
  pub manifest: Vec<String>,
  /// Document served for failed navigations.
  pub fallback_document: String,
}

/// Offline worker: populates its cache generation, purges older ones, and
/// answers requests cache-first or network-first.
pub struct CacheRouter<S: CacheStorage, N: Network> {
  storage: Arc<S>,
  network: N,
  generation: String,
  manifest: Vec<Url>,
  fallback_key: RequestKey,
  state: WorkerState,
  skip_waiting: bool,
  claimed: bool,
}

impl<S: CacheStorage, N: Network> CacheRouter<S, N> {
  pub fn new(storage: Arc<S>, network: N, options: RouterOptions) -> Result<Self> {
    let manifest = options
      .manifest
      .iter()
      .map(|path| options.origin.join(path))
      .collect::<std::result::Result<Vec<_>, _>>()?;
    let fallback = options.origin.join(&options.fallback_document)?;

    Ok(Self {
      storage,
      network,
      generation: options.generation,
      manifest,
      fallback_key: RequestKey::new(&Method::GET, &fallback),
      state: WorkerState::Parsed,
      skip_waiting: false,
      claimed: false,
    })
  }

  pub fn generation(&self) -> &str {
    &self.generation
  }

  pub fn state(&self) -> WorkerState {
    self.state
  }

  pub fn is_claimed(&self) -> bool {
    self.claimed
  }

  pub fn storage(&self) -> &S {
    &self.storage
  }

  #[cfg(test)]
  pub fn network(&self) -> &N {
    &self.network
  }

  pub fn post_message(&mut self, message: ControlMessage) {
    match message {
      ControlMessage::SkipWaiting => {
        debug!(generation = %self.generation, "skip waiting requested");
        self.skip_waiting = true;
      }
    }
  }

  /// Whether an installed instance may activate now.
  pub fn ready_to_activate(&self, has_active_predecessor: bool) -> bool {
    self.state == WorkerState::Installed && (!has_active_predecessor || self.skip_waiting)
  }

  /// Precache the manifest into the current generation, all or nothing.
  ///
  /// Any failed fetch or non-200 answer aborts the install before anything is
  /// written, leaving the previous generation in charge.
  pub async fn install(&mut self) -> Result<()> {
    self.state = WorkerState::Installing;
    info!(generation = %self.generation, entries = self.manifest.len(), "installing");

    let network = &self.network;
    let fetches = self.manifest.iter().map(|url| async move {
      let request = Request::get(url.clone());
      let response = network.fetch(&request).await?;
      if !response.is_cacheable() {
        return Err(OfflineError::Status {
          url: url.to_string(),
          status: response.status,
        });
      }
      Ok::<_, OfflineError>((request.key(), response))
    });

    let entries = match try_join_all(fetches).await {
      Ok(entries) => entries,
      Err(e) => {
        warn!(generation = %self.generation, error = %e, "install failed");
        self.state = WorkerState::Redundant;
        return Err(e);
      }
    };

    if let Err(e) = self.storage.put_all(&self.generation, &entries) {
      warn!(generation = %self.generation, error = %e, "install failed");
      self.state = WorkerState::Redundant;
      return Err(e);
    }

    self.state = WorkerState::Installed;
    self.post_message(ControlMessage::SkipWaiting);
    info!(generation = %self.generation, "installed");
    Ok(())
  }

  /// Delete every generation but the current one, then take control.
  ///
  /// Only a populated generation may take over. A failed install, or a
  /// current generation missing from storage, leaves every existing
  /// generation in place and returns [`OfflineError::NotInstalled`].
  ///
  /// Returns the names of the purged generations.
  pub async fn activate(&mut self) -> Result<Vec<String>> {
    if !self.is_installed()? {
      warn!(generation = %self.generation, state = ?self.state, "activate refused: not installed");
      return Err(OfflineError::NotInstalled {
        generation: self.generation.clone(),
      });
    }

    let previous = self.state;
    self.state = WorkerState::Activating;
    info!(generation = %self.generation, "activating");

    let purged = match self.purge_stale() {
      Ok(purged) => purged,
      Err(e) => {
        self.state = previous;
        return Err(e);
      }
    };

    self.claimed = true;
    self.state = WorkerState::Activated;
    Ok(purged)
  }

  /// Installed in this run, or by an earlier run that left the current
  /// generation in storage.
  fn is_installed(&self) -> Result<bool> {
    match self.state {
      WorkerState::Installed => Ok(true),
      WorkerState::Redundant | WorkerState::Installing => Ok(false),
      WorkerState::Parsed | WorkerState::Activating | WorkerState::Activated => Ok(
        self
          .storage
          .generations()?
          .iter()
          .any(|g| *g == self.generation),
      ),
    }
  }

  fn purge_stale(&self) -> Result<Vec<String>> {
    let mut purged = Vec::new();
    for name in self.storage.generations()? {
      if name != self.generation {
        info!(generation = %name, "clearing old cache");
        self.storage.delete(&name)?;
        purged.push(name);
      }
    }
    Ok(purged)
  }

  /// Decide how to answer a request. Never fails.
  pub async fn route(&self, request: &Request) -> Routed {
    if request.method != Method::GET {
      debug!(method = %request.method, url = %request.url, "passthrough");
      return Routed::Passthrough;
    }

    match classify(request) {
      ResourceClass::StaticAsset => self.cache_first(request).await,
      ResourceClass::Other => self.network_first(request).await,
    }
  }

  async fn cache_first(&self, request: &Request) -> Routed {
    let key = request.key();
    if let Some(cached) = self.lookup(&key) {
      return Routed::respond(cached, ResponseSource::Cache);
    }

    match self.network.fetch(request).await {
      Ok(response) => {
        if response.is_cacheable() {
          self.store(&key, &response);
        }
        Routed::respond(response, ResponseSource::Network)
      }
      Err(e) => {
        info!(url = %request.url, error = %e, "offline - using cache");
        match self.lookup(&key) {
          Some(cached) => Routed::respond(cached, ResponseSource::Cache),
          None => Routed::Unanswered,
        }
      }
    }
  }

  async fn network_first(&self, request: &Request) -> Routed {
    let key = request.key();

    match self.network.fetch(request).await {
      Ok(response) => {
        if response.is_cacheable() {
          self.store(&key, &response);
        }
        Routed::respond(response, ResponseSource::Network)
      }
      Err(e) => {
        info!(url = %request.url, error = %e, "offline - falling back to cache");

        if let Some(cached) = self.lookup(&key) {
          return Routed::respond(cached, ResponseSource::Cache);
        }

        if request.destination == Destination::Document {
          if let Some(document) = self.lookup(&self.fallback_key) {
            return Routed::respond(document, ResponseSource::Fallback);
          }
        }

        Routed::respond(Response::service_unavailable(), ResponseSource::Synthesized)
      }
    }
  }

  /// Cache read; storage failures count as a miss.
  fn lookup(&self, key: &RequestKey) -> Option<Response> {
    match self.storage.lookup(&self.generation, key) {
      Ok(Some(cached)) => {
        debug!(url = key.url(), cached_at = %cached.cached_at, "cache hit");
        Some(cached.response)
      }
      Ok(None) => None,
      Err(e) => {
        warn!(url = key.url(), error = %e, "cache read failed");
        None
      }
    }
  }

  /// Best-effort cache write.
  fn store(&self, key: &RequestKey, response: &Response) {
    if let Err(e) = self.storage.put(&self.generation, key, response) {
      warn!(url = key.url(), error = %e, "cache write failed");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::offline::storage::{CachedResponse, SqliteStorage};
  use std::collections::HashMap;
  use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
  use std::sync::Mutex;

  const ORIGIN: &str = "https://site.test";

  impl Routed {
    fn response(&self) -> Option<&Response> {
      match self {
        Self::Respond { response, .. } => Some(response),
        _ => None,
      }
    }

    fn source(&self) -> Option<ResponseSource> {
      match self {
        Self::Respond { source, .. } => Some(*source),
        _ => None,
      }
    }
  }

  /// Scripted network: serves registered bodies, 404 otherwise.
  #[derive(Default)]
  struct FakeNetwork {
    pages: Mutex<HashMap<String, Response>>,
    offline: AtomicBool,
    calls: AtomicUsize,
  }

  impl FakeNetwork {
    fn serve(&self, path: &str, response: Response) {
      let url = Url::parse(ORIGIN).unwrap().join(path).unwrap();
      self.pages.lock().unwrap().insert(url.to_string(), response);
    }

    fn go_offline(&self) {
      self.offline.store(true, Ordering::SeqCst);
    }

    fn calls(&self) -> usize {
      self.calls.load(Ordering::SeqCst)
    }
  }

  impl Network for FakeNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if self.offline.load(Ordering::SeqCst) {
        return Err(OfflineError::network(request.url.as_str(), "unreachable"));
      }
      let pages = self.pages.lock().unwrap();
      Ok(
        pages
          .get(request.url.as_str())
          .cloned()
          .unwrap_or_else(|| Response::new(404, "not found")),
      )
    }
  }

  /// Storage whose writes always fail.
  struct ReadOnlyStorage(SqliteStorage);

  impl CacheStorage for ReadOnlyStorage {
    fn generations(&self) -> Result<Vec<String>> {
      self.0.generations()
    }

    fn delete(&self, generation: &str) -> Result<bool> {
      self.0.delete(generation)
    }

    fn lookup(&self, generation: &str, key: &RequestKey) -> Result<Option<CachedResponse>> {
      self.0.lookup(generation, key)
    }

    fn put(&self, _generation: &str, _key: &RequestKey, _response: &Response) -> Result<()> {
      Err(OfflineError::storage("quota exceeded"))
    }

    fn put_all(&self, _generation: &str, _entries: &[(RequestKey, Response)]) -> Result<()> {
      Err(OfflineError::storage("quota exceeded"))
    }

    fn entry_count(&self, generation: &str) -> Result<usize> {
      self.0.entry_count(generation)
    }
  }

  fn options(generation: &str, manifest: &[&str]) -> RouterOptions {
    RouterOptions {
      origin: Url::parse(ORIGIN).unwrap(),
      generation: generation.to_string(),
      manifest: manifest.iter().map(|p| p.to_string()).collect(),
      fallback_document: "/index.html".to_string(),
    }
  }

  fn router(manifest: &[&str]) -> CacheRouter<SqliteStorage, FakeNetwork> {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    CacheRouter::new(storage, FakeNetwork::default(), options("site-v2", manifest)).unwrap()
  }

  fn url(path: &str) -> Url {
    Url::parse(ORIGIN).unwrap().join(path).unwrap()
  }

  fn cached_body(router: &CacheRouter<SqliteStorage, FakeNetwork>, path: &str) -> Option<Vec<u8>> {
    router
      .storage()
      .lookup(router.generation(), &Request::get(url(path)).key())
      .unwrap()
      .map(|c| c.response.body)
  }

  #[test]
  fn test_generation_name() {
    assert_eq!(generation_name("appanwendung", 1), "appanwendung-v1");
  }

  #[tokio::test]
  async fn test_non_get_passes_through_untouched() {
    let router = router(&[]);
    router.network().serve("/api/contact", Response::new(200, "ok"));

    let request = Request::get(url("/api/contact")).with_method(Method::POST);
    assert_eq!(router.route(&request).await, Routed::Passthrough);

    assert_eq!(router.network().calls(), 0);
    assert!(router.storage().generations().unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_static_asset_served_from_cache_without_network() {
    let router = router(&[]);
    router
      .storage()
      .put(
        "site-v2",
        &Request::get(url("/main.js")).key(),
        &Response::new(200, "cached js"),
      )
      .unwrap();
    router.network().serve("/main.js", Response::new(200, "fresh js"));

    let routed = router.route(&Request::get(url("/main.js"))).await;

    assert_eq!(routed.source(), Some(ResponseSource::Cache));
    assert_eq!(routed.response().unwrap().body, b"cached js");
    assert_eq!(router.network().calls(), 0);
  }

  #[tokio::test]
  async fn test_static_asset_miss_fetches_and_populates() {
    let router = router(&[]);
    router
      .network()
      .serve("/styles.css", Response::new(200, "body{}"));

    let routed = router.route(&Request::get(url("/styles.css"))).await;

    assert_eq!(routed.source(), Some(ResponseSource::Network));
    assert_eq!(routed.response().unwrap().body, b"body{}");
    assert_eq!(cached_body(&router, "/styles.css"), Some(b"body{}".to_vec()));
  }

  #[tokio::test]
  async fn test_static_asset_non_200_not_cached() {
    let router = router(&[]);

    let routed = router.route(&Request::get(url("/missing.png"))).await;

    assert_eq!(routed.response().unwrap().status, 404);
    assert_eq!(cached_body(&router, "/missing.png"), None);
  }

  #[tokio::test]
  async fn test_static_asset_offline_and_uncached_is_unanswered() {
    let router = router(&[]);
    router.network().go_offline();

    let routed = router.route(&Request::get(url("/logo.svg"))).await;
    assert_eq!(routed, Routed::Unanswered);
  }

  #[tokio::test]
  async fn test_document_network_first_overwrites_cache() {
    let router = router(&[]);
    router
      .storage()
      .put(
        "site-v2",
        &Request::get(url("/index.html")).key(),
        &Response::new(200, "stale"),
      )
      .unwrap();
    router
      .network()
      .serve("/index.html", Response::new(200, "fresh"));

    let routed = router.route(&Request::document(url("/index.html"))).await;

    assert_eq!(routed.source(), Some(ResponseSource::Network));
    assert_eq!(routed.response().unwrap().body, b"fresh");
    assert_eq!(cached_body(&router, "/index.html"), Some(b"fresh".to_vec()));
  }

  #[tokio::test]
  async fn test_network_failure_falls_back_to_cached_entry() {
    let router = router(&[]);
    router
      .storage()
      .put(
        "site-v2",
        &Request::get(url("/manifest.json")).key(),
        &Response::new(200, "{}"),
      )
      .unwrap();
    router.network().go_offline();

    let routed = router.route(&Request::get(url("/manifest.json"))).await;
    assert_eq!(routed.source(), Some(ResponseSource::Cache));
    assert_eq!(routed.response().unwrap().body, b"{}");
  }

  #[tokio::test]
  async fn test_offline_document_gets_cached_root() {
    let router = router(&[]);
    router
      .storage()
      .put(
        "site-v2",
        &Request::get(url("/index.html")).key(),
        &Response::new(200, "<html>shell</html>"),
      )
      .unwrap();
    router.network().go_offline();

    let routed = router.route(&Request::document(url("/leistungen"))).await;

    assert_eq!(routed.source(), Some(ResponseSource::Fallback));
    assert_eq!(routed.response().unwrap().body, b"<html>shell</html>");
  }

  #[tokio::test]
  async fn test_offline_document_without_cache_gets_503() {
    let router = router(&[]);
    router.network().go_offline();

    let routed = router.route(&Request::document(url("/leistungen"))).await;

    assert_eq!(routed.source(), Some(ResponseSource::Synthesized));
    assert_eq!(routed.response().unwrap().status, 503);
  }

  #[tokio::test]
  async fn test_offline_api_call_gets_503_not_root_document() {
    let router = router(&[]);
    router
      .storage()
      .put(
        "site-v2",
        &Request::get(url("/index.html")).key(),
        &Response::new(200, "<html>shell</html>"),
      )
      .unwrap();
    router.network().go_offline();

    let routed = router.route(&Request::get(url("/api/projects"))).await;
    assert_eq!(routed.source(), Some(ResponseSource::Synthesized));
  }

  #[tokio::test]
  async fn test_cache_write_failure_does_not_fail_response() {
    let storage = Arc::new(ReadOnlyStorage(SqliteStorage::open_in_memory().unwrap()));
    let router = CacheRouter::new(storage, FakeNetwork::default(), options("site-v2", &[])).unwrap();
    router.network().serve("/main.js", Response::new(200, "js"));

    let routed = router.route(&Request::get(url("/main.js"))).await;
    assert_eq!(routed.source(), Some(ResponseSource::Network));
    assert_eq!(routed.response().unwrap().body, b"js");
  }

  #[tokio::test]
  async fn test_install_populates_manifest() {
    let mut router = router(&["/", "/index.html", "/main.js"]);
    router.network().serve("/", Response::new(200, "root"));
    router
      .network()
      .serve("/index.html", Response::new(200, "index"));
    router.network().serve("/main.js", Response::new(200, "js"));

    router.install().await.unwrap();

    assert_eq!(router.state(), WorkerState::Installed);
    assert_eq!(router.storage().entry_count("site-v2").unwrap(), 3);
    assert_eq!(cached_body(&router, "/main.js"), Some(b"js".to_vec()));
    assert!(router.ready_to_activate(true));
  }

  #[tokio::test]
  async fn test_failed_install_writes_nothing() {
    let mut router = router(&["/index.html", "/missing.css"]);
    router
      .network()
      .serve("/index.html", Response::new(200, "index"));

    let err = router.install().await.unwrap_err();

    assert!(matches!(err, OfflineError::Status { status: 404, .. }));
    assert_eq!(router.state(), WorkerState::Redundant);
    assert!(router.storage().generations().unwrap().is_empty());
    assert!(!router.ready_to_activate(false));
  }

  #[tokio::test]
  async fn test_install_offline_keeps_previous_generation() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    storage
      .put("site-v1", &Request::get(url("/")).key(), &Response::new(200, "old"))
      .unwrap();

    let mut router = CacheRouter::new(
      Arc::clone(&storage),
      FakeNetwork::default(),
      options("site-v2", &["/"]),
    )
    .unwrap();
    router.network().go_offline();

    assert!(matches!(
      router.install().await,
      Err(OfflineError::Network { .. })
    ));
    assert_eq!(storage.generations().unwrap(), vec!["site-v1"]);
  }

  #[tokio::test]
  async fn test_activate_purges_other_generations() {
    let mut router = router(&["/"]);
    for generation in ["site-v0", "site-v1"] {
      router
        .storage()
        .put(generation, &Request::get(url("/")).key(), &Response::new(200, "old"))
        .unwrap();
    }
    router.network().serve("/", Response::new(200, "new"));
    router.install().await.unwrap();

    let mut purged = router.activate().await.unwrap();
    purged.sort();

    assert_eq!(purged, vec!["site-v0", "site-v1"]);
    assert_eq!(router.storage().generations().unwrap(), vec!["site-v2"]);
    assert_eq!(router.state(), WorkerState::Activated);
    assert!(router.is_claimed());
  }

  #[tokio::test]
  async fn test_activate_without_install_keeps_old_generation() {
    let mut router = router(&[]);
    router
      .storage()
      .put("site-v1", &Request::get(url("/")).key(), &Response::new(200, "old"))
      .unwrap();

    let err = router.activate().await.unwrap_err();

    assert!(matches!(err, OfflineError::NotInstalled { .. }));
    assert_eq!(router.storage().generations().unwrap(), vec!["site-v1"]);
    assert_eq!(router.state(), WorkerState::Parsed);
    assert!(!router.is_claimed());
  }

  #[tokio::test]
  async fn test_activate_after_failed_install_keeps_old_generation() {
    let mut router = router(&["/"]);
    router
      .storage()
      .put("site-v1", &Request::get(url("/")).key(), &Response::new(200, "old"))
      .unwrap();
    router.network().go_offline();

    assert!(router.install().await.is_err());
    let err = router.activate().await.unwrap_err();

    assert!(matches!(err, OfflineError::NotInstalled { .. }));
    assert_eq!(router.state(), WorkerState::Redundant);
    assert_eq!(router.storage().generations().unwrap(), vec!["site-v1"]);
  }

  #[tokio::test]
  async fn test_activate_generation_installed_by_earlier_run() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    for generation in ["site-v1", "site-v2"] {
      storage
        .put(generation, &Request::get(url("/")).key(), &Response::new(200, "page"))
        .unwrap();
    }
    let mut router = CacheRouter::new(
      Arc::clone(&storage),
      FakeNetwork::default(),
      options("site-v2", &["/"]),
    )
    .unwrap();

    assert_eq!(router.activate().await.unwrap(), vec!["site-v1"]);
    assert_eq!(storage.generations().unwrap(), vec!["site-v2"]);
    assert_eq!(router.state(), WorkerState::Activated);
  }

  #[test]
  fn test_waiting_rules() {
    let mut router = router(&[]);
    assert!(!router.ready_to_activate(false));

    router.state = WorkerState::Installed;
    assert!(router.ready_to_activate(false));
    assert!(!router.ready_to_activate(true));

    router.post_message(ControlMessage::SkipWaiting);
    assert!(router.ready_to_activate(true));
  }

  #[tokio::test]
  async fn test_concurrent_routes_populate_independent_entries() {
    let router = router(&[]);
    for path in ["/a.js", "/b.js", "/c.css"] {
      router
        .network()
        .serve(path, Response::new(200, path.as_bytes().to_vec()));
    }

    let requests: Vec<Request> = ["/a.js", "/b.js", "/c.css"]
      .into_iter()
      .map(|p| Request::get(url(p)))
      .collect();
    let routed = futures::future::join_all(requests.iter().map(|r| router.route(r))).await;

    assert!(routed
      .iter()
      .all(|r| r.source() == Some(ResponseSource::Network)));
    assert_eq!(router.storage().entry_count("site-v2").unwrap(), 3);
  }
}
