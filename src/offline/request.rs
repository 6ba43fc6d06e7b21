//! Requests, responses and the identity used to cache them.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

pub use reqwest::Method;

/// What the page intends to do with a response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Destination {
  Document,
  Script,
  Style,
  Image,
  Font,
  #[default]
  Other,
}

/// An outgoing request from the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
  pub method: Method,
  pub url: Url,
  pub destination: Destination,
}

impl Request {
  pub fn get(url: Url) -> Self {
    Self {
      method: Method::GET,
      url,
      destination: Destination::Other,
    }
  }

  /// A top-level navigation.
  pub fn document(url: Url) -> Self {
    Self {
      destination: Destination::Document,
      ..Self::get(url)
    }
  }

  pub fn with_method(mut self, method: Method) -> Self {
    self.method = method;
    self
  }

  pub fn with_destination(mut self, destination: Destination) -> Self {
    self.destination = destination;
    self
  }

  pub fn key(&self) -> RequestKey {
    RequestKey::new(&self.method, &self.url)
  }
}

/// Cache identity of a request: method plus URL without fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
  method: String,
  url: String,
}

impl RequestKey {
  pub fn new(method: &Method, url: &Url) -> Self {
    let mut url = url.clone();
    url.set_fragment(None);

    Self {
      method: method.as_str().to_string(),
      url: url.to_string(),
    }
  }

  pub fn method(&self) -> &str {
    &self.method
  }

  pub fn url(&self) -> &str {
    &self.url
  }

  /// Stable, fixed-length storage key.
  pub fn cache_hash(&self) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.method.as_bytes());
    hasher.update(b" ");
    hasher.update(self.url.as_bytes());
    hex::encode(hasher.finalize())
  }
}

/// A response as seen by the page, buffered in full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
  pub status: u16,
  pub status_text: String,
  pub headers: Vec<(String, String)>,
  pub body: Vec<u8>,
}

impl Response {
  pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
    Self {
      status,
      status_text: reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or_default()
        .to_string(),
      headers: Vec::new(),
      body: body.into(),
    }
  }

  /// Stand-in answer when neither network nor cache can serve a request.
  pub fn service_unavailable() -> Self {
    Self::new(503, "Offline - resource not available")
      .with_header("content-type", "text/plain; charset=utf-8")
  }

  pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.headers.push((name.into(), value.into()));
    self
  }

  pub fn header(&self, name: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(n, _)| n.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }

  /// Only plain 200 responses are worth caching.
  pub fn is_cacheable(&self) -> bool {
    self.status == 200
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
  }

  #[test]
  fn test_key_ignores_fragment() {
    let a = RequestKey::new(&Method::GET, &url("https://site.test/index.html#kontakt"));
    let b = RequestKey::new(&Method::GET, &url("https://site.test/index.html"));
    assert_eq!(a, b);
    assert_eq!(a.cache_hash(), b.cache_hash());
  }

  #[test]
  fn test_key_distinguishes_method_and_query() {
    let get = RequestKey::new(&Method::GET, &url("https://site.test/api"));
    let post = RequestKey::new(&Method::POST, &url("https://site.test/api"));
    let query = RequestKey::new(&Method::GET, &url("https://site.test/api?page=2"));
    assert_ne!(get.cache_hash(), post.cache_hash());
    assert_ne!(get.cache_hash(), query.cache_hash());
    assert_eq!(get.cache_hash().len(), 64);
  }

  #[test]
  fn test_service_unavailable() {
    let response = Response::service_unavailable();
    assert_eq!(response.status, 503);
    assert_eq!(response.status_text, "Service Unavailable");
    assert_eq!(
      response.header("Content-Type"),
      Some("text/plain; charset=utf-8")
    );
    assert!(!response.is_cacheable());
  }

  #[test]
  fn test_document_request() {
    let request = Request::document(url("https://site.test/"));
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.destination, Destination::Document);
  }
}
