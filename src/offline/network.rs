//! The network side of the router.

use std::future::Future;
use std::time::Duration;

use super::error::{OfflineError, Result};
use super::request::{Request, Response};

/// Something that can perform a request over the network.
///
/// HTTP error statuses are responses, not failures. Only transport problems
/// (unreachable host, timeout, broken body) are reported as errors.
pub trait Network: Send + Sync {
  fn fetch(&self, request: &Request) -> impl Future<Output = Result<Response>> + Send;
}

/// Network access through a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpNetwork {
  client: reqwest::Client,
}

impl HttpNetwork {
  pub fn new(timeout: Duration) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .user_agent(concat!("vitrine/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| OfflineError::network("<client>", e))?;

    Ok(Self { client })
  }
}

impl Network for HttpNetwork {
  async fn fetch(&self, request: &Request) -> Result<Response> {
    let url = request.url.as_str();

    let response = self
      .client
      .request(request.method.clone(), request.url.clone())
      .send()
      .await
      .map_err(|e| OfflineError::network(url, e))?;

    let status = response.status();
    let headers = response
      .headers()
      .iter()
      .filter_map(|(name, value)| {
        value
          .to_str()
          .ok()
          .map(|v| (name.as_str().to_string(), v.to_string()))
      })
      .collect();

    let body = response
      .bytes()
      .await
      .map_err(|e| OfflineError::network(url, e))?;

    Ok(Response {
      status: status.as_u16(),
      status_text: status.canonical_reason().unwrap_or_default().to_string(),
      headers,
      body: body.to_vec(),
    })
  }
}
