//! Which caching strategy a request gets.

use super::request::{Destination, Request};

/// Resource class of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceClass {
  /// Scripts, stylesheets, images and fonts: cache-first.
  StaticAsset,
  /// Documents, API calls and anything unrecognized: network-first.
  Other,
}

/// File extensions served cache-first, lowercase.
const STATIC_EXTENSIONS: &[&str] = &[
  "js", "mjs", "css", // scripts, styles
  "svg", "png", "jpg", "jpeg", "gif", "webp", "avif", "ico", // images
  "woff", "woff2", "ttf", "otf", // fonts
];

/// Classify by declared destination first, then by the extension of the last
/// path segment. Query strings and fragments never affect the result.
pub fn classify(request: &Request) -> ResourceClass {
  match request.destination {
    Destination::Script | Destination::Style | Destination::Image | Destination::Font => {
      return ResourceClass::StaticAsset;
    }
    Destination::Document | Destination::Other => {}
  }

  match extension(request.url.path()) {
    Some(ext) if STATIC_EXTENSIONS.contains(&ext.as_str()) => ResourceClass::StaticAsset,
    _ => ResourceClass::Other,
  }
}

fn extension(path: &str) -> Option<String> {
  let segment = path.rsplit('/').next()?;
  let (stem, ext) = segment.rsplit_once('.')?;
  if stem.is_empty() || ext.is_empty() {
    return None;
  }
  Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
  use super::*;
  use url::Url;

  fn get(path: &str) -> Request {
    Request::get(Url::parse("https://site.test").unwrap().join(path).unwrap())
  }

  #[test]
  fn test_static_extensions() {
    for path in [
      "/main.js",
      "/styles.css",
      "/img/logo.svg",
      "/img/hero.PNG",
      "/img/photo.jpeg",
      "/fonts/inter.woff2",
      "/fonts/inter.woff",
      "/img/card.webp?v=3",
    ] {
      assert_eq!(classify(&get(path)), ResourceClass::StaticAsset, "{}", path);
    }
  }

  #[test]
  fn test_documents_and_data_are_other() {
    for path in [
      "/",
      "/index.html",
      "/manifest.json",
      "/api/contact",
      "/blog/post.js/comments",
      "/.css",
    ] {
      assert_eq!(classify(&get(path)), ResourceClass::Other, "{}", path);
    }
  }

  #[test]
  fn test_destination_overrides_extension() {
    let request = get("/api/font").with_destination(Destination::Font);
    assert_eq!(classify(&request), ResourceClass::StaticAsset);

    let request = get("/index.html").with_destination(Destination::Document);
    assert_eq!(classify(&request), ResourceClass::Other);
  }

  #[test]
  fn test_fragment_is_ignored() {
    assert_eq!(classify(&get("/index.html#app.js")), ResourceClass::Other);
  }
}
