//! Offline worker: routes site requests between the network and a
//! generational response cache.
//!
//! This module provides:
//! - Cache-first answers for static assets (scripts, styles, images, fonts)
//! - Network-first answers for documents and data, with cache fallback
//! - All-or-nothing precaching of a fixed manifest on install
//! - Purging of superseded cache generations on activate

mod classify;
mod error;
mod network;
mod request;
mod router;
mod storage;

pub use error::OfflineError;
pub use network::{HttpNetwork, Network};
pub use request::{Destination, Method, Request, Response};
pub use router::{generation_name, CacheRouter, ControlMessage, Routed, RouterOptions};
pub use storage::{CacheStorage, SqliteStorage};
