//! Offline shell cache: named disk caches plus the request-routing worker.

pub mod store;
pub mod worker;

pub use store::{Cache, CacheStorage, CachedBody};
pub use worker::{CacheWorker, FetchRequest, FetchResponse, RequestMode, ResponseSource, CACHE_NAME, SHELL_ASSETS};
