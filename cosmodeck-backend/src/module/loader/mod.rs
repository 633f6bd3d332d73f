///! Resource loading: fetch, retry, fall back
///!
///! - `Fetcher`: one HTTP GET returning JSON, typed errors
///! - `FallbackTable`: static / generated substitutes per resource key
///! - `Loader`: retry policy, fallback selection and concurrent batches

mod error;
mod fallback;
mod fetcher;
mod request;
mod resilient;
mod result;

pub use error::ErrorKind;
pub use fallback::{FallbackContext, FallbackEntry, FallbackProvider, FallbackTable, FallbackTableBuilder};
pub use fetcher::{Fetcher, HttpFetcher, OfflineFetcher};
pub use request::{DEFAULT_RETRIES, DEFAULT_TIMEOUT_MS, Endpoint, ResourceRequest};
pub use resilient::{Backoff, Batch, Loader};
pub use result::{DataSource, ResourceResult};
