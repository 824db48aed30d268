pub mod decode;
pub mod failure;
pub mod request;
pub mod retry;
pub mod session;
pub mod snapshots;

#[cfg(test)]
pub(crate) mod market_site;

pub use failure::{FailureKind, FetchError, RetryClass};
pub use retry::retry_with_backoff;
pub use session::{Session, SessionPrimer};
pub use snapshots::{NseSource, SnapshotRetriever, SnapshotSource};

pub type FetchResult<T> = std::result::Result<T, FetchError>;
