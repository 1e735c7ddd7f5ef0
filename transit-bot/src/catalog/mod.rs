//! Transit stop catalogs.
//!
//! One immutable [`Catalog`] per transport mode, built from provider feeds
//! at start-up and rebuilt daily. The [`CatalogRegistry`] publishes each
//! rebuild with a single pointer swap; a failed fetch leaves the previous
//! catalog in place.

mod build;
mod cache;
mod client;
mod error;
mod feeds;
mod raw;
mod registry;

pub use build::{BuildRules, Catalog, Stop};
pub use cache::{CatalogCache, CatalogCacheConfig};
pub use client::{CatalogClient, CatalogClientConfig};
pub use error::CatalogError;
pub use feeds::parse_feed;
pub use raw::RawStop;
pub use registry::{CatalogLoader, CatalogRegistry, FeedSource};
