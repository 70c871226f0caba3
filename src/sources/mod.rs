//! Document discovery.
//!
//! Resolves an author URL to the set of posts to analyze. The default
//! implementation fetches the author's RSS/Atom feed; tests substitute
//! their own [`Discoverer`].

mod feed;

use async_trait::async_trait;

use crate::analysis::Document;
use crate::error::DiscoveryError;

pub use feed::FeedDiscoverer;

/// Resolves a source URL to the documents it contains.
#[async_trait]
pub trait Discoverer: Send + Sync {
    /// Discover the documents published at `source`.
    ///
    /// An empty result is valid from the discoverer's point of view;
    /// the pipeline decides what an empty job means.
    async fn discover(&self, source: &str) -> Result<Vec<Document>, DiscoveryError>;
}
