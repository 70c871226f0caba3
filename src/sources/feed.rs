//! RSS/Atom feed discovery for Medium and Substack authors.
//!
//! Resolves the author URL to the platform's feed endpoint
//! (`medium.com/feed/@user`, `<name>.substack.com/feed`), fetches and
//! parses the feed, strips HTML from entry bodies, and caps the result
//! at the configured maximum post count.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Url;
use std::time::Duration;

use crate::analysis::Document;
use crate::error::DiscoveryError;
use crate::sources::Discoverer;

/// Discovers an author's posts through their RSS/Atom feed.
pub struct FeedDiscoverer {
    http_client: reqwest::Client,
    /// Maximum number of posts taken from the head of the feed.
    max_posts: usize,
}

impl FeedDiscoverer {
    /// Create a discoverer that keeps at most `max_posts` entries per feed.
    pub fn new(max_posts: usize) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .user_agent(concat!("writerlens/", env!("CARGO_PKG_VERSION")))
                .build()
                .expect("Failed to build HTTP client"),
            max_posts,
        }
    }

    /// Maps an author URL to the platform feed URL.
    ///
    /// Medium profiles live at `medium.com/@user` or `user.medium.com`;
    /// both resolve to `https://medium.com/feed/@user`. Substack blogs
    /// expose their feed at `<base>/feed`. Anything else is unsupported.
    fn resolve_feed_url(source: &str) -> Result<String, DiscoveryError> {
        let url = Url::parse(source).map_err(|e| DiscoveryError::ParseFailed {
            url: source.to_string(),
            reason: e.to_string(),
        })?;

        let host = url
            .host_str()
            .ok_or_else(|| DiscoveryError::UnsupportedSource(source.to_string()))?;

        if host == "medium.com" || host.ends_with(".medium.com") {
            let username = if host == "medium.com" {
                url.path_segments()
                    .and_then(|mut segments| segments.next())
                    .unwrap_or_default()
                    .trim_start_matches('@')
                    .to_string()
            } else {
                let mut parts = host.split('.');
                let first = parts.next().unwrap_or_default();
                if first == "www" {
                    parts.next().unwrap_or_default().to_string()
                } else {
                    first.to_string()
                }
            };

            if username.is_empty() {
                return Err(DiscoveryError::UnsupportedSource(source.to_string()));
            }

            Ok(format!("https://medium.com/feed/@{}", username))
        } else if host.ends_with(".substack.com") {
            Ok(format!("https://{}/feed", host))
        } else {
            Err(DiscoveryError::UnsupportedSource(host.to_string()))
        }
    }

    /// Strips HTML tags from a feed entry body, joining text nodes with
    /// spaces and collapsing runs of whitespace.
    fn strip_html(html: &str) -> String {
        let fragment = scraper::Html::parse_fragment(html);
        let text: Vec<&str> = fragment.root_element().text().collect();
        text.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Converts one feed entry into a [`Document`], or `None` when the
    /// entry carries no usable body.
    fn entry_to_document(entry: feed_rs::model::Entry) -> Option<Document> {
        let title = entry
            .title
            .as_ref()
            .map(|t| t.content.clone())
            .unwrap_or_else(|| "Untitled".to_string());

        let url = entry
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default();

        let body = entry
            .content
            .as_ref()
            .and_then(|c| c.body.clone())
            .or_else(|| entry.summary.as_ref().map(|s| s.content.clone()))?;

        let text = Self::strip_html(&body);
        if text.is_empty() {
            return None;
        }

        let published: Option<DateTime<Utc>> = entry.published.or(entry.updated);

        let id = if entry.id.is_empty() {
            url.clone()
        } else {
            entry.id
        };

        Some(Document {
            id,
            title,
            url,
            text,
            published,
        })
    }
}

#[async_trait]
impl Discoverer for FeedDiscoverer {
    async fn discover(&self, source: &str) -> Result<Vec<Document>, DiscoveryError> {
        let feed_url = Self::resolve_feed_url(source)?;

        tracing::info!(source = %source, feed_url = %feed_url, "Fetching author feed");

        let response = self
            .http_client
            .get(&feed_url)
            .send()
            .await
            .map_err(|e| DiscoveryError::FetchFailed {
                url: feed_url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::HttpStatus {
                url: feed_url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DiscoveryError::FetchFailed {
                url: feed_url.clone(),
                reason: e.to_string(),
            })?;

        let feed = feed_rs::parser::parse(body.as_ref()).map_err(|e| {
            DiscoveryError::ParseFailed {
                url: feed_url.clone(),
                reason: e.to_string(),
            }
        })?;

        let documents: Vec<Document> = feed
            .entries
            .into_iter()
            .take(self.max_posts)
            .filter_map(Self::entry_to_document)
            .collect();

        tracing::info!(
            feed_url = %feed_url,
            documents = documents.len(),
            "Feed discovery complete"
        );

        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_medium_profile_url() {
        let feed = FeedDiscoverer::resolve_feed_url("https://medium.com/@janedoe").unwrap();
        assert_eq!(feed, "https://medium.com/feed/@janedoe");
    }

    #[test]
    fn test_resolve_medium_profile_without_at() {
        let feed = FeedDiscoverer::resolve_feed_url("https://medium.com/janedoe").unwrap();
        assert_eq!(feed, "https://medium.com/feed/@janedoe");
    }

    #[test]
    fn test_resolve_medium_subdomain() {
        let feed = FeedDiscoverer::resolve_feed_url("https://janedoe.medium.com/").unwrap();
        assert_eq!(feed, "https://medium.com/feed/@janedoe");
    }

    #[test]
    fn test_resolve_substack() {
        let feed = FeedDiscoverer::resolve_feed_url("https://letters.substack.com").unwrap();
        assert_eq!(feed, "https://letters.substack.com/feed");
    }

    #[test]
    fn test_unsupported_host_rejected() {
        let err = FeedDiscoverer::resolve_feed_url("https://example.com/blog").unwrap_err();
        assert!(matches!(err, DiscoveryError::UnsupportedSource(_)));
    }

    #[test]
    fn test_medium_root_without_username_rejected() {
        let err = FeedDiscoverer::resolve_feed_url("https://medium.com/").unwrap_err();
        assert!(matches!(err, DiscoveryError::UnsupportedSource(_)));
    }

    #[test]
    fn test_strip_html() {
        let text = FeedDiscoverer::strip_html("<p>Hello <b>world</b></p>\n<p>again</p>");
        assert_eq!(text, "Hello world again");
    }

    #[test]
    fn test_rss_feed_parsing_caps_entries() {
        let mut items = String::new();
        for i in 0..15 {
            items.push_str(&format!(
                "<item><title>Post {i}</title><link>https://x.substack.com/p/{i}</link>\
                 <description>&lt;p&gt;Body {i}&lt;/p&gt;</description></item>"
            ));
        }
        let rss = format!(
            "<?xml version=\"1.0\"?><rss version=\"2.0\"><channel><title>X</title>{items}</channel></rss>"
        );

        let feed = feed_rs::parser::parse(rss.as_bytes()).unwrap();
        let documents: Vec<Document> = feed
            .entries
            .into_iter()
            .take(10)
            .filter_map(FeedDiscoverer::entry_to_document)
            .collect();

        assert_eq!(documents.len(), 10);
        assert_eq!(documents[0].title, "Post 0");
        assert_eq!(documents[0].text, "Body 0");
    }
}
