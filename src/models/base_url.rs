//! Base URLs that object keys are appended to.

use crate::models::ObjectKey;
use std::fmt;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum InvalidBaseUrl {
    #[error("not a valid url: {0}")]
    Parse(#[from] url::ParseError),
    #[error("url cannot carry a path")]
    NotHierarchical,
    #[error("url must not carry a query")]
    HasQuery,
    #[error("url must not carry a fragment")]
    HasFragment,
}

/// An absolute URL with a hierarchical path and nothing after it, so key
/// segments can always be pushed onto its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(Url);

impl BaseUrl {
    pub fn parse(raw: &str) -> Result<Self, InvalidBaseUrl> {
        let url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(InvalidBaseUrl::NotHierarchical);
        }
        if url.query().is_some() {
            return Err(InvalidBaseUrl::HasQuery);
        }
        if url.fragment().is_some() {
            return Err(InvalidBaseUrl::HasFragment);
        }
        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The base with every key segment appended and percent-encoded. A
    /// trailing slash on the base does not produce an empty segment.
    pub fn join_key(&self, key: &ObjectKey) -> Url {
        let mut url = self.0.clone();
        // `parse` refused cannot-be-a-base urls, so this always succeeds.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(key.segments());
        }
        url
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join(base: &str, key: &str) -> String {
        BaseUrl::parse(base)
            .unwrap()
            .join_key(&ObjectKey::parse(key).unwrap())
            .into()
    }

    #[test]
    fn joins_with_a_single_separator() {
        assert_eq!(
            join("http://localhost:3000/public", "user-files/sample.txt"),
            "http://localhost:3000/public/user-files/sample.txt"
        );
        assert_eq!(
            join("http://localhost:3000/public/", "user-files/sample.txt"),
            "http://localhost:3000/public/user-files/sample.txt"
        );
        assert_eq!(
            join("https://files.example.com", "a.txt"),
            "https://files.example.com/a.txt"
        );
    }

    #[test]
    fn segments_are_percent_encoded() {
        assert_eq!(
            join("http://cdn.example.com/files", "photos/summer 2025/ü?.jpg"),
            "http://cdn.example.com/files/photos/summer%202025/%C3%BC%3F.jpg"
        );
        assert_eq!(
            join("http://cdn.example.com", "100%.txt"),
            "http://cdn.example.com/100%25.txt"
        );
    }

    #[test]
    fn rejects_bases_that_cannot_take_a_key() {
        assert!(matches!(
            BaseUrl::parse("/private"),
            Err(InvalidBaseUrl::Parse(_))
        ));
        assert!(matches!(
            BaseUrl::parse("mailto:files@example.com"),
            Err(InvalidBaseUrl::NotHierarchical)
        ));
        assert!(matches!(
            BaseUrl::parse("http://h:3000/private?tenant=a"),
            Err(InvalidBaseUrl::HasQuery)
        ));
        assert!(matches!(
            BaseUrl::parse("http://h:3000/private#top"),
            Err(InvalidBaseUrl::HasFragment)
        ));
    }
}
