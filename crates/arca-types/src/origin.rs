use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The logical source repository being archived.
///
/// An origin is identified by its URL (or local path). Snapshots are keyed
/// by origin, so two loads of the same URL share history while forks under
/// different URLs get independent snapshot chains (their objects still
/// deduplicate through content addressing).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Origin {
    url: String,
}

impl Origin {
    /// Create an origin from a URL or path string.
    pub fn new(url: impl Into<String>) -> Result<Self, TypeError> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(TypeError::InvalidOrigin("empty url".to_string()));
        }
        Ok(Self { url })
    }

    /// The origin's URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_origin() {
        let origin = Origin::new("https://example.org/repo.git").unwrap();
        assert_eq!(origin.url(), "https://example.org/repo.git");
    }

    #[test]
    fn empty_origin_is_rejected() {
        assert!(matches!(Origin::new("  "), Err(TypeError::InvalidOrigin(_))));
    }

    #[test]
    fn origins_compare_by_url() {
        let a = Origin::new("file:///a").unwrap();
        let b = Origin::new("file:///a").unwrap();
        assert_eq!(a, b);
    }
}
