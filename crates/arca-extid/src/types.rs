use std::fmt;

use serde::{Deserialize, Serialize};

/// A source-internal identifier qualified by its scheme.
///
/// The scheme names how the source derives ids (`git-sha1`, `hg-sha1`, ...);
/// the value is the raw identifier bytes in that scheme. The pair is the
/// lookup key of the [`ExtIdIndex`](crate::ExtIdIndex).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExtId {
    scheme: String,
    value: Vec<u8>,
}

impl ExtId {
    /// Scheme tag for git SHA-1 object names.
    pub const GIT_SHA1: &'static str = "git-sha1";

    pub fn new(scheme: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            scheme: scheme.into(),
            value: value.into(),
        }
    }

    /// Convenience constructor for git SHA-1 identifiers.
    pub fn git_sha1(value: impl Into<Vec<u8>>) -> Self {
        Self::new(Self::GIT_SHA1, value)
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

impl fmt::Display for ExtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme, hex::encode(&self.value))
    }
}
