use serde::{Deserialize, Serialize};

/// Tuning knobs for one load session.
///
/// Defaults are sized for a remote archival backend where each round-trip
/// costs far more than the marginal id or object.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// How many pending ids accumulate before a batched existence check is
    /// issued against the object store.
    pub check_batch_size: usize,
    /// A kind's buffer is flushed once it holds this many objects.
    pub flush_max_objects: usize,
    /// A kind's buffer is flushed once it holds this many payload bytes,
    /// whichever threshold trips first.
    pub flush_max_bytes: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            check_batch_size: 1_000,
            flush_max_objects: 1_000,
            flush_max_bytes: 32 * 1024 * 1024,
        }
    }
}
