//! Tree configuration.

/// Controls arena preallocation. There is no other behavior in this crate
/// that a caller can usefully tune — the arena always grows on demand
/// regardless of what it started at.
#[derive(Clone, Copy, Debug)]
pub struct ArtConfig {
    /// Number of node slots to preallocate in the arena, mirroring the
    /// teacher's own `Slab::with_capacity(1024)` starting point.
    pub initial_node_capacity: usize,
}

impl Default for ArtConfig {
    fn default() -> Self {
        Self {
            initial_node_capacity: 1024,
        }
    }
}
