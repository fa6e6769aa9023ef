//! An in-memory Adaptive Radix Tree keyed by fixed 6-byte big-endian keys,
//! valued by `u64`.
//!
//! The node layout, path compression, and arena-backed ownership follow
//! `oxidart`'s design (see `arena.rs`, `node.rs`); the key width, node
//! taxonomy (N4/N16/N48/N256), ordered cursor, and zero-copy frozen-view
//! format are this crate's own.

mod arena;
mod config;
mod error;
mod frozen;
mod frozen_format;
mod iter;
mod key;
mod node;
mod node_children;
mod serialize;
mod validate;

use arena::{Arena, NodeId};
use node::{InnerNode, LeafNode, Node, Prefix};
use node_children::ChildSet;

pub use config::ArtConfig;
pub use error::FrozenViewError;
pub use frozen::FrozenArt;
pub use iter::Cursor;
pub use key::{key_from_u48, KeyBytes, KEY_LEN};
pub use validate::{ValidationError, ValidationStats};

/// The tree itself.
pub struct Art {
    arena: Arena,
    root: Option<NodeId>,
    len: usize,
}

impl Default for Art {
    fn default() -> Self {
        Self::new()
    }
}

impl Art {
    pub fn new() -> Self {
        Self::with_config(ArtConfig::default())
    }

    pub fn with_config(config: ArtConfig) -> Self {
        Self {
            arena: Arena::with_capacity(config.initial_node_capacity),
            root: None,
            len: 0,
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn find(&self, key: &KeyBytes) -> Option<u64> {
        let mut current = self.root?;
        let mut depth = 0usize;
        loop {
            match self.arena.get(current) {
                Node::Leaf(leaf) => return (leaf.key == *key).then_some(leaf.value),
                Node::Inner(inner) => {
                    let plen = inner.prefix.len();
                    if depth + plen > KEY_LEN || inner.prefix.as_slice() != &key[depth..depth + plen]
                    {
                        return None;
                    }
                    depth += plen;
                    if depth >= KEY_LEN {
                        return None;
                    }
                    let byte = key[depth];
                    current = inner.children().find(byte)?;
                    depth += 1;
                }
            }
        }
    }

    /// Inserts `key` with `value`, returning the previous value if `key` was
    /// already present.
    pub fn insert(&mut self, key: KeyBytes, value: u64) -> Option<u64> {
        let Some(mut current) = self.root else {
            let id = self.arena.alloc(Node::Leaf(LeafNode { key, value }));
            self.root = Some(id);
            self.len += 1;
            return None;
        };

        let mut depth = 0usize;
        loop {
            match self.arena.get(current) {
                Node::Leaf(leaf) => {
                    if leaf.key == key {
                        let old = leaf.value;
                        self.arena.get_mut(current).as_leaf_mut().value = value;
                        return Some(old);
                    }
                    let leaf_key = leaf.key;
                    let leaf_val = leaf.value;
                    let common = key::common_prefix_len(&leaf_key[depth..], &key[depth..]);

                    let mut prefix: Prefix = Prefix::new();
                    prefix.extend(leaf_key[depth..depth + common].iter().copied());
                    let mut split = InnerNode::new_n4(prefix);

                    let old_leaf_id = self.arena.alloc(Node::Leaf(LeafNode {
                        key: leaf_key,
                        value: leaf_val,
                    }));
                    let new_leaf_id = self.arena.alloc(Node::Leaf(LeafNode { key, value }));
                    split.add_child(leaf_key[depth + common], old_leaf_id);
                    split.add_child(key[depth + common], new_leaf_id);

                    tracing::trace!(depth, common, "split leaf into new N4");
                    *self.arena.get_mut(current) = Node::Inner(split);
                    self.len += 1;
                    return None;
                }
                Node::Inner(inner) => {
                    let plen = inner.prefix.len();
                    let common = key::common_prefix_len(&inner.prefix, &key[depth..depth + plen]);

                    if common < plen {
                        let old_prefix = inner.prefix.clone();
                        let placeholder = InnerNode::new_n4(Prefix::new());
                        let old = std::mem::replace(
                            self.arena.get_mut(current).as_inner_mut(),
                            placeholder,
                        );

                        let mut remainder: Prefix = Prefix::new();
                        remainder.extend(old_prefix[common + 1..].iter().copied());
                        let shifted = InnerNode {
                            prefix: remainder,
                            kind: old.kind,
                        };
                        let shifted_id = self.arena.alloc(Node::Inner(shifted));

                        let new_leaf_id = self.arena.alloc(Node::Leaf(LeafNode { key, value }));

                        let mut split_prefix: Prefix = Prefix::new();
                        split_prefix.extend(old_prefix[..common].iter().copied());
                        let mut split = InnerNode::new_n4(split_prefix);
                        split.add_child(old_prefix[common], shifted_id);
                        split.add_child(key[depth + common], new_leaf_id);

                        tracing::trace!(depth, common, "split inner prefix into new N4");
                        *self.arena.get_mut(current) = Node::Inner(split);
                        self.len += 1;
                        return None;
                    }

                    depth += plen;
                    let byte = key[depth];
                    if let Some(child_id) = inner.children().find(byte) {
                        current = child_id;
                        depth += 1;
                        continue;
                    }

                    let new_leaf_id = self.arena.alloc(Node::Leaf(LeafNode { key, value }));
                    let inner_mut = self.arena.get_mut(current).as_inner_mut();
                    if inner_mut.is_full() {
                        tracing::trace!(depth, "growing inner node on insert");
                    }
                    inner_mut.add_child(byte, new_leaf_id);
                    self.len += 1;
                    return None;
                }
            }
        }
    }

    /// Removes `key`, returning its value if present.
    pub fn erase(&mut self, key: &KeyBytes) -> Option<u64> {
        let mut current = self.root?;
        let mut parent: Option<(NodeId, u8)> = None;
        let mut depth = 0usize;

        loop {
            match self.arena.get(current) {
                Node::Leaf(leaf) => {
                    if leaf.key != *key {
                        return None;
                    }
                    let value = leaf.value;
                    self.arena.dealloc(current);
                    self.len -= 1;

                    let Some((parent_id, edge_byte)) = parent else {
                        self.root = None;
                        return Some(value);
                    };

                    let parent_node = self.arena.get_mut(parent_id).as_inner_mut();
                    parent_node.children_mut().remove(edge_byte);

                    if parent_node.len() == 1 {
                        tracing::trace!("collapsing single-child inner node");
                        self.collapse(parent_id);
                    } else if parent_node.should_shrink() {
                        tracing::trace!("shrinking inner node after erase");
                        parent_node.shrink();
                    }
                    return Some(value);
                }
                Node::Inner(inner) => {
                    let plen = inner.prefix.len();
                    if depth + plen > KEY_LEN || inner.prefix.as_slice() != &key[depth..depth + plen]
                    {
                        return None;
                    }
                    depth += plen;
                    if depth >= KEY_LEN {
                        return None;
                    }
                    let byte = key[depth];
                    let Some(child_id) = inner.children().find(byte) else {
                        return None;
                    };
                    parent = Some((current, byte));
                    current = child_id;
                    depth += 1;
                }
            }
        }
    }

    /// Absorbs `id`'s sole remaining child into `id`'s own arena slot,
    /// preserving the `NodeId` every ancestor still points at. Leaves carry
    /// their full key already, so absorbing one needs no prefix surgery;
    /// absorbing another inner node concatenates `prefix + edge_byte +
    /// child.prefix`.
    fn collapse(&mut self, id: NodeId) {
        let inner = self.arena.get(id).as_inner();
        let (byte, child_id) = inner.children().first().expect("collapse requires one child");
        let parent_prefix = inner.prefix.clone();

        let child = self.arena.dealloc(child_id);
        let merged = match child {
            Node::Leaf(leaf) => Node::Leaf(leaf),
            Node::Inner(mut child_inner) => {
                let mut merged_prefix: Prefix = Prefix::new();
                merged_prefix.extend(parent_prefix.iter().copied());
                merged_prefix.push(byte);
                merged_prefix.extend(child_inner.prefix.iter().copied());
                child_inner.prefix = merged_prefix;
                Node::Inner(child_inner)
            }
        };
        *self.arena.get_mut(id) = merged;
    }

    /// Rebuilds every inner node to the narrowest variant that fits its
    /// current child count, independent of the hysteretic thresholds
    /// `erase` uses in steady state.
    pub fn shrink_to_fit(&mut self) {
        for (_, node) in self.arena.iter_mut() {
            if let Node::Inner(inner) = node {
                loop {
                    let narrower_capacity = match &inner.kind {
                        node::InnerKind::N16(_) => 4,
                        node::InnerKind::N48(_) => 16,
                        node::InnerKind::N256(_) => 48,
                        node::InnerKind::N4(_) => break,
                    };
                    if inner.len() > narrower_capacity {
                        break;
                    }
                    inner.shrink();
                }
            }
        }
    }

    /// Exact number of bytes [`Art::serialize`] will produce for the tree's
    /// current shape. Only meaningful right after [`Art::shrink_to_fit`]: a
    /// node sitting at a wider-than-minimal variant still serializes to that
    /// wider variant's (larger) fixed record size.
    pub fn size_in_bytes(&self) -> usize {
        serialize::size_in_bytes(self)
    }

    pub fn iter(&mut self) -> Cursor<'_> {
        Cursor::new(self)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate::validate(self)
    }

    /// Like [`Art::validate`], but also returns node/leaf counts on success.
    pub fn validate_with_stats(&self) -> Result<ValidationStats, ValidationError> {
        validate::validate_with_stats(self)
    }

    pub fn serialize(&self) -> Vec<u8> {
        serialize::serialize(self)
    }

    pub fn frozen_view(buf: &[u8]) -> Result<FrozenArt<'_>, FrozenViewError> {
        FrozenArt::parse(buf)
    }

    pub(crate) fn arena(&self) -> &Arena {
        &self.arena
    }

    pub(crate) fn root(&self) -> Option<NodeId> {
        self.root
    }
}

impl Node {
    fn as_leaf_mut(&mut self) -> &mut LeafNode {
        match self {
            Node::Leaf(n) => n,
            Node::Inner(_) => panic!("expected a leaf node"),
        }
    }
}

#[cfg(test)]
mod tests;

#[cfg(test)]
mod proptests;
