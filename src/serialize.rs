//! Writer half of the frozen-view format (§4.5); the reader half lives in
//! [`crate::frozen`]. Node records are laid out in pre-order (root first,
//! children in ascending key-byte order) starting right after the 32-byte
//! header.
//!
//! Every record is a fixed multiple of 8 bytes (see [`crate::frozen_format`]
//! for the exact sizes), so computing the layout is a single pass: each
//! node's offset is the running total at the moment it's visited, and that
//! total only ever grows by a record's own size. A second pass (inside
//! [`serialize`]) re-walks the same order to fill in each record's bytes,
//! looking up child offsets in the map the first pass built.

use std::collections::HashMap;

use bytemuck::bytes_of;

use crate::arena::{Arena, NodeId};
use crate::frozen_format::*;
use crate::node::{InnerKind, Node};
use crate::Art;

struct Layout {
    order: Vec<NodeId>,
    offsets: HashMap<NodeId, u64>,
    total_len: u64,
    leaf_count: u32,
    node_count: u32,
}

fn record_len(node: &Node) -> u64 {
    match node {
        Node::Leaf(_) => LEAF_RECORD_LEN as u64,
        Node::Inner(inner) => match &inner.kind {
            InnerKind::N4(_) => N4_RECORD_LEN as u64,
            InnerKind::N16(_) => N16_RECORD_LEN as u64,
            InnerKind::N48(_) => N48_RECORD_LEN as u64,
            InnerKind::N256(_) => N256_RECORD_LEN as u64,
        },
    }
}

fn build_layout(tree: &Art) -> Layout {
    let mut layout = Layout {
        order: Vec::new(),
        offsets: HashMap::new(),
        total_len: HEADER_LEN as u64,
        leaf_count: 0,
        node_count: 0,
    };
    if let Some(root) = tree.root() {
        walk(tree.arena(), root, &mut layout);
    }
    layout
}

fn walk(arena: &Arena, id: NodeId, layout: &mut Layout) {
    let node = arena.get(id);
    layout.offsets.insert(id, layout.total_len);
    layout.order.push(id);
    layout.node_count += 1;
    layout.total_len += record_len(node);

    match node {
        Node::Leaf(_) => layout.leaf_count += 1,
        Node::Inner(inner) => {
            for (_, child_id) in inner.children().iter() {
                walk(arena, child_id, layout);
            }
        }
    }
}

/// Exact number of bytes [`serialize`] will write for `tree` in its current
/// shape. Only accurate immediately after `shrink_to_fit`, as the spec
/// requires — a node still at a wider-than-minimal variant serializes to
/// that variant's (larger) record size.
pub(crate) fn size_in_bytes(tree: &Art) -> usize {
    build_layout(tree).total_len as usize
}

pub(crate) fn serialize(tree: &Art) -> Vec<u8> {
    let layout = build_layout(tree);
    let mut buf = vec![0u8; layout.total_len as usize];

    let header = Header {
        magic: MAGIC,
        version: FORMAT_VERSION,
        _pad: 0,
        leaf_count: layout.leaf_count,
        node_count: layout.node_count,
        root_offset: tree.root().map_or(0, |r| layout.offsets[&r]),
        total_len: layout.total_len,
    };
    buf[..HEADER_LEN].copy_from_slice(bytes_of(&header));

    for &id in &layout.order {
        let offset = layout.offsets[&id] as usize;
        match tree.arena().get(id) {
            Node::Leaf(leaf) => {
                let record = LeafRecord {
                    tag: TAG_LEAF,
                    _pad: [0; 4],
                    value: leaf.value,
                    key: leaf.key,
                    _pad2: [0; 2],
                };
                buf[offset..offset + LEAF_RECORD_LEN].copy_from_slice(bytes_of(&record));
            }
            Node::Inner(inner) => {
                let mut prefix = [0u8; crate::key::KEY_LEN];
                prefix[..inner.prefix.len()].copy_from_slice(&inner.prefix);
                let inner_header = InnerHeader {
                    tag: 0, // overwritten per-variant below
                    prefix_len: inner.prefix.len() as u8,
                    prefix,
                    _pad: 0,
                    child_count: inner.len() as u16,
                    _pad2: [0; 2],
                };
                write_inner(&mut buf, offset, inner_header, &inner.kind, &layout.offsets);
            }
        }
    }

    buf
}

fn write_inner(
    buf: &mut [u8],
    offset: usize,
    mut header: InnerHeader,
    kind: &InnerKind,
    offsets: &HashMap<NodeId, u64>,
) {
    match kind {
        InnerKind::N4(n) => {
            header.tag = TAG_N4;
            let mut keys = [0u8; 4];
            let mut child_offsets = [0u64; 4];
            let src_keys = n.sorted_entries();
            keys[..src_keys.len()].copy_from_slice(src_keys);
            for (i, id) in n.children_in_order().iter().enumerate() {
                child_offsets[i] = offsets[id];
            }
            let record = N4Record {
                header,
                keys,
                _pad: [0; 4],
                offsets: child_offsets,
            };
            buf[offset..offset + N4_RECORD_LEN].copy_from_slice(bytes_of(&record));
        }
        InnerKind::N16(n) => {
            header.tag = TAG_N16;
            let mut keys = [0u8; 16];
            let mut child_offsets = [0u64; 16];
            let src_keys = n.sorted_entries();
            keys[..src_keys.len()].copy_from_slice(src_keys);
            for (i, id) in n.children_in_order().iter().enumerate() {
                child_offsets[i] = offsets[id];
            }
            let record = N16Record {
                header,
                keys,
                offsets: child_offsets,
            };
            buf[offset..offset + N16_RECORD_LEN].copy_from_slice(bytes_of(&record));
        }
        InnerKind::N48(n) => {
            header.tag = TAG_N48;
            let mut child_offsets = [0u64; 48];
            for (i, id) in n.children_by_slot().iter().enumerate() {
                child_offsets[i] = offsets[id];
            }
            let record = N48Record {
                header,
                child_index: *n.child_index(),
                offsets: child_offsets,
            };
            buf[offset..offset + N48_RECORD_LEN].copy_from_slice(bytes_of(&record));
        }
        InnerKind::N256(n) => {
            header.tag = TAG_N256;
            let mut child_offsets = [0u64; 256];
            for (b, slot) in n.children_by_byte().iter().enumerate() {
                if let Some(id) = slot {
                    child_offsets[b] = offsets[id];
                }
            }
            let record = N256Record {
                header,
                offsets: child_offsets,
            };
            buf[offset..offset + N256_RECORD_LEN].copy_from_slice(bytes_of(&record));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::key_from_u48;

    #[test]
    fn empty_tree_serializes_to_header_only() {
        let tree = Art::new();
        assert_eq!(size_in_bytes(&tree), HEADER_LEN);
        let buf = serialize(&tree);
        assert_eq!(buf.len(), HEADER_LEN);
    }

    #[test]
    fn size_in_bytes_matches_serialize_len() {
        let mut tree = Art::new();
        for k in 0..300u64 {
            tree.insert(key_from_u48(k), k * 2);
        }
        tree.shrink_to_fit();
        assert_eq!(size_in_bytes(&tree), serialize(&tree).len());
    }
}
