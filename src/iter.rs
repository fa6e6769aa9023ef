//! Ordered cursor over the tree.
//!
//! A single `Cursor` type borrows the tree mutably for its whole lifetime
//! and supports both read-only seeking/stepping and mutation through the
//! cursor's current position, the way `std::collections::BTreeMap`'s
//! `CursorMut` does — the natural single surface for the read and write
//! operations this module specifies, rather than splitting into separate
//! read and write cursor types.
//!
//! The path from the root down to (but not including) the current leaf is
//! kept on a fixed-depth stack instead of a heap-allocated `Vec`: a node's
//! incoming edge consumes at least one key byte, so the chain of inner
//! ancestors above any leaf can never exceed `KEY_LEN` frames.

use arrayvec::ArrayVec;

use crate::arena::{Arena, NodeId};
use crate::key::{KeyBytes, KEY_LEN};
use crate::node::Node;
use crate::node_children::ChildSet;
use crate::Art;

type Stack = ArrayVec<(NodeId, u8), KEY_LEN>;

pub struct Cursor<'a> {
    tree: &'a mut Art,
    stack: Stack,
    current: Option<NodeId>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(tree: &'a mut Art) -> Self {
        Self {
            tree,
            stack: ArrayVec::new(),
            current: None,
        }
    }

    /// The key/value pair the cursor currently sits on, if any.
    pub fn current(&self) -> Option<(KeyBytes, u64)> {
        self.current.map(|id| {
            let leaf = self.tree.arena().get(id).as_leaf();
            (leaf.key, leaf.value)
        })
    }

    pub fn seek_to_first(&mut self) -> Option<(KeyBytes, u64)> {
        self.stack.clear();
        self.current = self
            .tree
            .root()
            .map(|root| descend_leftmost(self.tree.arena(), &mut self.stack, root));
        self.current()
    }

    pub fn seek_to_last(&mut self) -> Option<(KeyBytes, u64)> {
        self.stack.clear();
        self.current = self
            .tree
            .root()
            .map(|root| descend_rightmost(self.tree.arena(), &mut self.stack, root));
        self.current()
    }

    /// Moves to the least key greater than or equal to `key`.
    pub fn lower_bound(&mut self, key: &KeyBytes) -> Option<(KeyBytes, u64)> {
        self.stack.clear();
        self.current = self
            .tree
            .root()
            .and_then(|root| seek(self.tree.arena(), &mut self.stack, root, key, 0, false));
        self.current()
    }

    /// Moves to the least key strictly greater than `key`.
    pub fn upper_bound(&mut self, key: &KeyBytes) -> Option<(KeyBytes, u64)> {
        self.stack.clear();
        self.current = self
            .tree
            .root()
            .and_then(|root| seek(self.tree.arena(), &mut self.stack, root, key, 0, true));
        self.current()
    }

    pub fn next(&mut self) -> Option<(KeyBytes, u64)> {
        if self.current.is_none() {
            return self.seek_to_first();
        }
        self.current = next_leaf_after(self.tree.arena(), &mut self.stack);
        self.current()
    }

    pub fn prev(&mut self) -> Option<(KeyBytes, u64)> {
        if self.current.is_none() {
            return self.seek_to_last();
        }
        self.current = prev_leaf_before(self.tree.arena(), &mut self.stack);
        self.current()
    }

    /// Inserts `key`/`value` and repositions the cursor onto it.
    pub fn insert_here(&mut self, key: KeyBytes, value: u64) -> Option<u64> {
        let old = self.tree.insert(key, value);
        self.lower_bound(&key);
        old
    }

    /// Removes the key/value pair the cursor currently sits on, leaving the
    /// cursor positioned on the key that followed it (or past-the-end if
    /// there was none).
    pub fn erase_here(&mut self) -> Option<u64> {
        let current_id = self.current?;
        let key = self.tree.arena().get(current_id).as_leaf().key;

        let successor_key = {
            let mut probe = self.stack.clone();
            next_leaf_after(self.tree.arena(), &mut probe)
                .map(|id| self.tree.arena().get(id).as_leaf().key)
        };

        let removed = self.tree.erase(&key);
        match successor_key {
            Some(k) => {
                self.lower_bound(&k);
            }
            None => {
                self.stack.clear();
                self.current = None;
            }
        }
        removed
    }
}

fn descend_leftmost(arena: &Arena, stack: &mut Stack, mut id: NodeId) -> NodeId {
    loop {
        match arena.get(id) {
            Node::Leaf(_) => return id,
            Node::Inner(inner) => {
                let (byte, child) = inner.children().first().expect("inner node has a child");
                stack.push((id, byte));
                id = child;
            }
        }
    }
}

fn descend_rightmost(arena: &Arena, stack: &mut Stack, mut id: NodeId) -> NodeId {
    loop {
        match arena.get(id) {
            Node::Leaf(_) => return id,
            Node::Inner(inner) => {
                let (byte, child) = inner.children().last().expect("inner node has a child");
                stack.push((id, byte));
                id = child;
            }
        }
    }
}

fn next_leaf_after(arena: &Arena, stack: &mut Stack) -> Option<NodeId> {
    loop {
        let (anc_id, byte) = stack.pop()?;
        let anc = arena.get(anc_id).as_inner();
        if let Some((next_byte, next_child)) = anc.children().next(byte) {
            stack.push((anc_id, next_byte));
            return Some(descend_leftmost(arena, stack, next_child));
        }
    }
}

fn prev_leaf_before(arena: &Arena, stack: &mut Stack) -> Option<NodeId> {
    loop {
        let (anc_id, byte) = stack.pop()?;
        let anc = arena.get(anc_id).as_inner();
        if let Some((prev_byte, prev_child)) = anc.children().prev(byte) {
            stack.push((anc_id, prev_byte));
            return Some(descend_rightmost(arena, stack, prev_child));
        }
    }
}

/// Recursive seek for `lower_bound`/`upper_bound`. Kept as a free function
/// rather than a `Cursor` method: a method would need `&mut self` to push
/// onto `self.stack` across the recursive call while also holding a node
/// reference borrowed out of `self.tree`'s arena (`&self.tree.arena`) for
/// the duration of that same call — the two borrows can't coexist without
/// restructuring, since Rust cannot see that the two `self` fields involved
/// don't alias. A free function taking the arena and stack as separate
/// parameters borrows each independently and has no such conflict.
///
/// `depth` is how many bytes of `key` have already been consumed by the
/// edges above `id`. Returns the least leaf in the subtree rooted at `id`
/// whose key is `>= key` (`strict = false`) or `> key` (`strict = true`).
fn seek(
    arena: &Arena,
    stack: &mut Stack,
    id: NodeId,
    key: &KeyBytes,
    depth: usize,
    strict: bool,
) -> Option<NodeId> {
    match arena.get(id) {
        Node::Leaf(leaf) => {
            let ok = if strict { leaf.key > *key } else { leaf.key >= *key };
            ok.then_some(id)
        }
        Node::Inner(inner) => {
            let plen = inner.prefix.len();
            if depth + plen > KEY_LEN {
                return None;
            }
            match inner.prefix.as_slice().cmp(&key[depth..depth + plen]) {
                std::cmp::Ordering::Less => None,
                std::cmp::Ordering::Greater => Some(descend_leftmost(arena, stack, id)),
                std::cmp::Ordering::Equal => {
                    let depth = depth + plen;
                    if depth >= KEY_LEN {
                        return None;
                    }
                    let byte = key[depth];
                    if let Some(child) = inner.children().find(byte) {
                        stack.push((id, byte));
                        if let Some(found) = seek(arena, stack, child, key, depth + 1, strict) {
                            return Some(found);
                        }
                        stack.pop();
                    }
                    if let Some((next_byte, next_child)) = inner.children().next(byte) {
                        stack.push((id, next_byte));
                        return Some(descend_leftmost(arena, stack, next_child));
                    }
                    None
                }
            }
        }
    }
}
