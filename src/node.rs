//! Node representation: leaves and the four inner-node variants.
//!
//! Grounded in `oxidart`'s `Node{compression, val, childs}` — a single node
//! type carrying an optional value alongside its children. This tree keeps
//! the teacher's two-case split (does this node end a key or not), but
//! expressed as a proper `Leaf`/`Inner` enum rather than an `Option<Bytes>`
//! field, since an inner node here never also carries a value (§3 invariant
//! 2: values only terminate at leaves).

use arrayvec::ArrayVec;

use crate::key::{KeyBytes, KEY_LEN};
use crate::node_children::{ChildSet, N16Node, N256Node, N48Node, N4Node};

/// The path-compressed byte run a node's incoming edge skips over.
/// Bounded by `KEY_LEN` since a prefix can never exceed the remaining key.
pub(crate) type Prefix = ArrayVec<u8, KEY_LEN>;

pub(crate) enum Node {
    Leaf(LeafNode),
    Inner(InnerNode),
}

impl Node {
    pub(crate) fn as_inner(&self) -> &InnerNode {
        match self {
            Node::Inner(n) => n,
            Node::Leaf(_) => panic!("expected an inner node"),
        }
    }

    pub(crate) fn as_inner_mut(&mut self) -> &mut InnerNode {
        match self {
            Node::Inner(n) => n,
            Node::Leaf(_) => panic!("expected an inner node"),
        }
    }

    pub(crate) fn as_leaf(&self) -> &LeafNode {
        match self {
            Node::Leaf(n) => n,
            Node::Inner(_) => panic!("expected a leaf node"),
        }
    }
}

/// A leaf always carries the full key, not just the suffix past its parent's
/// prefix — matching `spec.md`'s choice to make leaf/query comparisons a
/// plain array comparison rather than incremental path reconstruction.
pub(crate) struct LeafNode {
    pub(crate) key: KeyBytes,
    pub(crate) value: u64,
}

pub(crate) struct InnerNode {
    pub(crate) prefix: Prefix,
    pub(crate) kind: InnerKind,
}

pub(crate) enum InnerKind {
    N4(N4Node),
    N16(N16Node),
    N48(N48Node),
    N256(N256Node),
}

impl InnerNode {
    pub(crate) fn new_n4(prefix: Prefix) -> Self {
        Self {
            prefix,
            kind: InnerKind::N4(N4Node::default()),
        }
    }

    pub(crate) fn children(&self) -> &dyn ChildSet {
        match &self.kind {
            InnerKind::N4(n) => n,
            InnerKind::N16(n) => n,
            InnerKind::N48(n) => n,
            InnerKind::N256(n) => n,
        }
    }

    pub(crate) fn children_mut(&mut self) -> &mut dyn ChildSet {
        match &mut self.kind {
            InnerKind::N4(n) => n,
            InnerKind::N16(n) => n,
            InnerKind::N48(n) => n,
            InnerKind::N256(n) => n,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.children().len()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.children().is_full()
    }

    /// `N16→N4` at count ≤ 3, `N48→N16` at count ≤ 12, `N256→N48` at count ≤
    /// 37 — the literal thresholds spec.md §4.1 gives, used in place of the
    /// more common 4/16/48 seen elsewhere in this pack (see DESIGN.md).
    pub(crate) fn should_shrink(&self) -> bool {
        match &self.kind {
            InnerKind::N4(_) => false,
            InnerKind::N16(n) => n.len() <= 3,
            InnerKind::N48(n) => n.len() <= 12,
            InnerKind::N256(n) => n.len() <= 37,
        }
    }

    /// Promotes to the next wider variant, preserving every existing child.
    /// Called when `add` would otherwise overflow the current capacity.
    pub(crate) fn grow(&mut self) {
        let entries = self.children().iter();
        self.kind = match &self.kind {
            InnerKind::N4(_) => {
                let mut n = N16Node::default();
                for (b, id) in entries {
                    n.add(b, id);
                }
                InnerKind::N16(n)
            }
            InnerKind::N16(_) => {
                let mut n = N48Node::default();
                for (b, id) in entries {
                    n.add(b, id);
                }
                InnerKind::N48(n)
            }
            InnerKind::N48(_) => {
                let mut n = N256Node::default();
                for (b, id) in entries {
                    n.add(b, id);
                }
                InnerKind::N256(n)
            }
            InnerKind::N256(_) => unreachable!("N256 is the widest variant"),
        };
    }

    /// Demotes to the next narrower variant, preserving every existing child.
    /// Called once `should_shrink` holds.
    pub(crate) fn shrink(&mut self) {
        let entries = self.children().iter();
        self.kind = match &self.kind {
            InnerKind::N256(_) => {
                let mut n = N48Node::default();
                for (b, id) in entries {
                    n.add(b, id);
                }
                InnerKind::N48(n)
            }
            InnerKind::N48(_) => {
                let mut n = N16Node::default();
                for (b, id) in entries {
                    n.add(b, id);
                }
                InnerKind::N16(n)
            }
            InnerKind::N16(_) => {
                let mut n = N4Node::default();
                for (b, id) in entries {
                    n.add(b, id);
                }
                InnerKind::N4(n)
            }
            InnerKind::N4(_) => unreachable!("N4 is the narrowest variant"),
        };
    }

    /// Adds a child, growing the node first if it's at capacity.
    pub(crate) fn add_child(&mut self, byte: u8, id: crate::arena::NodeId) {
        if self.is_full() {
            self.grow();
        }
        self.children_mut().add(byte, id);
    }
}
