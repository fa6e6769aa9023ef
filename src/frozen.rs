//! Reader half of the frozen-view format; the writer half lives in
//! [`crate::serialize`].
//!
//! [`FrozenArt`] borrows a single caller-owned, 8-byte-aligned buffer and
//! never allocates. Records are decoded with [`bytemuck::pod_read_unaligned`]
//! rather than cast-in-place, so this crate never hands back a reference
//! into `buf` typed as a node — every record is copied out by value before
//! its fields are read. That sidesteps needing unsafe pointer casts at the
//! cost of a few hundred bytes of stack copying per step, which is the right
//! trade for a read path that isn't this crate's hot loop.

use bytemuck::pod_read_unaligned;

use crate::frozen_format::*;
use crate::key::{KeyBytes, KEY_LEN};
use crate::FrozenViewError;

#[derive(Clone, Copy)]
enum Record {
    Leaf(LeafRecord),
    N4(N4Record),
    N16(N16Record),
    N48(N48Record),
    N256(N256Record),
}

fn decode(buf: &[u8], offset: u64) -> Record {
    let off = offset as usize;
    let tag: u32 = pod_read_unaligned(&buf[off..off + 4]);
    match tag {
        TAG_LEAF => Record::Leaf(pod_read_unaligned(&buf[off..off + LEAF_RECORD_LEN])),
        TAG_N4 => Record::N4(pod_read_unaligned(&buf[off..off + N4_RECORD_LEN])),
        TAG_N16 => Record::N16(pod_read_unaligned(&buf[off..off + N16_RECORD_LEN])),
        TAG_N48 => Record::N48(pod_read_unaligned(&buf[off..off + N48_RECORD_LEN])),
        TAG_N256 => Record::N256(pod_read_unaligned(&buf[off..off + N256_RECORD_LEN])),
        other => panic!("corrupt frozen buffer: unknown node tag {other}"),
    }
}

fn inner_header(record: &Record) -> Option<&InnerHeader> {
    match record {
        Record::Leaf(_) => None,
        Record::N4(r) => Some(&r.header),
        Record::N16(r) => Some(&r.header),
        Record::N48(r) => Some(&r.header),
        Record::N256(r) => Some(&r.header),
    }
}

fn find_child(record: &Record, byte: u8) -> Option<u64> {
    match record {
        Record::Leaf(_) => None,
        Record::N4(r) => {
            let n = r.header.child_count as usize;
            (0..n).find(|&i| r.keys[i] == byte).map(|i| r.offsets[i])
        }
        Record::N16(r) => {
            let n = r.header.child_count as usize;
            (0..n).find(|&i| r.keys[i] == byte).map(|i| r.offsets[i])
        }
        Record::N48(r) => {
            let slot = r.child_index[byte as usize];
            (slot != 0).then(|| r.offsets[slot as usize - 1])
        }
        Record::N256(r) => {
            let offset = r.offsets[byte as usize];
            (offset != 0).then_some(offset)
        }
    }
}

fn first_child(record: &Record) -> Option<(u8, u64)> {
    match record {
        Record::Leaf(_) => None,
        Record::N4(r) => (r.header.child_count > 0).then(|| (r.keys[0], r.offsets[0])),
        Record::N16(r) => (r.header.child_count > 0).then(|| (r.keys[0], r.offsets[0])),
        Record::N48(_) | Record::N256(_) => {
            (0u16..256).find_map(|b| find_child(record, b as u8).map(|o| (b as u8, o)))
        }
    }
}

fn last_child(record: &Record) -> Option<(u8, u64)> {
    match record {
        Record::Leaf(_) => None,
        Record::N4(r) => {
            let n = r.header.child_count as usize;
            (n > 0).then(|| (r.keys[n - 1], r.offsets[n - 1]))
        }
        Record::N16(r) => {
            let n = r.header.child_count as usize;
            (n > 0).then(|| (r.keys[n - 1], r.offsets[n - 1]))
        }
        _ => (0u16..256)
            .rev()
            .find_map(|b| find_child(record, b as u8).map(|o| (b as u8, o))),
    }
}

fn next_child(record: &Record, byte: u8) -> Option<(u8, u64)> {
    match record {
        Record::Leaf(_) => None,
        Record::N4(r) => {
            let n = r.header.child_count as usize;
            (0..n).find(|&i| r.keys[i] > byte).map(|i| (r.keys[i], r.offsets[i]))
        }
        Record::N16(r) => {
            let n = r.header.child_count as usize;
            (0..n).find(|&i| r.keys[i] > byte).map(|i| (r.keys[i], r.offsets[i]))
        }
        _ => ((byte as u16 + 1)..256).find_map(|b| find_child(record, b as u8).map(|o| (b as u8, o))),
    }
}

fn prev_child(record: &Record, byte: u8) -> Option<(u8, u64)> {
    match record {
        Record::Leaf(_) => None,
        Record::N4(r) => {
            let n = r.header.child_count as usize;
            (0..n).rev().find(|&i| r.keys[i] < byte).map(|i| (r.keys[i], r.offsets[i]))
        }
        Record::N16(r) => {
            let n = r.header.child_count as usize;
            (0..n).rev().find(|&i| r.keys[i] < byte).map(|i| (r.keys[i], r.offsets[i]))
        }
        _ => (0..byte as u16)
            .rev()
            .find_map(|b| find_child(record, b as u8).map(|o| (b as u8, o))),
    }
}

/// A read-only Adaptive Radix Tree that borrows a single serialized buffer
/// instead of owning per-node allocations. Produced by [`crate::Art::frozen_view`].
pub struct FrozenArt<'a> {
    buf: &'a [u8],
    header: Header,
}

impl<'a> FrozenArt<'a> {
    pub(crate) fn parse(buf: &'a [u8]) -> Result<Self, FrozenViewError> {
        if buf.as_ptr() as usize % 8 != 0 {
            tracing::debug!("frozen_view rejected misaligned buffer");
            return Err(FrozenViewError::Misaligned);
        }
        if buf.len() < HEADER_LEN {
            return Err(FrozenViewError::BufferTooSmall {
                got: buf.len(),
                need: HEADER_LEN,
            });
        }
        let header: Header = pod_read_unaligned(&buf[..HEADER_LEN]);
        if header.magic != MAGIC {
            tracing::debug!(got = header.magic, "frozen_view rejected bad magic");
            return Err(FrozenViewError::BadMagic {
                expected: MAGIC,
                got: header.magic,
            });
        }
        if header.version != FORMAT_VERSION {
            return Err(FrozenViewError::UnsupportedVersion(header.version));
        }
        if header.total_len as usize != buf.len() {
            return Err(FrozenViewError::LengthMismatch {
                declared: header.total_len,
                actual: buf.len(),
            });
        }
        if header.root_offset != 0 && header.root_offset as usize >= buf.len() {
            return Err(FrozenViewError::OffsetOutOfBounds {
                offset: header.root_offset,
                len: buf.len(),
            });
        }
        Ok(Self { buf, header })
    }

    /// Number of bytes of `buf` this view occupies — always the buffer's
    /// full length, since the serializer emits exactly one self-contained
    /// tree per buffer.
    pub fn bytes_consumed(&self) -> usize {
        self.header.total_len as usize
    }

    pub fn len(&self) -> usize {
        self.header.leaf_count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.header.leaf_count == 0
    }

    fn root_offset(&self) -> Option<u64> {
        (self.header.root_offset != 0).then_some(self.header.root_offset)
    }

    pub fn find(&self, key: &KeyBytes) -> Option<u64> {
        let mut offset = self.root_offset()?;
        let mut depth = 0usize;
        loop {
            match decode(self.buf, offset) {
                Record::Leaf(leaf) => return (leaf.key == *key).then_some(leaf.value),
                record => {
                    let inner = inner_header(&record).expect("non-leaf record");
                    let plen = inner.prefix_len as usize;
                    if depth + plen > KEY_LEN || inner.prefix[..plen] != key[depth..depth + plen] {
                        return None;
                    }
                    depth += plen;
                    if depth >= KEY_LEN {
                        return None;
                    }
                    offset = find_child(&record, key[depth])?;
                    depth += 1;
                }
            }
        }
    }

    /// Ascending-order forward iteration over every key/value pair. Returned
    /// eagerly rather than lazily — the tree is at most 6 levels deep, so a
    /// recursive walk is simpler than a stack-based cursor here and the
    /// caller gets a plain `Vec` instead of an opaque iterator type.
    pub fn iter_ascending(&self) -> Vec<(KeyBytes, u64)> {
        let mut out = Vec::with_capacity(self.len());
        if let Some(root) = self.root_offset() {
            self.collect(root, &mut out);
        }
        out
    }

    fn collect(&self, offset: u64, out: &mut Vec<(KeyBytes, u64)>) {
        match decode(self.buf, offset) {
            Record::Leaf(leaf) => out.push((leaf.key, leaf.value)),
            record => {
                let mut byte = first_child(&record);
                while let Some((b, child_offset)) = byte {
                    self.collect(child_offset, out);
                    byte = next_child(&record, b);
                }
            }
        }
    }

    /// Descending-order counterpart to [`FrozenArt::iter_ascending`], used by
    /// the reverse-iteration round-trip test.
    pub fn iter_descending(&self) -> Vec<(KeyBytes, u64)> {
        let mut out = Vec::with_capacity(self.len());
        if let Some(root) = self.root_offset() {
            self.collect_rev(root, &mut out);
        }
        out
    }

    fn collect_rev(&self, offset: u64, out: &mut Vec<(KeyBytes, u64)>) {
        match decode(self.buf, offset) {
            Record::Leaf(leaf) => out.push((leaf.key, leaf.value)),
            record => {
                let mut byte = last_child(&record);
                while let Some((b, child_offset)) = byte {
                    self.collect_rev(child_offset, out);
                    byte = prev_child(&record, b);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::key_from_u48;
    use crate::Art;

    #[test]
    fn round_trips_find_and_iteration() {
        let mut tree = Art::new();
        for k in 0..500u64 {
            tree.insert(key_from_u48(k), k * 7);
        }
        tree.shrink_to_fit();
        let bytes = tree.serialize();
        let frozen = FrozenArt::parse(&bytes).expect("valid frozen view");

        for k in 0..500u64 {
            assert_eq!(frozen.find(&key_from_u48(k)), Some(k * 7));
        }
        assert_eq!(frozen.find(&key_from_u48(9999)), None);

        let collected = frozen.iter_ascending();
        assert_eq!(collected.len(), 500);
        assert!(collected.windows(2).all(|w| w[0].0 < w[1].0));

        let mut reversed = frozen.iter_descending();
        reversed.reverse();
        assert_eq!(collected, reversed);
    }

    #[test]
    fn empty_tree_round_trips() {
        let tree = Art::new();
        let bytes = tree.serialize();
        let frozen = FrozenArt::parse(&bytes).expect("valid frozen view");
        assert!(frozen.is_empty());
        assert_eq!(frozen.find(&key_from_u48(0)), None);
        assert!(frozen.iter_ascending().is_empty());
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = Art::new().serialize();
        bytes[0] ^= 0xFF;
        assert!(matches!(
            FrozenArt::parse(&bytes),
            Err(FrozenViewError::BadMagic { .. })
        ));
    }

    #[test]
    fn rejects_truncated_buffer() {
        let mut tree = Art::new();
        tree.insert(key_from_u48(1), 1);
        let bytes = tree.serialize();
        assert!(matches!(
            FrozenArt::parse(&bytes[..bytes.len() - 8]),
            Err(FrozenViewError::LengthMismatch { .. })
        ));
    }
}
