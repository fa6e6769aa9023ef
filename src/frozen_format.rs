//! On-disk/on-wire record layout shared by the writer (`serialize.rs`) and
//! the reader (`frozen.rs`).
//!
//! Every record is `#[repr(C)]` + `bytemuck::Pod`, a fixed size per node
//! kind, and a multiple of 8 bytes, so records pack back-to-back with no
//! inter-record padding arithmetic beyond the 32-byte header. Cross-node
//! references are `u64` byte offsets from the start of the buffer; `0` never
//! names a real node (it lands inside the header) and so doubles as the
//! N4/N16/N48/N256 "no child in this slot" sentinel.

use bytemuck::{Pod, Zeroable};

use crate::key::KEY_LEN;

pub(crate) const MAGIC: u32 = 0x5452_4131; // reads "1ART" as little-endian bytes
pub(crate) const FORMAT_VERSION: u16 = 1;

pub(crate) const TAG_LEAF: u32 = 0;
pub(crate) const TAG_N4: u32 = 1;
pub(crate) const TAG_N16: u32 = 2;
pub(crate) const TAG_N48: u32 = 3;
pub(crate) const TAG_N256: u32 = 4;

pub(crate) const HEADER_LEN: usize = 32;
pub(crate) const LEAF_RECORD_LEN: usize = 24;
pub(crate) const N4_RECORD_LEN: usize = 56;
pub(crate) const N16_RECORD_LEN: usize = 160;
pub(crate) const N48_RECORD_LEN: usize = 656;
pub(crate) const N256_RECORD_LEN: usize = 2064;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct Header {
    pub(crate) magic: u32,
    pub(crate) version: u16,
    pub(crate) _pad: u16,
    pub(crate) leaf_count: u32,
    pub(crate) node_count: u32,
    pub(crate) root_offset: u64,
    pub(crate) total_len: u64,
}

// Field order matters here: `value` must land on an 8-byte boundary for
// `#[repr(C)]` to lay this out with no implicit padding, so the u64 comes
// right after `tag` (with one explicit padding field closing the gap) and
// `key`/`_pad2` follow it rather than sitting in between.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct LeafRecord {
    pub(crate) tag: u32,
    pub(crate) _pad: [u8; 4],
    pub(crate) value: u64,
    pub(crate) key: [u8; KEY_LEN],
    pub(crate) _pad2: [u8; 2],
}

/// Shared prefix of every inner-node record kind.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct InnerHeader {
    pub(crate) tag: u32,
    pub(crate) prefix_len: u8,
    pub(crate) prefix: [u8; KEY_LEN],
    pub(crate) _pad: u8,
    pub(crate) child_count: u16,
    pub(crate) _pad2: [u8; 2],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct N4Record {
    pub(crate) header: InnerHeader,
    pub(crate) keys: [u8; 4],
    pub(crate) _pad: [u8; 4],
    pub(crate) offsets: [u64; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct N16Record {
    pub(crate) header: InnerHeader,
    pub(crate) keys: [u8; 16],
    pub(crate) offsets: [u64; 16],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct N48Record {
    pub(crate) header: InnerHeader,
    /// `child_index[byte]` is `0` if absent, else a 1-based index into
    /// `offsets`.
    pub(crate) child_index: [u8; 256],
    pub(crate) offsets: [u64; 48],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct N256Record {
    pub(crate) header: InnerHeader,
    pub(crate) offsets: [u64; 256],
}
