//! Error taxonomy.
//!
//! Not-found conditions are plain `Option`/`bool` throughout this crate, as
//! in the teacher; the only place a typed error earns its keep is decoding a
//! frozen view handed back from outside the process, grounded in the
//! `thiserror`-based error enums this pack's other tree crates use.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrozenViewError {
    #[error("buffer too small to contain a header: got {got} bytes, need at least {need}")]
    BufferTooSmall { got: usize, need: usize },

    #[error("buffer is not 8-byte aligned")]
    Misaligned,

    #[error("bad magic: expected {expected:#x}, got {got:#x}")]
    BadMagic { expected: u32, got: u32 },

    #[error("unsupported format version: {0}")]
    UnsupportedVersion(u16),

    #[error("header declares total length {declared}, buffer only has {actual}")]
    LengthMismatch { declared: u64, actual: usize },

    #[error("node offset {offset} is out of bounds for a buffer of length {len}")]
    OffsetOutOfBounds { offset: u64, len: usize },
}
