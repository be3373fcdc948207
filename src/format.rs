//! Wire-format constants and the status taxonomy returned by the codec.
//!
//! There is no framing inside the codec's purview beyond the LSB-first bit
//! packing described in [`crate::bits`]: byte 0, bit 0 is the first token's
//! tag bit. The outer file format's 4-byte little-endian "expected
//! decompressed size" prefix is the caller's responsibility.

use std::fmt;

/// How many bits encode a copy length for a given copy offset.
///
/// When the copy source lies in the upper half of the history window (`r >=
/// 1 << (k - 1)`), the remaining range — and thus the maximum legal length —
/// fits in one fewer bit. The `>=` (not `>`) is a format quirk: with `k = 9`
/// a copy sourced at offset 256 uses 8 bits (range 0..255), while one at
/// offset 255 still uses 9 (range 0..511), so offsets in `[256, 511]` can
/// never encode a length `>= 256`.
pub(crate) fn size_bits(k: u32, read_offset: usize) -> u32 {
    if k > 0 && read_offset >= (1usize << (k - 1)) {
        k - 1
    } else {
        k
    }
}

/// Result of one `compress`/`decompress` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Progress was made (or none was possible this call, e.g. empty
    /// input/output); the caller should re-enter with more input/output.
    Ok,
    /// Decoder only: a malformed token. Unrecoverable without
    /// [`Decompressor::reset`].
    ///
    /// [`Decompressor::reset`]: crate::Decompressor::reset
    BadInput,
    /// Decoder only: the bit stream ended mid-token with a non-zero
    /// residue. Recoverable by supplying more input; final and indicates a
    /// damaged stream if no more input is coming.
    TruncatedInput,
    /// The output window was exhausted. State is preserved at bit
    /// granularity; re-enter with more room.
    BufferOverflow,
    /// The progress callback vetoed continuation. Unrecoverable without
    /// calling [`Compressor::reset`] or [`Decompressor::reset`].
    ///
    /// [`Compressor::reset`]: crate::Compressor::reset
    /// [`Decompressor::reset`]: crate::Decompressor::reset
    Aborted,
    /// The stream is complete. Sticky: further calls on this instance are
    /// rejected until [`Compressor::reset`] or [`Decompressor::reset`] is
    /// called.
    ///
    /// [`Compressor::reset`]: crate::Compressor::reset
    /// [`Decompressor::reset`]: crate::Decompressor::reset
    Finished,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Ok => "ok",
            Status::BadInput => "bad input",
            Status::TruncatedInput => "truncated input",
            Status::BufferOverflow => "buffer overflow",
            Status::Aborted => "aborted",
            Status::Finished => "finished",
        };
        f.write_str(s)
    }
}
