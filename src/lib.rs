//! A streaming codec for the "Gordon Key" / Fednet LZ back-reference
//! compression format used by certain Archimedes-era games.
//!
//! The wire format packs tokens into a bit stream with no byte alignment
//! between them: either a 9-bit literal token (a tag bit plus a byte) or a
//! `1 + k + size_bits(k, offset)`-bit copy token referencing the codec's own
//! sliding history of recently emitted bytes. See [`format`] for the exact
//! bit layout; the history buffer both sides maintain in lockstep is an
//! internal implementation detail of [`Compressor`] and [`Decompressor`].
//!
//! ## Usage
//! The [`compress_to_vec`] and [`decompress_to_vec`] functions are the
//! quickest way to round-trip an in-memory buffer:
//!
//! ```
//! use gkey::{compress_to_vec, decompress_to_vec};
//!
//! let data = b"ababacabababacdcdeaba";
//! let compressed = compress_to_vec(data, 9).unwrap();
//! let decompressed = decompress_to_vec(&compressed, 9, data.len()).unwrap();
//! assert_eq!(&data[..], &decompressed[..]);
//! ```
//!
//! For incremental use — feeding a stream piece by piece, with a
//! caller-bounded output window, or in sizing mode with no output buffer at
//! all — drive [`Compressor`] or [`Decompressor`] directly against a
//! [`Params`] block built from [`bits::Input`]/[`bits::Output`]:
//!
//! ```
//! use gkey::{Compressor, Params};
//! use gkey::bits::{Input, Output};
//!
//! let mut enc = Compressor::new(9);
//! let mut out = vec![0u8; 64];
//! let mut params = Params::new(Input::new(b"hello, hello, hello"), Output::buffer(&mut out));
//! let status = enc.compress(&mut params, true);
//! assert_eq!(status, gkey::Status::Finished);
//! ```
//!
//! --------------------------------------------------------------------------
//! ## Format background
//! The format is named for the "Gordon Key" utility associated with the
//! Fednet file-transfer protocol on Acorn's Archimedes/RISC OS platform, and
//! later reused as a general-purpose asset compressor in several games of
//! that era. Reverse-engineering efforts (notably Chris Bazley's `GKeyLib`)
//! documented the bit-exact behaviour this crate targets: a decoder that
//! accepts exactly the streams a historical encoder could produce, plus an
//! explicit [lenient mode](Decompressor::set_lenient) for the historical
//! decoder's looser treatment of a zero-length copy.
//!
//! ## Implementation notes
//! This crate is a from-scratch implementation of the suspendable state
//! machines described by the format, not a port of any particular reference
//! decompressor's source. The two state machines ([`Decompressor`],
//! [`Compressor`]) are built to suspend and resume at *any* token boundary —
//! including mid-token on either the input or output side — because the
//! format's original use case streamed through small, caller-managed buffers
//! rather than operating on whole files in memory. The compressor's greedy
//! longest-match search is itself one of those suspendable states: it can
//! stall mid-search on input exhaustion and pick back up exactly where it
//! left off.
//!
//! The 4-byte little-endian "expected decompressed size" header some
//! historical callers prepend to a compressed stream is outside this
//! crate's scope; it is a detail of the outer file format, not the codec.

pub mod bits;
mod decode;
mod encode;
pub mod errors;
pub mod format;
pub mod params;
mod ring;

pub use bits::{Input, Output};
pub use decode::{decompress_to_vec, Decompressor};
pub use encode::{compress_to_vec, Compressor};
pub use format::Status;
pub use params::{Params, Progress};
