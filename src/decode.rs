//! The suspendable decompression state machine.
//!
//! Every state can suspend on buffer exhaustion and resume bit-for-bit on
//! the next call: nothing is re-derived, nothing is lost.

use log::{debug, trace};

use crate::bits::BitAccumulator;
use crate::format::{size_bits, Status};
use crate::params::Params;
use crate::ring::HistoryRing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Progress,
    GetType,
    GetOffset,
    GetSize,
    CopyData,
    GetByte,
    PutByte,
}

/// A decompressor for one Gordon Key stream.
///
/// Construct with [`Decompressor::new`] (or [`Decompressor::try_new`] if you
/// need to observe allocation failure), feed it caller-owned windows via
/// [`decompress`](Decompressor::decompress), and call
/// [`reset`](Decompressor::reset) to reuse the instance for a new stream
/// without reallocating.
#[derive(Debug)]
pub struct Decompressor {
    k: u32,
    lenient: bool,
    state: State,
    acc: BitAccumulator,
    ring: HistoryRing,
    read_offset: usize,
    read_size: usize,
    literal: u8,
    in_total: u64,
    out_total: u64,
    terminal: Option<Status>,
}

impl Decompressor {
    /// `k` (the history log2) must match the encoder that produced the
    /// stream and must be in `0..=9`. Panics on allocation failure; use
    /// [`try_new`](Self::try_new) to handle that instead.
    pub fn new(k: u32) -> Self {
        Self::try_new(k).expect("allocation failure constructing Decompressor")
    }

    /// Fallible construction: returns `None` instead of panicking if the
    /// history ring cannot be allocated.
    pub fn try_new(k: u32) -> Option<Self> {
        let ring = HistoryRing::try_new(k)?;
        Some(Self {
            k,
            lenient: false,
            state: State::Progress,
            acc: BitAccumulator::new(),
            ring,
            read_offset: 0,
            read_size: 0,
            literal: 0,
            in_total: 0,
            out_total: 0,
            terminal: None,
        })
    }

    /// Enable the non-default lenient mode: a decoded copy length of 0 is
    /// treated as 1 (matching the historical reference decompressor)
    /// instead of being rejected as [`Status::BadInput`]. Off by default.
    pub fn set_lenient(&mut self, lenient: bool) -> &mut Self {
        self.lenient = lenient;
        self
    }

    /// Return to the initial state without reallocating the history ring.
    pub fn reset(&mut self) {
        self.state = State::Progress;
        self.acc = BitAccumulator::new();
        self.ring.reset();
        self.read_offset = 0;
        self.read_size = 0;
        self.literal = 0;
        self.in_total = 0;
        self.out_total = 0;
        self.terminal = None;
    }

    /// Total bytes consumed from the input so far across all calls.
    pub fn in_total(&self) -> u64 {
        self.in_total
    }

    /// Total bytes emitted (or, in sizing mode, that would have been
    /// emitted) so far across all calls.
    pub fn out_total(&self) -> u64 {
        self.out_total
    }

    /// Drive the decoder state machine, mutating `params` in place, until it
    /// suspends (buffer exhaustion), is vetoed by the progress callback, or
    /// completes.
    pub fn decompress(&mut self, params: &mut Params) -> Status {
        if let Some(term) = self.terminal {
            return term;
        }

        let k = self.k;
        let lenient = self.lenient;

        let status = loop {
            match self.state {
                State::Progress => {
                    if let Some(cb) = params.progress.as_deref_mut() {
                        if !cb(self.in_total, self.out_total) {
                            break Status::Aborted;
                        }
                    }
                    self.state = State::GetType;
                }
                State::GetType => match self.acc.read_bits(&mut params.input, 1) {
                    Some(bit) => {
                        self.state = if bit == 1 {
                            State::GetOffset
                        } else {
                            State::GetByte
                        };
                    }
                    None => {
                        break if self.acc.has_residue() {
                            Status::TruncatedInput
                        } else {
                            Status::Finished
                        };
                    }
                },
                State::GetOffset => match self.acc.read_bits(&mut params.input, k) {
                    Some(v) => {
                        self.read_offset = v as usize;
                        self.state = State::GetSize;
                    }
                    None => break Status::TruncatedInput,
                },
                State::GetSize => {
                    let bits = size_bits(k, self.read_offset);
                    match self.acc.read_bits(&mut params.input, bits) {
                        Some(v) => {
                            let mut size = v as usize;
                            if size == 0 {
                                if lenient {
                                    size = 1;
                                } else {
                                    break Status::BadInput;
                                }
                            }
                            if self.read_offset + size > (1usize << k) {
                                break Status::BadInput;
                            }
                            trace!("copy token: offset={} size={}", self.read_offset, size);
                            self.read_size = size;
                            self.state = State::CopyData;
                        }
                        None => break Status::TruncatedInput,
                    }
                }
                State::CopyData => {
                    let out_total = &mut self.out_total;
                    let output = &mut params.output;
                    let mut sink = |bytes: &[u8]| -> usize {
                        let n = output.put_bytes(bytes);
                        *out_total += n as u64;
                        n
                    };
                    let accepted = self.ring.copy(self.read_offset, self.read_size, Some(&mut sink));
                    if accepted < self.read_size {
                        // read_offset is left alone: it is relative to
                        // write_pos, which the ring has already advanced by
                        // `accepted`, so resuming re-derives the right
                        // absolute source automatically.
                        trace!("copy stalled on output: {}/{} bytes accepted", accepted, self.read_size);
                        self.read_size -= accepted;
                        break Status::BufferOverflow;
                    }
                    self.state = State::Progress;
                }
                State::GetByte => match self.acc.read_bits(&mut params.input, 8) {
                    Some(v) => {
                        self.literal = v as u8;
                        trace!("literal token: {:#04x}", self.literal);
                        self.state = State::PutByte;
                    }
                    None => {
                        break if self.acc.has_residue() {
                            Status::TruncatedInput
                        } else {
                            Status::Finished
                        };
                    }
                },
                State::PutByte => {
                    let accepted = params.output.put_bytes(&[self.literal]);
                    if accepted == 0 {
                        break Status::BufferOverflow;
                    }
                    self.out_total += 1;
                    self.ring.write(&[self.literal]);
                    self.state = State::Progress;
                }
            }
        };

        self.in_total += params.input.consumed() as u64;
        if matches!(status, Status::Finished | Status::BadInput | Status::Aborted) {
            debug!("decompress: stream reached terminal status {}", status);
            self.terminal = Some(status);
        }
        status
    }
}

/// Decompress a complete in-memory buffer, growing the output as needed.
///
/// A convenience built on [`Decompressor`] for callers who don't need
/// incremental/resumable feeding; not part of the core's pull/push
/// contract.
pub fn decompress_to_vec(
    data: &[u8],
    k: u32,
    expected_size_hint: usize,
) -> crate::errors::GkResult<Vec<u8>> {
    use crate::bits::{Input, Output};
    use crate::errors::GkErrorKind;

    let mut dec = Decompressor::new(k);
    let mut out = Vec::with_capacity(expected_size_hint);
    let mut in_pos = 0usize;

    loop {
        let mut chunk = vec![0u8; 4096];
        let mut params = Params::new(Input::new(&data[in_pos..]), Output::buffer(&mut chunk));
        let status = dec.decompress(&mut params);
        let written = params.output.emitted();
        in_pos += data[in_pos..].len() - params.input.remaining();
        out.extend_from_slice(&chunk[..written]);

        match status {
            Status::Finished => return Ok(out),
            Status::BufferOverflow | Status::Ok => continue,
            other => return Err(GkErrorKind::Codec(other).into()),
        }
    }
}
