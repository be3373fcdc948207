//! The suspendable compression state machine.
//!
//! Mirrors [`crate::Decompressor`]'s suspend/resume discipline: every state
//! can stall on input exhaustion or overflow on output exhaustion and
//! resume bit-for-bit on the next call. The bulk of this module is the
//! greedy longest-match search, which is itself restartable mid-search.

use log::{debug, trace};

use crate::bits::BitAccumulator;
use crate::format::{size_bits, Status};
use crate::params::Params;
use crate::ring::{HistoryRing, NOT_FOUND};

/// The most-recently-written byte is never a valid copy source. A format
/// idiosyncrasy shared with the reference encoder; fixed rather than
/// exposed as a knob since nothing in this crate's surface needs to flip
/// it.
const DELTA: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NextSequence,
    Progress,
    FindSequence,
    PutOffset,
    PutSize,
    PutByte,
    PutBytes,
    Flush,
}

enum Search {
    Committed,
    Stalled,
}

/// A compressor for one Gordon Key stream.
///
/// Construct with [`Compressor::new`] (or [`Compressor::try_new`]), feed it
/// caller-owned windows via [`compress`](Compressor::compress), and call
/// [`reset`](Compressor::reset) to reuse the instance for a new stream
/// without reallocating.
#[derive(Debug)]
pub struct Compressor {
    k: u32,
    state: State,
    acc: BitAccumulator,
    ring: HistoryRing,
    // lookahead: input bytes pulled from the caller but not yet turned into
    // an emitted token. Never truncated except by draining its consumed
    // prefix once a token commits.
    pending: Vec<u8>,
    // match-finding scratch, persisted across stalls so a search resumes
    // exactly where it left off regardless of how the caller chunked input.
    p: usize,
    max_read_size: usize,
    read_offset: usize,
    read_size: usize,
    best_read_offset: usize,
    best_read_size: usize,
    in_total: u64,
    out_total: u64,
    terminal: Option<Status>,
}

impl Compressor {
    /// `k` (the history log2) must be in `0..=9` and must match the
    /// decoder that will read this stream. Panics on allocation failure;
    /// use [`try_new`](Self::try_new) to handle that instead.
    pub fn new(k: u32) -> Self {
        Self::try_new(k).expect("allocation failure constructing Compressor")
    }

    /// Fallible construction: returns `None` instead of panicking if the
    /// history ring cannot be allocated.
    pub fn try_new(k: u32) -> Option<Self> {
        let ring = HistoryRing::try_new(k)?;
        Some(Self {
            k,
            state: State::NextSequence,
            acc: BitAccumulator::new(),
            ring,
            pending: Vec::new(),
            p: 0,
            max_read_size: 0,
            read_offset: 0,
            read_size: 0,
            best_read_offset: 0,
            best_read_size: 0,
            in_total: 0,
            out_total: 0,
            terminal: None,
        })
    }

    /// Return to the initial state without reallocating the history ring.
    pub fn reset(&mut self) {
        self.state = State::NextSequence;
        self.acc = BitAccumulator::new();
        self.ring.reset();
        self.pending.clear();
        self.p = 0;
        self.max_read_size = 0;
        self.read_offset = 0;
        self.read_size = 0;
        self.best_read_offset = 0;
        self.best_read_size = 0;
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

    fn max_len(&self, p: usize) -> usize {
        (1usize << self.k).saturating_sub(p + DELTA)
    }

    /// Top up `self.pending` from `input` until it holds at least `n`
    /// bytes or `input` is exhausted. Returns `true` once `n` bytes are
    /// available.
    fn ensure_pending(&mut self, input: &mut crate::bits::Input, n: usize) -> bool {
        while self.pending.len() < n {
            match input.take_byte() {
                Some(b) => self.pending.push(b),
                None => return false,
            }
        }
        true
    }

    /// Run (or resume) the greedy longest-match search against `self.p`,
    /// `self.best_read_offset`/`self.best_read_size`. `finish` tells the
    /// search that no further input will ever arrive this stream, so a
    /// lookahead shortfall should be treated as a hard boundary (stop
    /// growing the match) rather than a stall.
    fn find_sequence(&mut self, input: &mut crate::bits::Input, finish: bool) -> Search {
        loop {
            self.max_read_size = self.max_len(self.p);
            if self.best_read_size >= self.max_read_size {
                return Search::Committed;
            }

            let target = if self.best_read_size == 0 {
                if !self.ensure_pending(input, 1) {
                    if finish {
                        return Search::Committed;
                    }
                    return Search::Stalled;
                }
                self.pending[0]
            } else {
                self.ring.read_char(self.best_read_offset)
            };

            let found = self
                .ring
                .find_char(self.p, self.max_read_size - self.best_read_size, target);
            if found == NOT_FOUND {
                return Search::Committed;
            }
            self.p = found;
            self.max_read_size = self.max_len(self.p);

            if self.best_read_size > 0 {
                let eq = self
                    .ring
                    .compare(self.p + 1, self.best_read_offset + 1, self.best_read_size - 1)
                    == std::cmp::Ordering::Equal;
                if !eq {
                    self.p += 1;
                    continue;
                }
            }

            // Extend: positions [0, best_read_size) are already confirmed
            // equal to `pending`; keep comparing beyond that.
            let mut len = self.best_read_size.max(1);
            loop {
                if len >= self.max_read_size {
                    break;
                }
                if !self.ensure_pending(input, len + 1) {
                    if finish {
                        break;
                    }
                    return Search::Stalled;
                }
                if self.ring.read_char(self.p + len) == self.pending[len] {
                    len += 1;
                } else {
                    break;
                }
            }

            if len > self.best_read_size {
                self.best_read_offset = self.p;
                self.best_read_size = len;
            }
            self.p += 1;
        }
    }

    /// Drive the encoder state machine, mutating `params` in place, until
    /// it stalls (input exhaustion), overflows (output exhaustion), is
    /// vetoed by the progress callback, or completes. `finish` must be
    /// `true` on the call that supplies the last byte of the stream (and
    /// on every call thereafter) so the final literal run can be flushed;
    /// passing `false` on a call that genuinely exhausts input leaves the
    /// encoder suspended, ready to resume once more input is available.
    pub fn compress(&mut self, params: &mut Params, finish: bool) -> Status {
        if let Some(term) = self.terminal {
            return term;
        }

        let k = self.k;

        let status = loop {
            match self.state {
                State::NextSequence => {
                    self.read_offset = 0;
                    self.read_size = 0;
                    self.best_read_offset = 0;
                    self.best_read_size = 0;
                    self.p = 0;
                    self.state = State::Progress;
                }
                State::Progress => {
                    if let Some(cb) = params.progress.as_deref_mut() {
                        if !cb(self.in_total, self.out_total) {
                            break Status::Aborted;
                        }
                    }
                    self.state = State::FindSequence;
                }
                State::FindSequence => match self.find_sequence(&mut params.input, finish) {
                    Search::Stalled => break Status::Ok,
                    Search::Committed => {
                        if self.best_read_size == 0 {
                            // The search may have committed without ever
                            // pulling a lookahead byte (e.g. `k == 0`,
                            // where `max_len` is 0 at every `p`); try once
                            // more here before deciding there's nothing
                            // left to do.
                            if self.ensure_pending(&mut params.input, 1) {
                                self.state = State::PutByte;
                            } else if finish {
                                self.state = State::Flush;
                            } else {
                                break Status::Ok;
                            }
                        } else {
                            self.read_offset = self.best_read_offset;
                            self.read_size = self.best_read_size;
                            let cost_literal = self.read_size * 9;
                            let cost_copy =
                                1 + k as usize + size_bits(k, self.read_offset) as usize;
                            trace!(
                                "match: offset={} size={} (literal {} bits vs copy {} bits)",
                                self.read_offset, self.read_size, cost_literal, cost_copy
                            );
                            self.state = if cost_literal < cost_copy {
                                State::PutBytes
                            } else {
                                State::PutOffset
                            };
                        }
                    }
                },
                State::PutOffset => {
                    let v = ((self.read_offset as u32) << 1) | 1;
                    if !self.acc.write_bits(&mut params.output, 1 + k, v) {
                        break Status::BufferOverflow;
                    }
                    self.state = State::PutSize;
                }
                State::PutSize => {
                    let bits = size_bits(k, self.read_offset);
                    if !self.acc.write_bits(&mut params.output, bits, self.read_size as u32) {
                        break Status::BufferOverflow;
                    }
                    self.ring.copy(self.read_offset, self.read_size, None);
                    self.pending.drain(0..self.read_size);
                    self.state = State::NextSequence;
                }
                State::PutByte => {
                    let byte = self.pending[0];
                    if !self.acc.write_bits(&mut params.output, 9, (byte as u32) << 1) {
                        break Status::BufferOverflow;
                    }
                    self.ring.write(&[byte]);
                    self.pending.remove(0);
                    self.state = State::NextSequence;
                }
                State::PutBytes => {
                    let read_offset = self.read_offset;
                    let read_size = self.read_size;
                    let accepted = {
                        let acc = &mut self.acc;
                        let output = &mut params.output;
                        let mut sink = |bytes: &[u8]| -> usize {
                            let mut n = 0;
                            for &b in bytes {
                                if !acc.write_bits(output, 9, (b as u32) << 1) {
                                    break;
                                }
                                n += 1;
                            }
                            n
                        };
                        self.ring.copy(read_offset, read_size, Some(&mut sink))
                    };
                    self.pending.drain(0..accepted);
                    if accepted < read_size {
                        self.read_size -= accepted;
                        break Status::BufferOverflow;
                    }
                    self.state = State::NextSequence;
                }
                State::Flush => {
                    if !self.acc.flush(&mut params.output) {
                        break Status::BufferOverflow;
                    }
                    break Status::Finished;
                }
            }
        };

        self.in_total += params.input.consumed() as u64;
        self.out_total += params.output.emitted() as u64;
        if matches!(status, Status::Finished | Status::Aborted) {
            debug!("compress: stream reached terminal status {} ({} bytes emitted)", status, self.out_total);
            self.terminal = Some(status);
        }
        status
    }
}

/// Compress a complete in-memory buffer in one shot, growing the output as
/// needed.
///
/// A convenience built on [`Compressor`] for callers who don't need
/// incremental/resumable feeding; not part of the core's pull/push
/// contract.
pub fn compress_to_vec(data: &[u8], k: u32) -> crate::errors::GkResult<Vec<u8>> {
    use crate::bits::{Input, Output};
    use crate::errors::GkErrorKind;

    let mut enc = Compressor::new(k);
    let mut out = Vec::with_capacity(data.len() / 2 + 16);
    let mut in_pos = 0usize;

    loop {
        let mut chunk = vec![0u8; 4096];
        let remaining_in = &data[in_pos..];
        let finish = true; // whole buffer is available up front; every call may finish.
        let mut params = Params::new(Input::new(remaining_in), Output::buffer(&mut chunk));
        let status = enc.compress(&mut params, finish);
        let written = params.output.emitted();
        in_pos += remaining_in.len() - params.input.remaining();
        out.extend_from_slice(&chunk[..written]);

        match status {
            Status::Finished => return Ok(out),
            Status::BufferOverflow | Status::Ok => continue,
            other => return Err(GkErrorKind::Codec(other).into()),
        }
    }
}
