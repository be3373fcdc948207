//! The external parameter block: the caller-owned windows a single
//! `compress`/`decompress` call operates on.
//!
//! This is the Rust rendering of the classic C-style in-pointer/in-size,
//! out-pointer/out-size, progress-callback/callback-context struct: the
//! optional output buffer and optional callback become sum types
//! ([`Output`] and `Option<&mut dyn FnMut>`) instead of null pointers, and
//! the callback context is just whatever the closure captures — there is
//! no separate context field to thread through.

use crate::bits::{Input, Output};

/// `(bytes_consumed_so_far, bytes_emitted_so_far) -> keep going?`
pub type Progress<'a> = dyn FnMut(u64, u64) -> bool + 'a;

/// One call's worth of caller-owned state. Both windows are mutated in
/// place: `input` shrinks as bytes are consumed, `output` shrinks (or its
/// sizing counter grows) as bytes are written.
pub struct Params<'a> {
    pub input: Input<'a>,
    pub output: Output<'a>,
    pub progress: Option<&'a mut Progress<'a>>,
}

impl<'a> Params<'a> {
    pub fn new(input: Input<'a>, output: Output<'a>) -> Self {
        Self {
            input,
            output,
            progress: None,
        }
    }

    pub fn with_progress(mut self, cb: &'a mut Progress<'a>) -> Self {
        self.progress = Some(cb);
        self
    }
}
