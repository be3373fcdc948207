//! Programmer/construction-time errors.
//!
//! This is deliberately narrow: the per-call result of `compress`/
//! `decompress` is [`crate::Status`], not a [`GkError`]. `GkError` only
//! covers the handful of things that can go wrong *before* a codec
//! instance exists to report a `Status` at all — i.e. the convenience
//! whole-buffer wrappers in [`crate::decode`] and [`crate::encode`], which
//! need some way to surface a bad `Status` as a `std::error::Error` for
//! callers who'd rather use `?` than match on an enum.

use error_chain::error_chain;

error_chain! {
    types {
        GkError, GkErrorKind, ResultExt, GkResult;
    }

    errors {
        /// A whole-buffer convenience call received a `history_log_2`
        /// outside `0..=9`.
        InvalidHistoryLog(k: u32) {
            description("history_log_2 out of range"),
            display("history_log_2 must be in 0..=9, got {}", k),
        }
        /// A whole-buffer convenience call failed partway through with a
        /// non-recoverable status.
        Codec(status: crate::format::Status) {
            description("codec call returned a non-recoverable status"),
            display("codec error: {}", status),
        }
    }
}
