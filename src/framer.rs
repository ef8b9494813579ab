//! CRLF line framing over a streaming byte source.
//!
//! TCP delivers arbitrarily sized chunks that do not respect protocol line
//! boundaries. [`LineFramer`] buffers partial data across calls and emits
//! each complete line exactly once, so no line is ever dropped, duplicated,
//! or split across dispatch calls.
//!
//! Unterminated data is bounded by [`MAX_LINE_LEN`]: a peer that streams
//! bytes without ever sending CRLF cannot grow the buffer without limit.
//! Once the bound is hit the oversized line is discarded through its
//! eventual terminator and framing resumes with the next line.
//!
//! This is pure, stateful-but-deterministic logic with no I/O, which keeps
//! it independently testable.

use bytes::{Buf, BytesMut};
use tracing::warn;

/// The IRC line terminator.
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Maximum length of an unterminated line, terminator excluded.
pub const MAX_LINE_LEN: usize = 8191;

/// Accumulates byte chunks and splits them into complete protocol lines.
///
/// # Example
///
/// ```
/// use slirc_client::framer::LineFramer;
///
/// let mut framer = LineFramer::new();
/// assert!(framer.feed(b"PING :ser").is_empty());
/// assert_eq!(framer.feed(b"ver\r\nNOTICE"), vec!["PING :server"]);
/// assert_eq!(framer.feed(b" * :hi\r\n"), vec!["NOTICE * :hi"]);
/// ```
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: BytesMut,
    /// Offset the next terminator scan starts from; everything before it
    /// was already scanned on a previous call.
    scan_from: usize,
    /// An oversized line is being thrown away up to its terminator.
    discarding: bool,
}

impl LineFramer {
    /// Create an empty framer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(4096),
            scan_from: 0,
            discarding: false,
        }
    }

    /// Append a chunk and return every complete line it completes, in order.
    ///
    /// Lines are returned without their terminator. A trailing partial line
    /// stays buffered for the next call. Empty input yields an empty vec.
    /// Bytes that are not valid UTF-8 are replaced rather than rejected;
    /// framing never fails.
    ///
    /// An unterminated line longer than [`MAX_LINE_LEN`] is dropped whole:
    /// its buffered bytes are released immediately and the remainder is
    /// consumed without emission until the terminator arrives.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        loop {
            match find_terminator(&self.buf[self.scan_from..]) {
                Some(found) => {
                    let at = self.scan_from + found;
                    let line = self.buf.split_to(at);
                    self.buf.advance(LINE_TERMINATOR.len());
                    self.scan_from = 0;
                    if self.discarding {
                        // Tail of an oversized line; swallow it.
                        self.discarding = false;
                    } else {
                        lines.push(String::from_utf8_lossy(&line).into_owned());
                    }
                }
                None => {
                    if self.discarding || self.buf.len() > MAX_LINE_LEN {
                        if !self.discarding {
                            warn!(
                                len = self.buf.len(),
                                "unterminated line exceeds limit, dropping"
                            );
                            self.discarding = true;
                        }
                        self.release_unterminated();
                    } else {
                        // Resume one byte early so a CR split from its LF by
                        // the chunk boundary is still found.
                        self.scan_from = self.buf.len().saturating_sub(1);
                    }
                    break;
                }
            }
        }
        lines
    }

    /// Drop buffered bytes of a line being discarded, keeping a trailing CR
    /// whose LF may arrive in the next chunk.
    fn release_unterminated(&mut self) {
        let keep = usize::from(self.buf.last() == Some(&b'\r'));
        let drop = self.buf.len() - keep;
        self.buf.advance(drop);
        self.scan_from = 0;
    }

    /// Bytes of the unterminated trailing line currently buffered.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    /// Discard any buffered partial line.
    ///
    /// Called when a connection is torn down so stale bytes never leak into
    /// the next connection's stream.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.scan_from = 0;
        self.discarding = false;
    }
}

fn find_terminator(buf: &[u8]) -> Option<usize> {
    buf.windows(LINE_TERMINATOR.len())
        .position(|w| w == LINE_TERMINATOR)
}
