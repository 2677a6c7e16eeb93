//! Finds the quoted title inside a fixture file without loading the whole
//! file into memory.
//!
//! A fixture carries one declaration statement, one of four variants
//! (`describe(`, `describe.skip(`, `describe.only(`, `describe.pending(`),
//! whose first argument is a double-quoted title. The scanner reads the file
//! in fixed-size chunks and feeds them to a [`DeclarationLocator`], a small
//! state machine with an explicit bounded look-back window: bytes that can no
//! longer participate in a match are released after every chunk, so memory
//! stays bounded regardless of file size.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Recognized declaration prefixes. The EARLIEST occurrence in the file wins,
/// whichever variant it is.
pub const DECLARATION_PREFIXES: [&str; 4] = [
    "describe(",
    "describe.skip(",
    "describe.only(",
    "describe.pending(",
];

/// Read size per chunk.
pub(crate) const CHUNK_SIZE: usize = 8192;

/// Look-back kept between chunks when no candidate match is in flight.
/// Must exceed the longest declaration prefix so a prefix straddling a chunk
/// boundary is never lost.
const TAIL_WINDOW: usize = 128;

/// A declaration whose title quote has not closed within this many bytes is
/// abandoned and the scan continues past it. Keeps a missing close-quote from
/// pinning the buffer forever.
const MAX_TITLE_SPAN: usize = 4096;

/// Outcome of scanning the currently buffered bytes.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ScanStep {
    /// Title located; offsets index into [`DeclarationLocator::buffered`].
    Found {
        title_start: usize,
        title_end: usize,
    },
    /// No match yet. Bytes before `releasable` can never be part of one and
    /// may be drained by the caller.
    NeedMore { releasable: usize },
}

/// Incremental earliest-declaration matcher over a stream of chunks.
pub(crate) struct DeclarationLocator {
    buf: Vec<u8>,
}

impl DeclarationLocator {
    pub(crate) fn new() -> Self {
        DeclarationLocator { buf: Vec::new() }
    }

    pub(crate) fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    pub(crate) fn buffered(&self) -> &[u8] {
        &self.buf
    }

    /// Drop (and return) the first `n` buffered bytes. Offsets returned by a
    /// later [`scan`](Self::scan) are relative to what remains.
    pub(crate) fn drain(&mut self, n: usize) -> Vec<u8> {
        self.buf.drain(..n).collect()
    }

    /// Scan the buffer for the earliest declaration with a closed title.
    pub(crate) fn scan(&self) -> ScanStep {
        let buf = &self.buf;
        let mut from = 0;
        loop {
            let Some((pos, prefix_len)) = earliest_prefix(buf, from) else {
                // Keep a short tail so a prefix split across the chunk
                // boundary still matches once the next chunk arrives.
                return ScanStep::NeedMore {
                    releasable: buf.len().saturating_sub(TAIL_WINDOW),
                };
            };
            let after = pos + prefix_len;

            let Some(open) = find_byte(buf, b'"', after) else {
                if buf.len() - after > MAX_TITLE_SPAN {
                    from = after;
                    continue;
                }
                return ScanStep::NeedMore { releasable: pos };
            };
            // Only whitespace may sit between the `(` and the opening quote;
            // anything else means the first argument is not a string literal.
            if !buf[after..open].iter().all(u8::is_ascii_whitespace) {
                from = after;
                continue;
            }
            let Some(close) = find_byte(buf, b'"', open + 1) else {
                if buf.len() - open > MAX_TITLE_SPAN {
                    from = after;
                    continue;
                }
                return ScanStep::NeedMore { releasable: pos };
            };
            return ScanStep::Found {
                title_start: open + 1,
                title_end: close,
            };
        }
    }
}

/// Earliest full occurrence of any declaration prefix at or after `from`.
/// Returns (position, matched prefix length).
fn earliest_prefix(buf: &[u8], from: usize) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    for prefix in DECLARATION_PREFIXES {
        if let Some(pos) = find_subslice(buf, prefix.as_bytes(), from) {
            if best.is_none_or(|(b, _)| pos < b) {
                best = Some((pos, prefix.len()));
            }
        }
    }
    best
}

fn find_subslice(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from >= haystack.len() || needle.is_empty() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

fn find_byte(haystack: &[u8], byte: u8, from: usize) -> Option<usize> {
    haystack[from.min(haystack.len())..]
        .iter()
        .position(|&b| b == byte)
        .map(|p| p + from)
}

/// Extract the title from a fixture file, or `None` if the file has no
/// recognizable declaration. Stops reading as soon as the title is found.
/// I/O errors are swallowed: an unreadable file simply has no title.
pub fn scan_title(path: &Path) -> Option<String> {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return None,
    };

    let mut locator = DeclarationLocator::new();
    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
        let n = match file.read(&mut chunk) {
            Ok(0) => return None,
            Ok(n) => n,
            Err(_) => return None,
        };
        locator.push(&chunk[..n]);
        match locator.scan() {
            ScanStep::Found {
                title_start,
                title_end,
            } => {
                // Early return drops the file handle without reading the rest.
                let bytes = &locator.buffered()[title_start..title_end];
                return Some(String::from_utf8_lossy(bytes).into_owned());
            }
            ScanStep::NeedMore { releasable } => {
                locator.drain(releasable);
            }
        }
    }
}
