//! Streaming in-place title replacement.
//!
//! The source file is streamed chunk by chunk into a sibling temporary file.
//! Until the declaration is located the bytes pass through the same
//! [`DeclarationLocator`](crate::scan) the scanner uses; bytes the locator
//! releases are written out immediately, so memory stays bounded. Once the
//! existing title span is found, the new title is spliced in and everything
//! after it is copied through verbatim. Only the first declaration is ever
//! rewritten.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::scan::{DeclarationLocator, ScanStep};

/// Replace the first declaration's title with `new_title`.
///
/// Returns `Ok(true)` when a title was replaced and the temporary file was
/// renamed over the original, `Ok(false)` when no declaration was found (the
/// temporary file is discarded and the original is untouched). Errors leave
/// the original untouched as well; callers treat them as non-fatal.
pub fn rewrite_title(path: &Path, new_title: &str) -> io::Result<bool> {
    let mut src = File::open(path)?;
    // The temp file is created 0600; carry the original's permissions over
    // so the persist below does not silently reset them.
    let permissions = src.metadata()?.permissions();
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;

    let mut locator = DeclarationLocator::new();
    let mut chunk = [0u8; 8192];
    loop {
        let n = src.read(&mut chunk)?;
        if n == 0 {
            // End of file, no declaration: discard the temp copy.
            return Ok(false);
        }
        locator.push(&chunk[..n]);
        match locator.scan() {
            ScanStep::Found {
                title_start,
                title_end,
            } => {
                let buf = locator.buffered();
                tmp.write_all(&buf[..title_start])?;
                tmp.write_all(new_title.as_bytes())?;
                tmp.write_all(&buf[title_end..])?;
                break;
            }
            ScanStep::NeedMore { releasable } => {
                let released = locator.drain(releasable);
                tmp.write_all(&released)?;
            }
        }
    }

    // Everything past the first match passes straight through.
    io::copy(&mut src, &mut tmp)?;
    tmp.flush()?;
    tmp.as_file().set_permissions(permissions)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(true)
}
