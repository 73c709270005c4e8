//! Header declaration extraction
//!
//! Turns C headers into declaration text for the FFI layer by dropping every
//! preprocessor line. This is a line filter, not a preprocessor: the bodies
//! of `#if`/`#endif` blocks are kept, and only the first line of a
//! backslash-continued directive is removed. The consumed headers are written
//! with that in mind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Separator between the blocks of consecutive headers
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// A header could not be read
#[derive(Debug, Error)]
#[error("Failed to read header {}: {source}", .path.display())]
pub struct HeaderReadError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Read access to header files
pub trait HeaderSource {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Reads headers from the filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsHeaderSource;

impl HeaderSource for FsHeaderSource {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

impl<S: HeaderSource + ?Sized> HeaderSource for &S {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        (**self).read_to_string(path)
    }
}

/// Remove preprocessor lines from one header.
///
/// `\r\n`, `\n` and a lone `\r` all end a line and are normalized to `\n`.
/// A line is dropped when its first non-whitespace character is `#`. All
/// other lines are kept in order.
#[must_use]
pub fn strip_directives(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    text.split_inclusive('\n')
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect()
}

/// Extract the declaration corpus from `headers`, in order.
///
/// Each header contributes its [`strip_directives`] block; blocks are joined
/// by [`BLOCK_SEPARATOR`]. The first unreadable header aborts extraction.
pub fn extract<P: AsRef<Path>>(
    source: &impl HeaderSource,
    headers: &[P],
) -> Result<String, HeaderReadError> {
    let blocks = headers
        .iter()
        .map(|header| {
            let path = header.as_ref();
            crate::debug!("extracting declarations from {}", path.display());
            source
                .read_to_string(path)
                .map(|text| strip_directives(&text))
                .map_err(|source| HeaderReadError {
                    path: path.to_path_buf(),
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(blocks.join(BLOCK_SEPARATOR))
}
