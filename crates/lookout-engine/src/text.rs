//! Lenient text helpers for note files.
//!
//! Notes are read with undecodable byte sequences dropped, so one badly
//! encoded file never fails a scan.

use std::path::Path;

use tracing::debug;

/// Number of trailing non-empty lines in an event snippet.
pub const SNIPPET_LINES: usize = 5;

/// Maximum snippet length, in characters.
pub const SNIPPET_MAX_CHARS: usize = 300;

/// Separator between snippet lines.
pub const SNIPPET_SEPARATOR: &str = " · ";

/// Read a file as text, dropping invalid UTF-8. `None` if the file cannot be read.
pub fn read_lossy(path: &Path) -> Option<String> {
    match std::fs::read(path) {
        Ok(bytes) => Some(decode_lossy(&bytes)),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Skipping unreadable note");
            None
        }
    }
}

/// Decode UTF-8, silently dropping invalid sequences.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}

/// Count lines that contain something other than whitespace.
pub fn count_nonempty_lines(content: &str) -> usize {
    content.lines().filter(|l| !l.trim().is_empty()).count()
}

/// The last `n` non-empty lines, trimmed, joined with [`SNIPPET_SEPARATOR`]
/// and capped at `max_chars` characters.
pub fn tail_snippet(content: &str, n: usize, max_chars: usize) -> String {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let tail = &lines[lines.len().saturating_sub(n)..];
    truncate_chars(&tail.join(SNIPPET_SEPARATOR), max_chars).to_string()
}

/// Prefix of `s` holding at most `max_chars` characters.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
