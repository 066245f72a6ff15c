//! Extraction of `Trim(start,end)` frame ranges from an AviSynth-style script.
//!
//! Only the `Trim()` calls are of interest; everything else in the script is ignored.  Each pair
//! is an inclusive frame-index range, reported in the order it appears in the file.

use std::fs;
use std::io;
use std::path::Path;

/// An inclusive frame-index range, `(start_frame, end_frame)`.
pub type TrimRange = (usize, usize);

/// Reads the given script and returns every `Trim(<digits>,<digits>)` range found in it.
pub fn trim_ranges(path: &Path) -> io::Result<Vec<TrimRange>> {
    let content = fs::read_to_string(path)?;
    Ok(extract_trims(&content))
}

fn extract_trims(content: &str) -> Vec<TrimRange> {
    const CALL: &str = "Trim(";
    let mut out = Vec::new();
    let mut rest = content;
    while let Some(found) = rest.find(CALL) {
        rest = &rest[found + CALL.len()..];
        if let Some((range, remainder)) = parse_pair(rest) {
            out.push(range);
            rest = remainder;
        }
    }
    out
}

fn parse_pair(s: &str) -> Option<(TrimRange, &str)> {
    let (start, s) = parse_digits(s)?;
    let s = s.strip_prefix(',')?;
    let (end, s) = parse_digits(s)?;
    let s = s.strip_prefix(')')?;
    Some(((start, end), s))
}

fn parse_digits(s: &str) -> Option<(usize, &str)> {
    let len = s.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    s[..len].parse().ok().map(|v| (v, &s[len..]))
}
