//! Term ID → node ID transform.
//!
//! Renderers use node IDs as DOM/SVG identifiers, so CURIE-style term IDs
//! (`GO:0008150`) are rewritten into a restricted alphabet. The transform is
//! injective over arbitrary strings and [`decode_node_id`] inverts it:
//!
//! - ASCII alphanumerics and `-` are kept,
//! - `:` becomes `_`,
//! - every other byte becomes `.` followed by two uppercase hex digits.
//!
//! `_` and `.` never pass through unchanged, so decoding is unambiguous.

use std::fmt::Write as _;

/// Map a stable term ID to its node ID.
pub fn encode_node_id(term_id: &str) -> String {
    let mut out = String::with_capacity(term_id.len());
    for byte in term_id.bytes() {
        match byte {
            b':' => out.push('_'),
            b'-' => out.push('-'),
            b if b.is_ascii_alphanumeric() => out.push(b as char),
            b => {
                // Writing into a String cannot fail.
                let _ = write!(out, ".{b:02X}");
            }
        }
    }
    out
}

/// Recover the term ID a node ID was produced from.
///
/// Returns `None` for strings that [`encode_node_id`] can never produce.
pub fn decode_node_id(node_id: &str) -> Option<String> {
    let bytes = node_id.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'_' => {
                out.push(b':');
                i += 1;
            }
            b'.' => {
                let hex = node_id.get(i + 1..i + 3)?;
                if !hex.bytes().all(|h| h.is_ascii_digit() || (b'A'..=b'F').contains(&h)) {
                    return None;
                }
                out.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            b'-' => {
                out.push(b'-');
                i += 1;
            }
            b if b.is_ascii_alphanumeric() => {
                out.push(b);
                i += 1;
            }
            _ => return None,
        }
    }
    String::from_utf8(out).ok()
}
