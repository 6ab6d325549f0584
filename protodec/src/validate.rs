//! Structural validator used to decide "is this length-delimited payload
//! plausibly an embedded message" (spec.md §4.B).
//!
//! This is a single forward scan over the candidate bytes, not a full
//! parse: it only checks the two things a genuine embedded message must
//! satisfy and a blob of other binary data almost never does by
//! coincidence — every wire type is one this tool understands, and field
//! numbers never decrease. A zero tag (all-zero padding byte) is skipped
//! rather than rejected, matching the same tolerance [`crate::parse`] has
//! for trailing NUL padding.
//!
//! An empty slice trivially validates (no fields to contradict the rule) —
//! in practice this never decides anything on its own, since an empty
//! payload is always classified as ASCII text first (spec.md §4.C checks
//! that heuristic before this one).

use crate::varint::read_varint;
use crate::wire::WireType;

/// `true` iff `buf` parses as a sequence of well-formed tag/value records
/// with non-decreasing field numbers, consuming the buffer exactly.
pub fn looks_like_message(buf: &[u8]) -> bool {
    let len = buf.len();
    let mut pos = 0usize;
    let mut prev_index: i64 = -1;
    loop {
        if pos < len {
            let (tag, next) = read_varint(buf, pos, len);
            pos = next;
            if tag == 0 {
                continue;
            }
            let (field_index, wire_type) = WireType::split_tag(tag as u64);
            if (field_index as i64) < prev_index {
                return false;
            }
            prev_index = field_index as i64;

            if pos >= len {
                return false;
            }

            match wire_type {
                Ok(WireType::Varint) => {
                    let (_, next) = read_varint(buf, pos, len);
                    pos = next;
                }
                Ok(WireType::Len) => {
                    let (payload_len, next) = read_varint(buf, pos, len);
                    if payload_len < 0 {
                        return false;
                    }
                    pos = next.saturating_add(payload_len as usize);
                }
                Ok(WireType::Fixed32) => pos = pos.saturating_add(4),
                Ok(WireType::Fixed64) => pos = pos.saturating_add(8),
                Err(_) => return false,
            }
        }

        if pos == len {
            return true;
        } else if pos > len {
            return false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_trivially_validates() {
        assert!(looks_like_message(&[]));
    }

    #[test]
    fn single_ascending_varint_field_is_valid() {
        // field 1, varint, value 1
        assert!(looks_like_message(&[0x08, 0x01]));
    }

    #[test]
    fn descending_field_numbers_are_rejected() {
        // field 2 varint 1, then field 1 varint 1 — field number goes down.
        assert!(!looks_like_message(&[0x10, 0x01, 0x08, 0x01]));
    }

    #[test]
    fn unsupported_wire_type_is_rejected() {
        // field 1, wire type 3 (start group) — unsupported.
        assert!(!looks_like_message(&[0x0b]));
    }

    #[test]
    fn truncated_length_delimited_field_is_rejected() {
        // field 1, len type, declared length 5, only 1 byte follows.
        assert!(!looks_like_message(&[0x0a, 0x05, 0x00]));
    }

    #[test]
    fn random_ascii_text_is_usually_rejected() {
        assert!(!looks_like_message(b"hello, world! this is plain text.\n"));
    }

    #[test]
    fn zero_tag_padding_is_skipped() {
        assert!(looks_like_message(&[0x08, 0x01, 0x00, 0x00]));
    }
}
