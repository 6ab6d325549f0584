//! Wire type tags (spec.md §2).

/// The four wire types this tool understands. Groups (3, "SGROUP"/4,
/// "EGROUP") are deliberately absent — spec.md §2 calls them out as
/// obsolete and unsupported, so a tag naming one surfaces as
/// [`crate::error::DecodeErrorKind::UnknownWireType`] rather than as a
/// variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    /// Tag low bits `000`: a base-128 varint payload.
    Varint = 0,
    /// Tag low bits `001`: an 8-byte little-endian payload.
    Fixed64 = 1,
    /// Tag low bits `010`: a varint length prefix followed by that many
    /// bytes — a `string`/`bytes`/embedded message, heuristically told
    /// apart at print time.
    Len = 2,
    /// Tag low bits `101`: a 4-byte little-endian payload.
    Fixed32 = 5,
}

impl WireType {
    /// Splits a decoded tag varint into (field number, wire type).
    ///
    /// Returns `Err(wire_type_value)` when the low three bits name a wire
    /// type this tool doesn't support, so the caller can build a
    /// [`crate::error::DecodeErrorKind::UnknownWireType`] with the offending
    /// raw value.
    pub fn split_tag(tag: u64) -> (u64, Result<WireType, u64>) {
        let field_index = tag >> 3;
        let raw = tag & 0x7;
        let wire_type = match raw {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::Len),
            5 => Ok(WireType::Fixed32),
            other => Err(other),
        };
        (field_index, wire_type)
    }

    /// The low three tag bits this wire type occupies, for re-deriving a
    /// tag varint (used by [`crate::node::Node::size_in_bytes`]).
    pub fn tag_bits(self) -> u64 {
        self as u64
    }
}
