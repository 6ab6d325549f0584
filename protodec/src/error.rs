//! Error types for the wire parser, the Java-escape preprocessor, and the CLI.

use std::path::PathBuf;

use thiserror::Error;

/// Failure recorded on a [`crate::node::RawMessage`] after a failed parse.
///
/// Mirrors the two failure shapes the original tool's parser can hit
/// (spec.md §7): either the input ran out mid-record, or a tag declared a
/// wire type outside `{0, 1, 2, 5}`. The error is latched on the
/// `RawMessage`, not returned from `parse` directly — callers check
/// [`crate::node::RawMessage::error`] after the fact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    /// The generic fallback: an empty input, or a length-delimited payload
    /// whose declared length overran its enclosing range. Kept distinct
    /// from [`DecodeErrorKind::Truncated`] because the original parser
    /// never bothered composing a detailed message for this case either —
    /// both are surfaced identically, so there's nothing more specific to
    /// say here.
    #[error("data corrupted")]
    DataCorrupted,

    /// A tag was read but no bytes remained for its value.
    #[error("offset 0x{offset:x}")]
    Truncated {
        /// Byte offset (relative to the start of the parse) of the tag that
        /// had no room left for its payload.
        offset: usize,
    },

    /// A tag's low three bits named a wire type this tool doesn't support
    /// (anything other than varint, fixed64, length-delimited, or fixed32).
    #[error("unknown data type\noffset 0x{offset:x}\ntype = {wire_type}\nidx = {field_index}")]
    UnknownWireType {
        /// Byte offset of the tag that named the unsupported wire type.
        offset: usize,
        /// The offending wire type value (low 3 bits of the tag).
        wire_type: u64,
        /// The field number the tag named (high bits of the tag).
        field_index: u64,
    },
}

/// Failure from the `--java` descriptor-unescaping preprocessor (spec.md §6,
/// §9). Restricted to the escape grammar Java-embedded descriptor dumps
/// actually use — not general string unescaping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JavaEscapeError {
    /// Input ended right after a `\`.
    #[error("unescaped backslash at the end of a string.")]
    TrailingBackslash,

    /// `\` followed by a byte that isn't one of `n t r " \ ' u`.
    #[error("unknown escape sequence: \\{0}.")]
    UnknownEscape(char),

    /// `\u` wasn't followed by four hex digits before the input ended.
    #[error("not enough hexadecimal digits at the end of a string.")]
    ShortUnicodeEscape,

    /// A `\uHHHH` digit wasn't `[0-9a-fA-F]`.
    #[error("unexpected hexadecimal digit {0}.")]
    NotHexDigit(char),

    /// `\uHHHH` decoded to a value above `0xFF` — this preprocessor only
    /// decodes the single-byte subset Java-embedded descriptors use, not
    /// general Unicode (spec.md §9).
    #[error("unexpected escaped symbol at pos 0x{pos:x} (0x{value:x}).")]
    OutOfRange {
        /// Byte offset of the `u` that introduced the escape.
        pos: usize,
        /// The decoded (out-of-range) code point.
        value: u16,
    },
}

/// Top-level error type for the `protodec` binary.
///
/// `Display` renders exactly the message text the original tool prints
/// after its `"ERROR: "` prefix (spec.md §7); `main` supplies the prefix and
/// maps each variant to the documented exit code.
#[derive(Debug, Error)]
pub enum CliError {
    /// The input file is empty or doesn't exist.
    #[error("file '{path}' is empty or not found.", path = path.display())]
    EmptyOrMissingFile {
        /// The path that was requested.
        path: PathBuf,
    },

    /// `--java` preprocessing failed.
    #[error(transparent)]
    JavaEscape(#[from] JavaEscapeError),

    /// `--print`/`--schema` parsing failed.
    #[error("parsing failed {0}.")]
    Parse(DecodeErrorKind),

    /// `--grab` (or default) mode found no embedded descriptors.
    #[error("nothing is found.")]
    NothingFound,

    /// The output directory for `--grab` couldn't be created.
    #[error("can't create output directory '{path}': {source}", path = path.display())]
    OutDir {
        /// The directory that couldn't be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
