//! `protodec` — a decompiler for the Protocol Buffers v2 binary wire
//! format.
//!
//! Given an opaque byte sequence this crate can: parse it as a single
//! message and pretty-print its tag/value tree ([`print`]); infer and
//! render a synthesized `.proto` schema from the observed wire shapes
//! ([`schema`]); or scan an arbitrary blob for embedded
//! `FileDescriptorProto`-shaped messages and reconstruct `.proto` source
//! for each one found ([`scan`]).
//!
//! None of this requires an authoritative `.proto` — the wire parser
//! ([`parse`]) builds a schema-free tag-tree ([`node::Node`]) straight from
//! the bytes, using a heuristic to tell an embedded submessage apart from
//! an opaque byte string.

pub mod descriptor;
pub mod error;
pub mod java;
pub mod node;
pub mod parse;
pub mod print;
pub mod schema;
pub mod scan;
pub mod validate;
pub mod varint;
pub mod wire;

pub use error::{CliError, DecodeErrorKind, JavaEscapeError};
pub use node::{Node, NodeKind, RawMessage};
pub use parse::parse as parse_message;
