//! Fuzzes the tag-tree parser against arbitrary bytes.
//!
//! `parse` must never panic and must always terminate (the 16-byte varint
//! cap and the frame-stack's monotonic end-offsets are what bound it) -
//! the only thing checked here is the absence of a crash/hang; a non-empty
//! error string is an entirely expected outcome for most inputs.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut buf = data.to_vec();
    buf.push(0);
    buf.push(0);
    let msg = protodec::parse_message(&buf);
    let _ = protodec::print::print(msg.root());
    let _ = protodec::schema::print(msg.root());
});
