//! Fuzzes the descriptor scanner end to end: `find`/`grab` over arbitrary
//! bytes must never panic, loop forever, or write outside a scratch
//! directory, no matter how the input is laced with `0x0a` anchors and
//! stray NUL bytes.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(dir) = tempfile::tempdir() else {
        return;
    };
    let _ = protodec::scan::grab(data, dir.path(), |_outcome| {});
});
