//! Fuzzes the `--java` unescape preprocessor with structured input: a
//! string of literal bytes interleaved with escape directives, so the
//! corpus actually exercises the escape grammar instead of mostly hitting
//! `TrailingBackslash` on raw bytes that start with `\`.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Piece {
    Literal(u8),
    Escape(EscapeKind),
}

#[derive(Arbitrary, Debug)]
enum EscapeKind {
    Newline,
    Tab,
    CarriageReturn,
    Quote,
    Backslash,
    SingleQuote,
    Unicode(u16),
}

fuzz_target!(|pieces: Vec<Piece>| {
    let mut input = Vec::new();
    for piece in pieces {
        match piece {
            Piece::Literal(byte) if byte != b'\\' => input.push(byte),
            Piece::Literal(_) => input.extend_from_slice(br"\\"),
            Piece::Escape(EscapeKind::Newline) => input.extend_from_slice(br"\n"),
            Piece::Escape(EscapeKind::Tab) => input.extend_from_slice(br"\t"),
            Piece::Escape(EscapeKind::CarriageReturn) => input.extend_from_slice(br"\r"),
            Piece::Escape(EscapeKind::Quote) => input.extend_from_slice(br#"\""#),
            Piece::Escape(EscapeKind::Backslash) => input.extend_from_slice(br"\\"),
            Piece::Escape(EscapeKind::SingleQuote) => input.extend_from_slice(br"\'"),
            Piece::Escape(EscapeKind::Unicode(value)) => {
                input.extend_from_slice(format!("\\u{value:04x}").as_bytes());
            }
        }
    }

    // Must never panic, regardless of whether the synthesized escape
    // grammar happens to be well-formed.
    let _ = protodec::java::unescape_java(&input);
});
