//! Descriptor scanner (spec.md §4.G): locates `FileDescriptorProto`-shaped
//! candidates inside an arbitrary byte blob (e.g. a linked executable) and
//! writes a reconstructed `.proto` file for each one found.
//!
//! `find` is a pure predicate over a byte range — it never touches the
//! filesystem. `grab` owns the outer loop and is the only place in this
//! crate that performs I/O on a per-descriptor basis, so a single bad
//! candidate (a structural mismatch the interpreter rejects, or a filename
//! that can't be created) never aborts the rest of the scan (spec.md §7).

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::descriptor::{self, DescriptorError};
use crate::node::RawMessage;
use crate::parse::parse;
use crate::validate::looks_like_message;
use crate::varint::{is_ascii_string, read_varint};

/// Wire tag for field 1, type 2 — the `filename` field of
/// `FileDescriptorProto`, and the signature [`find`] anchors on.
const FILENAME_TAG: u8 = 0x0a;
/// Wire tag for field 2, type 2 — the `package` field, checked right after
/// the filename payload to cut down on false positives.
const PACKAGE_TAG: u8 = 0x12;
/// Number of increasing NUL-terminated end-offsets [`find`] tries per
/// anchor before giving up and advancing past it (spec.md §4.G step 2).
const MAX_END_PROBES: usize = 10;

/// One accepted candidate: its byte range within the scanned buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Start offset (inclusive) of the candidate, relative to the buffer
    /// passed to [`find`].
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
}

/// Scans `buf[from..]` for the next candidate `FileDescriptorProto`.
///
/// Implements spec.md §4.G's `findSerializedPB`: anchor on the next
/// `0x0a` byte, then try up to [`MAX_END_PROBES`] increasing NUL-terminated
/// end offsets, requiring the filename and package payloads to be
/// printable ASCII and the whole range to validate as a well-formed
/// message. Returns `None` once no anchor byte remains.
pub fn find(buf: &[u8], from: usize) -> Option<Candidate> {
    let len = buf.len();
    let mut p = from;
    'anchors: loop {
        while p < len && buf[p] != FILENAME_TAG {
            p += 1;
        }
        if p >= len {
            return None;
        }

        let mut end_ptr = p + 1;
        for _ in 0..MAX_END_PROBES {
            while end_ptr < len.saturating_sub(1) && buf[end_ptr] != 0 {
                end_ptr += 1;
            }
            if end_ptr >= len.saturating_sub(1) {
                break;
            }

            if let Some(candidate_end) = probe(buf, p, end_ptr) {
                debug!(start = p, end = candidate_end, "descriptor candidate accepted");
                return Some(Candidate {
                    start: p,
                    end: candidate_end,
                });
            }
            end_ptr += 1;
        }

        p += 1;
        continue 'anchors;
    }
}

/// Checks one `(p, end_ptr)` trial: filename payload, then package tag and
/// payload, then a full structural validation. Returns `Some(end_ptr)` iff
/// the whole range from `p` to `end_ptr` validates.
fn probe(buf: &[u8], p: usize, end_ptr: usize) -> Option<usize> {
    let (filename_len, after_len) = read_varint(buf, p + 1, end_ptr);
    if filename_len <= 0 {
        return None;
    }
    let filename_len = filename_len as usize;
    let filename_end = after_len.checked_add(filename_len)?;
    if after_len >= end_ptr || filename_end >= end_ptr {
        return None;
    }
    if !is_ascii_string(&buf[after_len..filename_end]) {
        return None;
    }
    if buf[filename_end] != PACKAGE_TAG {
        return None;
    }

    let (package_len, after_package_len) = read_varint(buf, filename_end + 1, end_ptr);
    if package_len <= 0 {
        return None;
    }
    let package_len = package_len as usize;
    let package_end = after_package_len.checked_add(package_len)?;
    if after_package_len >= end_ptr || package_end >= end_ptr {
        return None;
    }
    if !is_ascii_string(&buf[after_package_len..package_end]) {
        return None;
    }

    if looks_like_message(&buf[p..end_ptr]) {
        Some(end_ptr)
    } else {
        None
    }
}

/// Outcome of writing one descriptor candidate to disk.
pub enum GrabOutcome {
    /// Wrote `path` successfully.
    Written {
        /// The `.proto` file path written, as named by the descriptor's
        /// own `filename` field.
        path: PathBuf,
    },
    /// The candidate parsed and had the descriptor fingerprint, but the
    /// interpreter couldn't render it (spec.md §7's recoverable structural
    /// mismatch).
    Rejected {
        /// The descriptor's own `filename` field, if it got that far.
        filename: Option<String>,
        /// Why it was rejected.
        error: DescriptorError,
    },
    /// The candidate's `filename` field couldn't be created as a path on
    /// this filesystem.
    IoError {
        /// The path that failed to open.
        path: PathBuf,
        /// Underlying error.
        error: std::io::Error,
    },
}

/// Scans `buf` for every embedded descriptor and writes a `.proto` file
/// for each into `out_dir`. Returns the number of files successfully
/// written (spec.md §4.G: `grab` returns "count of files written").
///
/// A malformed candidate (fails [`descriptor::render`]) or an
/// uncreatable output path is reported via `on_outcome` and does not stop
/// the scan — only a parse/validate failure of the candidate range itself
/// is impossible to reach this function, since [`find`] already validated
/// it.
pub fn grab(buf: &[u8], out_dir: &Path, mut on_outcome: impl FnMut(&GrabOutcome)) -> usize {
    let mut written = 0usize;
    let mut pos = 0usize;
    while pos < buf.len() {
        let Some(candidate) = find(buf, pos) else {
            break;
        };

        let msg = parse(&buf[candidate.start..candidate.end]);
        let outcome = process_candidate(&msg, out_dir);
        if let Some(outcome) = outcome {
            if matches!(outcome, GrabOutcome::Written { .. }) {
                written += 1;
            }
            on_outcome(&outcome);
        }

        pos = candidate.end + 1;
    }
    written
}

/// Renders and writes one already-parsed candidate, if it has the
/// descriptor fingerprint. Returns `None` for a candidate that parsed
/// clean but isn't descriptor-shaped (spec.md's `isSerializedMessages`
/// check) — silently skipped, matching the original.
fn process_candidate(msg: &RawMessage, out_dir: &Path) -> Option<GrabOutcome> {
    if msg.is_error() || !descriptor::looks_like_descriptor(msg.root()) {
        return None;
    }

    let filename = match msg.root().get(1) {
        Some(node) => match &node.kind {
            crate::node::NodeKind::Bytes(bytes) => {
                String::from_utf8_lossy(bytes).replace('/', std::path::MAIN_SEPARATOR_STR)
            }
            _ => return None,
        },
        None => return None,
    };

    let text = match descriptor::render(msg.root()) {
        Ok(text) => text,
        Err(error) => {
            warn!(%filename, %error, "descriptor candidate failed to render, skipping");
            return Some(GrabOutcome::Rejected {
                filename: Some(filename),
                error,
            });
        }
    };

    let path = out_dir.join(&filename);
    match std::fs::write(&path, text) {
        Ok(()) => Some(GrabOutcome::Written { path }),
        Err(error) => Some(GrabOutcome::IoError { path, error }),
    }
}
