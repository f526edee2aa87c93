// SPDX-License-Identifier: MIT
//
// Window-size detection — ioctl first, escape-sequence round-trip second.
//
// Safety: the direct path necessarily uses `unsafe` for ioctl(TIOCGWINSZ),
// the standard POSIX window-size query. The unsafe block is minimal.
#![allow(unsafe_code)]
//
// Not every terminal answers TIOCGWINSZ (and some answer with zero
// columns), so there is a second path that every VT100 descendant
// supports: push the cursor toward the bottom-right corner — the terminal
// clamps the move at its actual edge — then ask where the cursor ended
// up. The cursor position reply *is* the geometry.
//
// The fallback is generic over `Read`/`Write` so the whole byte protocol
// is testable against in-memory buffers; only [`detect`] touches the real
// terminal.

use std::io::{self, Read, Write};

use crate::ansi;
use crate::error::{Error, SizeError};
use crate::input;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

/// Cap on the cursor-position reply.
///
/// The longest legitimate reply is `ESC [ 65535 ; 65535 R` — 14 bytes.
/// 32 leaves slack without letting a misbehaving terminal feed us
/// unbounded garbage.
const REPLY_CAP: usize = 32;

// ─── Direct Query ───────────────────────────────────────────────────────────

/// Query the terminal size via `ioctl(TIOCGWINSZ)` on stdout.
///
/// Returns `None` if stdout is not a terminal, the query fails, or the
/// terminal reports a zero dimension (some emulators answer the ioctl
/// but with zero columns — treated as "unsupported" so the caller falls
/// back).
#[cfg(unix)]
#[must_use]
fn query_ioctl() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
fn query_ioctl() -> Option<Size> {
    None
}

// ─── Detection ──────────────────────────────────────────────────────────────

/// Determine the terminal geometry.
///
/// Tries the direct ioctl query first; if that is unavailable or reports
/// a zero dimension, falls back to the escape-sequence round-trip against
/// the real terminal. Must only be called in raw mode: the fallback reads
/// the reply from stdin, and canonical mode would hold those bytes until
/// a newline that never comes.
///
/// # Errors
///
/// Returns [`Error::SizeDetection`] when both paths fail.
pub fn detect() -> Result<Size, Error> {
    if let Some(size) = query_ioctl() {
        return Ok(size);
    }
    fallback_probe(&mut input::raw_stdin(), &mut io::stdout().lock())
}

/// The escape-sequence fallback, generic over the terminal's two halves.
///
/// Writes cursor-to-bottom-right then a position query to `output`,
/// flushes, and parses the reply arriving on `input`. The reply read is
/// bounded: at most [`REPLY_CAP`] bytes, ending at the `R` terminator or
/// at end of input, whichever comes first — this can never hang on a
/// terminal that stays within VT100 behavior.
///
/// # Errors
///
/// Returns [`Error::SizeDetection`] naming the specific failure: an I/O
/// error on either half, a truncated reply, a malformed reply, or a
/// reported zero dimension.
pub fn fallback_probe(input: &mut impl Read, output: &mut impl Write) -> Result<Size, Error> {
    ansi::cursor_to_bottom_right(output)
        .and_then(|()| ansi::query_cursor_position(output))
        .and_then(|()| output.flush())
        .map_err(|e| Error::SizeDetection(SizeError::Io(e)))?;

    let reply = read_reply(input)?;
    parse_cursor_report(&reply)
}

/// Read the cursor-position reply byte-by-byte into a bounded buffer.
///
/// Stops at the `R` terminator. A zero-byte read here means the reply is
/// over (under `VMIN=0`/`VTIME=1` the terminal's answer either arrived
/// within the timeout or never will), so it ends the read rather than
/// retrying — the parser then rejects the truncated bytes.
fn read_reply(input: &mut impl Read) -> Result<Vec<u8>, Error> {
    let mut reply = Vec::with_capacity(REPLY_CAP);
    let mut byte = [0u8; 1];

    while reply.len() < REPLY_CAP {
        match input.read(&mut byte) {
            Ok(1) => {
                reply.push(byte[0]);
                if byte[0] == b'R' {
                    return Ok(reply);
                }
            }
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(Error::SizeDetection(SizeError::Io(e))),
        }
    }

    Err(Error::SizeDetection(SizeError::TruncatedReply))
}

/// Parse a cursor-position reply: `ESC [ rows ; cols R`.
///
/// Anything else — wrong framing, non-digit parameters, a missing
/// semicolon, extra parameters, out-of-range numbers — is a detection
/// failure, as is a reported zero dimension.
fn parse_cursor_report(reply: &[u8]) -> Result<Size, Error> {
    let malformed = || Error::SizeDetection(SizeError::MalformedReply(reply.to_vec()));

    let body = reply
        .strip_prefix(b"\x1b[")
        .and_then(|rest| rest.strip_suffix(b"R"))
        .ok_or_else(malformed)?;

    let sep = body
        .iter()
        .position(|&b| b == b';')
        .ok_or_else(malformed)?;
    let rows = parse_u16(&body[..sep]).ok_or_else(malformed)?;
    let cols = parse_u16(&body[sep + 1..]).ok_or_else(malformed)?;

    if rows == 0 || cols == 0 {
        return Err(Error::SizeDetection(SizeError::ZeroDimension));
    }

    Ok(Size { cols, rows })
}

/// Parse a non-empty ASCII decimal directly from bytes. No intermediate
/// `String`, no sign, no overflow past `u16`.
fn parse_u16(digits: &[u8]) -> Option<u16> {
    if digits.is_empty() {
        return None;
    }
    let mut value: u16 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return None;
        }
        value = value
            .checked_mul(10)?
            .checked_add(u16::from(b - b'0'))?;
    }
    Some(value)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
