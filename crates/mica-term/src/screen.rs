// SPDX-License-Identifier: MIT
//
// Screen refresh — clear, repaint the placeholder layout, home the cursor.
//
// Every refresh redraws the whole screen: one `~` filler per row, the way
// an editor marks rows past the end of the buffer. This is the seed of a
// renderer that will eventually diff against the previous frame and touch
// only changed cells; full redraw is a known inefficiency of this stage,
// not a defect.

use std::io::{self, Write};

use crate::ansi;
use crate::error::Error;
use crate::output::OutputBuffer;
use crate::size::Size;

/// Glyph drawn on every placeholder row.
const FILLER: u8 = b'~';

/// Repaint the screen for the given geometry.
///
/// Composes the whole frame into `frame`, then writes it to stdout in a
/// single write()/flush() pair.
///
/// # Errors
///
/// Returns [`Error::Render`] if the write to the terminal fails.
pub fn refresh(frame: &mut OutputBuffer, size: Size) -> Result<(), Error> {
    frame.clear();
    compose(frame, size).map_err(Error::Render)?;
    frame.flush_stdout().map_err(Error::Render)
}

/// Emit one frame: clear, home, filler rows, home.
///
/// Rows are separated by `\r\n` — raw mode disables output
/// post-processing, so the carriage return must be explicit. The last
/// row gets no separator: a line break there would scroll the terminal
/// and leave a blank line. The trailing cursor-home puts the cursor back
/// at the top-left after drawing.
fn compose(w: &mut impl Write, size: Size) -> io::Result<()> {
    ansi::clear_screen(w)?;
    ansi::cursor_home(w)?;

    for row in 0..size.rows {
        w.write_all(&[FILLER])?;
        if row + 1 < size.rows {
            w.write_all(b"\r\n")?;
        }
    }

    ansi::cursor_home(w)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn compose_frame(rows: u16, cols: u16) -> Vec<u8> {
        let mut frame = OutputBuffer::new();
        compose(&mut frame, Size { cols, rows }).unwrap();
        frame.as_bytes().to_vec()
    }

    #[test]
    fn standard_terminal_frame() {
        let frame = compose_frame(24, 80);

        let mut expected = Vec::new();
        expected.extend_from_slice(b"\x1b[2J\x1b[H");
        for row in 0..24 {
            expected.push(b'~');
            if row + 1 < 24 {
                expected.extend_from_slice(b"\r\n");
            }
        }
        expected.extend_from_slice(b"\x1b[H");

        assert_eq!(frame, expected);
    }

    #[test]
    fn n_fillers_and_n_minus_one_separators() {
        for rows in [1u16, 2, 3, 24, 100] {
            let frame = compose_frame(rows, 80);
            let s = std::str::from_utf8(&frame).unwrap();
            assert_eq!(s.matches('~').count(), usize::from(rows));
            assert_eq!(s.matches("\r\n").count(), usize::from(rows) - 1);
        }
    }

    #[test]
    fn no_separator_after_last_row() {
        let frame = compose_frame(24, 80);
        // The frame ends with the final filler then cursor-home — never
        // a line break that would scroll.
        assert!(frame.ends_with(b"~\x1b[H"));
    }

    #[test]
    fn starts_with_clear_then_home() {
        let frame = compose_frame(24, 80);
        assert!(frame.starts_with(b"\x1b[2J\x1b[H"));
    }

    #[test]
    fn single_row_has_no_separator() {
        let frame = compose_frame(1, 80);
        assert_eq!(frame, b"\x1b[2J\x1b[H~\x1b[H");
    }

    #[test]
    fn zero_rows_draws_nothing() {
        let frame = compose_frame(0, 80);
        assert_eq!(frame, b"\x1b[2J\x1b[H\x1b[H");
    }
}
