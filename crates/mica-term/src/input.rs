// SPDX-License-Identifier: MIT
//
// Key input — exactly one byte per call, bounded wait underneath.
//
// Safety: the unix stdin handle necessarily uses `unsafe` for raw
// `read()` on fd 0. Going through `io::stdin()` would add a BufReader
// between us and the terminal; in raw mode every byte must be consumed
// the moment the terminal delivers it, not parked in a userspace buffer.
#![allow(unsafe_code)]
//
// Raw mode is configured with VMIN=0, VTIME=1: a read returns whatever
// is available immediately, or nothing after 100ms. [`read_key`] wraps
// that in a retry loop so callers see simple blocking
// one-byte-at-a-time semantics while no single syscall ever blocks
// longer than the timeout.

use std::io::{self, Read};

use crate::error::Error;

// ─── Raw Stdin ──────────────────────────────────────────────────────────────

/// Unbuffered reader over stdin's file descriptor.
///
/// Implements [`Read`] by calling `read(2)` directly, so the raw-mode
/// VMIN/VTIME semantics pass through untranslated. Shared with the
/// window-size probe, which reads its escape reply from the same place
/// keystrokes come from.
#[cfg(unix)]
pub(crate) struct RawStdin;

#[cfg(unix)]
impl Read for RawStdin {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        #[allow(clippy::cast_sign_loss)] // n >= 0 guaranteed above.
        let count = n as usize;
        Ok(count)
    }
}

/// The terminal's input half.
#[cfg(unix)]
pub(crate) fn raw_stdin() -> impl Read {
    RawStdin
}

#[cfg(not(unix))]
pub(crate) fn raw_stdin() -> impl Read {
    io::stdin()
}

// ─── Key Reading ────────────────────────────────────────────────────────────

/// Wait for one keypress on the terminal and return it.
///
/// Loops over bounded-wait reads until a byte arrives. Never consumes
/// more than one byte per call.
///
/// # Errors
///
/// Returns [`Error::Input`] if a read fails with anything other than
/// "would block" or "interrupted".
pub fn read_key() -> Result<u8, Error> {
    read_key_from(&mut raw_stdin())
}

/// The retry loop behind [`read_key`], generic over the byte source.
///
/// A zero-byte read is the VTIME timeout expiring with nothing typed —
/// retry, not failure. `WouldBlock` and `Interrupted` are likewise
/// benign. Everything else is fatal.
///
/// # Errors
///
/// Returns [`Error::Input`] on any non-retryable read failure.
pub fn read_key_from(input: &mut impl Read) -> Result<u8, Error> {
    let mut byte = [0u8; 1];
    loop {
        match input.read(&mut byte) {
            Ok(1) => return Ok(byte[0]),
            Ok(_) => {}
            Err(e) if matches!(
                e.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
            ) => {}
            Err(e) => return Err(Error::Input(e)),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Scripted byte source: each step is one `read()` outcome.
    enum Step {
        Timeout,
        WouldBlock,
        Interrupted,
        Byte(u8),
        Fail(i32),
    }

    struct Scripted {
        steps: std::vec::IntoIter<Step>,
    }

    impl Scripted {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: steps.into_iter(),
            }
        }
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.steps.next().expect("reader polled past script end") {
                Step::Timeout => Ok(0),
                Step::WouldBlock => Err(io::Error::from(io::ErrorKind::WouldBlock)),
                Step::Interrupted => Err(io::Error::from(io::ErrorKind::Interrupted)),
                Step::Byte(b) => {
                    buf[0] = b;
                    Ok(1)
                }
                Step::Fail(errno) => Err(io::Error::from_raw_os_error(errno)),
            }
        }
    }

    #[test]
    fn returns_the_first_byte() {
        let mut input = Scripted::new(vec![Step::Byte(b'x')]);
        assert_eq!(read_key_from(&mut input).unwrap(), b'x');
    }

    #[test]
    fn retries_through_timeouts() {
        let mut input = Scripted::new(vec![
            Step::Timeout,
            Step::Timeout,
            Step::Timeout,
            Step::Byte(b'q'),
        ]);
        assert_eq!(read_key_from(&mut input).unwrap(), b'q');
    }

    #[test]
    fn retries_through_would_block_and_interrupt() {
        let mut input = Scripted::new(vec![
            Step::WouldBlock,
            Step::Interrupted,
            Step::Byte(0x11),
        ]);
        assert_eq!(read_key_from(&mut input).unwrap(), 0x11);
    }

    #[test]
    fn fatal_read_error_is_input_error() {
        let mut input = Scripted::new(vec![Step::Timeout, Step::Fail(5)]); // EIO
        let err = read_key_from(&mut input).unwrap_err();
        match err {
            Error::Input(source) => assert_eq!(source.raw_os_error(), Some(5)),
            other => panic!("expected Input, got {other}"),
        }
    }

    #[test]
    fn consumes_exactly_one_byte() {
        // Two bytes queued; one call must take only the first.
        let mut input = io::Cursor::new(b"ab".to_vec());
        assert_eq!(read_key_from(&mut input).unwrap(), b'a');
        assert_eq!(input.position(), 1);
        assert_eq!(read_key_from(&mut input).unwrap(), b'b');
    }
}
