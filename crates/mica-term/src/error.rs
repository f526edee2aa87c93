// SPDX-License-Identifier: MIT
//
// Error taxonomy for terminal control.
//
// Every variant is fatal: a program that cannot configure, measure, read,
// or write its terminal cannot safely continue, so there is no recovery
// path and no retry beyond what the individual operations do themselves
// (the input reader's timeout loop, the size probe's two-tier fallback).
// Errors propagate with `?` up to the binary, which restores the screen
// and exits non-zero.

use std::error;
use std::fmt;
use std::io;

// ─── Error ───────────────────────────────────────────────────────────────────

/// A fatal terminal-control failure.
#[derive(Debug)]
pub enum Error {
    /// Capturing, applying, or restoring terminal attributes failed.
    ///
    /// `op` names the failing call (`tcgetattr`, `tcsetattr`) so the
    /// message reads like the OS-level diagnostic it is.
    Config {
        /// The terminal call that failed.
        op: &'static str,
        /// The OS error reported for it.
        source: io::Error,
    },
    /// Both window-size detection paths failed.
    SizeDetection(SizeError),
    /// A terminal read failed with a non-retryable error.
    Input(io::Error),
    /// A screen-refresh write to the terminal failed.
    Render(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { op, source } => write!(f, "{op}: {source}"),
            Self::SizeDetection(reason) => write!(f, "window size detection failed: {reason}"),
            Self::Input(source) => write!(f, "read: {source}"),
            Self::Render(source) => write!(f, "write: {source}"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Config { source, .. } | Self::Input(source) | Self::Render(source) => {
                Some(source)
            }
            Self::SizeDetection(reason) => reason.source(),
        }
    }
}

// ─── SizeError ───────────────────────────────────────────────────────────────

/// Why the escape-sequence size fallback failed.
///
/// The direct `ioctl` path fails silently into the fallback; only the
/// fallback produces a diagnosable reason.
#[derive(Debug)]
pub enum SizeError {
    /// Writing the probe or reading the reply failed at the OS level.
    Io(io::Error),
    /// The reply did not match `ESC [ rows ; cols R`.
    MalformedReply(Vec<u8>),
    /// The reply buffer filled (or input ended) before the `R` terminator.
    TruncatedReply,
    /// The reply parsed but reported a zero dimension.
    ZeroDimension,
}

impl fmt::Display for SizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(source) => write!(f, "{source}"),
            Self::MalformedReply(bytes) => {
                write!(f, "malformed cursor position reply ({} bytes)", bytes.len())
            }
            Self::TruncatedReply => write!(f, "cursor position reply missing terminator"),
            Self::ZeroDimension => write!(f, "terminal reported a zero dimension"),
        }
    }
}

impl error::Error for SizeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(source) => Some(source),
            _ => None,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn config_display_names_the_call() {
        let err = Error::Config {
            op: "tcgetattr",
            source: io::Error::from_raw_os_error(25), // ENOTTY
        };
        let msg = err.to_string();
        assert!(msg.starts_with("tcgetattr: "));
        assert!(msg.len() > "tcgetattr: ".len());
    }

    #[test]
    fn config_source_is_the_os_error() {
        let err = Error::Config {
            op: "tcsetattr",
            source: io::Error::from_raw_os_error(5), // EIO
        };
        let source = err.source().unwrap();
        assert_eq!(
            source.downcast_ref::<io::Error>().unwrap().raw_os_error(),
            Some(5)
        );
    }

    #[test]
    fn input_display_and_source() {
        let err = Error::Input(io::Error::from_raw_os_error(5));
        assert!(err.to_string().starts_with("read: "));
        assert!(err.source().is_some());
    }

    #[test]
    fn render_display_and_source() {
        let err = Error::Render(io::Error::from_raw_os_error(32)); // EPIPE
        assert!(err.to_string().starts_with("write: "));
        assert!(err.source().is_some());
    }

    #[test]
    fn size_detection_io_chains_source() {
        let err = Error::SizeDetection(SizeError::Io(io::Error::from_raw_os_error(5)));
        assert!(err.to_string().contains("window size detection failed"));
        assert!(err.source().is_some());
    }

    #[test]
    fn size_detection_malformed_reports_length() {
        let err = Error::SizeDetection(SizeError::MalformedReply(b"\x1b[garbage".to_vec()));
        let msg = err.to_string();
        assert!(msg.contains("malformed"));
        assert!(msg.contains("9 bytes"));
        assert!(err.source().is_none());
    }

    #[test]
    fn size_detection_truncated_has_no_source() {
        let err = Error::SizeDetection(SizeError::TruncatedReply);
        assert!(err.to_string().contains("missing terminator"));
        assert!(err.source().is_none());
    }

    #[test]
    fn size_detection_zero_dimension() {
        let err = Error::SizeDetection(SizeError::ZeroDimension);
        assert!(err.to_string().contains("zero dimension"));
    }
}
