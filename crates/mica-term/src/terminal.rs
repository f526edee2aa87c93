// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode entry, exit, and guaranteed restoration.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), isatty, and raw fd writes. These are the standard POSIX
// interfaces for terminal control — there is no safe alternative. Each
// unsafe block is minimal and documented.
#![allow(unsafe_code)]
//
// This module owns the terminal's raw state. [`RawMode::enter`] captures
// the original termios, switches the terminal to byte-at-a-time
// non-echoing input, and returns a guard. The guard restores the original
// attributes on every exit route: the quit path calls the consuming
// [`restore`](RawMode::restore) so a restoration failure is observable,
// and `Drop` covers early returns, propagated errors, and unwinding.
//
// The panic hook deserves special mention: it bypasses Rust's stdout lock
// entirely, writing a pre-built clear sequence directly to fd 1. This
// prevents deadlock if the panic happened while holding the stdout lock
// (common during frame rendering). One raw write, termios restored, then
// the original panic handler prints its message to a working terminal.
//
// Why not crossterm? Same reason we wrote our own ANSI module: an editor
// substrate needs direct control over every terminal interaction, not an
// abstraction layer that might make different choices than we would.

use std::io;
#[cfg(not(unix))]
use std::io::Write;
use std::sync::{Mutex, Once};

use crate::error::Error;

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of original termios for panic recovery.
///
/// The [`RawMode`] guard owns its own copy, but the panic hook can't
/// access it. This global backup — behind a [`Mutex`], not `static mut` —
/// lets the hook restore the terminal without the guard. It is cleared
/// after a successful restore so reapplication stays exactly-once.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, original);
            }
        }
    }
}

/// Screen reset for emergency use: clear everything, cursor to top-left.
///
/// Written before the panic message so the message lands on a clean
/// screen instead of mid-frame garbage.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[2J\x1b[H";

/// Panic hook guard — ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
///
/// Without this, a panic in raw mode leaves the user's terminal broken:
/// no echo, no line editing, no way to read the error message. Our hook
/// writes [`EMERGENCY_RESTORE`] directly to fd 1 (bypassing Rust's stdout
/// lock to avoid deadlock), restores termios, then delegates to the
/// original panic handler so the error prints to a working terminal.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write the screen reset directly to stdout's file descriptor.
///
/// Bypasses Rust's `io::stdout()` lock to avoid deadlocking if the panic
/// occurred while the lock was held (e.g., mid-frame flush).
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── RawMode ────────────────────────────────────────────────────────────────

/// Raw-mode guard with RAII restoration.
///
/// [`enter`](Self::enter) captures the current terminal attributes, applies
/// the raw set, and returns this guard. The original attributes come back
/// exactly once: through the consuming [`restore`](Self::restore) on the
/// normal exit path (where a failure must be observable, because a terminal
/// left in raw mode corrupts the user's shell), or through `Drop` on every
/// other path.
///
/// # Example
///
/// ```no_run
/// use mica_term::terminal::RawMode;
///
/// let raw = RawMode::enter()?;
/// // ... render frames, read keys ...
/// raw.restore()?;
/// # Ok::<(), mica_term::error::Error>(())
/// ```
#[derive(Debug)]
pub struct RawMode {
    /// Original termios saved before entering raw mode. `None` once restored.
    #[cfg(unix)]
    original: Option<libc::termios>,
}

impl RawMode {
    /// Enter raw mode on stdin.
    ///
    /// Captures the current attributes, then disables: break-triggered
    /// SIGINT, CR-to-NL input translation, parity checking, 8th-bit
    /// stripping, software flow control (`c_iflag`); output
    /// post-processing (`c_oflag`); echo, canonical line buffering,
    /// signal generation, and extended input processing (`c_lflag`).
    /// Forces 8-bit characters (`c_cflag`). Sets `VMIN = 0`, `VTIME = 1`:
    /// a read returns as soon as any bytes are available, or empty after
    /// 100 ms — bounded wait, never an indefinite block.
    ///
    /// Also installs the panic hook (once per process) so a panic in raw
    /// mode still restores the terminal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the attribute capture or application
    /// fails — including when stdin is not a terminal.
    #[cfg(unix)]
    pub fn enter() -> Result<Self, Error> {
        install_panic_hook();

        unsafe {
            let mut original: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(libc::STDIN_FILENO, &raw mut original) != 0 {
                return Err(Error::Config {
                    op: "tcgetattr",
                    source: io::Error::last_os_error(),
                });
            }

            // Save to the global backup for the panic hook before touching
            // the terminal, so even a failure mid-apply is recoverable.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(original);
            }

            let mut raw = original;
            raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
            raw.c_oflag &= !libc::OPOST;
            raw.c_cflag |= libc::CS8;
            raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN);

            // VMIN=0, VTIME=1: read() returns whatever is available, or
            // nothing after 100ms. The input loop turns that into
            // exactly-one-byte semantics.
            raw.c_cc[libc::VMIN] = 0;
            raw.c_cc[libc::VTIME] = 1;

            if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const raw) != 0 {
                return Err(Error::Config {
                    op: "tcsetattr",
                    source: io::Error::last_os_error(),
                });
            }

            Ok(Self {
                original: Some(original),
            })
        }
    }

    /// Non-unix stub: nothing to configure, nothing to restore.
    #[cfg(not(unix))]
    pub fn enter() -> Result<Self, Error> {
        install_panic_hook();
        Ok(Self {})
    }

    /// Restore the original attributes, consuming the guard.
    ///
    /// The quit path calls this instead of relying on `Drop` so that a
    /// restoration failure is routed to the fatal-error path rather than
    /// silently swallowed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if reapplying the saved attributes fails.
    pub fn restore(mut self) -> Result<(), Error> {
        self.restore_once()
    }

    /// Reapply the saved attributes if they haven't been reapplied yet.
    ///
    /// Shared by [`restore`](Self::restore) and `Drop`; taking the saved
    /// termios out of the `Option` makes restoration exactly-once no
    /// matter how many paths run.
    #[cfg(unix)]
    fn restore_once(&mut self) -> Result<(), Error> {
        if let Some(original) = self.original.take() {
            unsafe {
                if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const original) != 0 {
                    return Err(Error::Config {
                        op: "tcsetattr",
                        source: io::Error::last_os_error(),
                    });
                }
            }

            // Restored successfully — the panic hook no longer needs it.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }
        }
        Ok(())
    }

    #[cfg(not(unix))]
    #[allow(clippy::unnecessary_wraps, clippy::unused_self)]
    fn restore_once(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = self.restore_once();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
