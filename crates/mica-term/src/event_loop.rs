// SPDX-License-Identifier: MIT
//
// Event loop — refresh, read one key, dispatch, repeat.
//
// The loop has exactly two states: running, and gone. Each iteration
// repaints the placeholder screen and hands the next input byte to the
// application; the application answers with [`Action::Continue`] or
// [`Action::Quit`]. There is no tick, no resize handling, no render
// dirtiness tracking yet — one keypress, one frame.
//
// Raw mode brackets the whole loop. The guard is restored explicitly on
// the quit path (so a restore failure is reported, not swallowed) and by
// `Drop` on every error path that propagates out with `?`.

use std::io::{self, Write};

use crate::ansi;
use crate::error::Error;
use crate::input;
use crate::output::OutputBuffer;
use crate::screen;
use crate::size;
use crate::terminal::RawMode;

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop to do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue running.
    Continue,
    /// Exit the event loop cleanly.
    Quit,
}

/// Application interface for the event loop.
///
/// Implement this to put behavior behind the terminal substrate. The
/// loop calls [`on_key`](App::on_key) once per input byte, after the
/// screen has been refreshed.
pub trait App {
    /// Handle one input byte.
    ///
    /// Return [`Action::Quit`] to exit the event loop.
    fn on_key(&mut self, key: u8) -> Action;
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The terminal event loop.
///
/// Owns the frame buffer. Call [`run`](Self::run) to take over the
/// terminal — it returns when the application signals [`Action::Quit`],
/// with the terminal restored either way.
///
/// # Example
///
/// ```no_run
/// use mica_term::event_loop::{Action, App, EventLoop};
///
/// struct MyApp;
///
/// impl App for MyApp {
///     fn on_key(&mut self, key: u8) -> Action {
///         if key == b'q' { Action::Quit } else { Action::Continue }
///     }
/// }
///
/// EventLoop::new().run(&mut MyApp)?;
/// # Ok::<(), mica_term::error::Error>(())
/// ```
pub struct EventLoop {
    frame: OutputBuffer,
}

impl EventLoop {
    /// Create an event loop. Does not touch the terminal yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frame: OutputBuffer::new(),
        }
    }

    /// Run until the application returns [`Action::Quit`].
    ///
    /// This method:
    /// 1. Enters raw mode (guard)
    /// 2. Detects the terminal geometry (ioctl, then escape fallback —
    ///    the fallback needs raw mode already active, hence the order)
    /// 3. Loops: refresh the screen, read one key, dispatch
    /// 4. On quit: clears the screen and restores the terminal, checked
    ///
    /// # Errors
    ///
    /// Propagates any [`Error`]; raw mode is restored on those paths by
    /// the guard's `Drop` before the error reaches the caller.
    pub fn run(&mut self, app: &mut impl App) -> Result<(), Error> {
        let raw = RawMode::enter()?;
        let size = size::detect()?;

        loop {
            screen::refresh(&mut self.frame, size)?;
            let key = input::read_key()?;

            if app.on_key(key) == Action::Quit {
                Self::clear_for_exit()?;
                raw.restore()?;
                return Ok(());
            }
        }
    }

    /// Leave the screen blank with the cursor at the top-left.
    fn clear_for_exit() -> Result<(), Error> {
        let mut stdout = io::stdout().lock();
        ansi::clear_screen(&mut stdout)
            .and_then(|()| ansi::cursor_home(&mut stdout))
            .and_then(|()| stdout.flush())
            .map_err(Error::Render)
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
