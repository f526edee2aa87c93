// SPDX-License-Identifier: MIT
//
// mica — a terminal text editor, currently just its bootstrap layer.
//
// This binary wires mica-term together:
//
//   mica-term → raw mode, geometry, screen refresh, key input, event loop
//
// The Editor struct implements mica-term's App trait, connecting the
// event loop to the (for now, single-command) key dispatch. Each
// keypress flows through:
//
//   stdin → read_key → on_key → Continue | Quit
//   refresh → clear + filler rows → terminal
//
// Ctrl-Q quits with status 0. Any terminal failure exits through `die`
// with status 1, after the raw-mode guard has already put the terminal
// back the way it was found.

use std::io::{self, Write};
use std::process;

use mica_term::ansi;
use mica_term::error::Error;
use mica_term::event_loop::{Action, App, EventLoop};
use mica_term::terminal;

// ─── Editor ─────────────────────────────────────────────────────────────────

/// The byte the terminal sends for Ctrl-Q.
const QUIT_KEY: u8 = ansi::ctrl(b'q');

/// The editor. Holds no state yet — the buffer, cursor, and modes all
/// arrive in later stages; this snapshot only knows how to leave.
struct Editor;

impl App for Editor {
    fn on_key(&mut self, key: u8) -> Action {
        match key {
            QUIT_KEY => Action::Quit,
            // Every other byte is ignored until there is a buffer to
            // edit. This match is where command dispatch will grow.
            _ => Action::Continue,
        }
    }
}

// ─── Fatal Exit ─────────────────────────────────────────────────────────────

/// Report a fatal terminal failure and terminate with status 1.
///
/// By the time an error reaches here the raw-mode guard has already
/// restored the terminal, so the message prints to a working shell. The
/// screen clear is best-effort: if stdout is gone too, stderr still
/// carries the message.
fn die(err: &Error) -> ! {
    let mut stdout = io::stdout().lock();
    let _ = ansi::clear_screen(&mut stdout);
    let _ = ansi::cursor_home(&mut stdout);
    let _ = stdout.flush();
    drop(stdout);

    eprintln!("mica: {err}");
    process::exit(1);
}

// ─── Entry ──────────────────────────────────────────────────────────────────

fn main() {
    // No command-line interface yet: arguments (a filename, eventually)
    // are ignored.

    if !terminal::is_tty() {
        eprintln!("mica: stdin is not a terminal");
        process::exit(1);
    }

    if let Err(err) = EventLoop::new().run(&mut Editor) {
        die(&err);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
