// SPDX-License-Identifier: MIT
//
// mica-term — Terminal control substrate for mica.
//
// The layer an editor stands on before it can edit anything: exclusive
// control of the terminal. Raw-mode entry with guaranteed restoration,
// geometry detection with an escape-sequence fallback for terminals
// that don't answer the ioctl, batched full-screen refresh, and a
// bounded-wait key read that hands the application one byte at a time.
//
// This crate intentionally avoids external TUI frameworks (ratatui,
// crossterm) in favor of direct terminal control via ANSI escape
// sequences and raw termios. Every byte sent to the terminal is
// accounted for; every byte read back is parsed by hand.

pub mod ansi;
pub mod error;
pub mod event_loop;
pub mod input;
pub mod output;
pub mod screen;
pub mod size;
pub mod terminal;
