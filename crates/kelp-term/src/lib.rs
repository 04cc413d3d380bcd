// SPDX-License-Identifier: MIT
//
// kelp-term — line editing engine for kelp.
//
// Converts a raw terminal byte stream into complete input lines: cursor
// movement, insert/delete, history recall, trailing-backslash continuation,
// and a hex-debug echo mode. Terminal control is done directly via termios
// and hand-written ANSI sequences — the crate deliberately avoids TUI
// frameworks. A line editor needs a dozen escape codes; it should own
// every one of them.

pub mod ansi;
pub mod editor;
pub mod error;
pub mod history;
pub mod input;
pub mod output;
pub mod terminal;

pub use error::Error;
