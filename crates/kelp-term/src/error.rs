// SPDX-License-Identifier: MIT
//
// Error kinds for the line editing engine.
//
// Three failure classes with three destinies: NotATerminal and RawMode are
// fatal and propagate to the top level; Read terminates only the current
// read call and carries whatever was typed so far. Malformed escape
// sequences are not errors at all — terminal emulators disagree too much
// for that — the decoder swallows them silently.

use std::io;

use thiserror::Error;

/// Errors produced by the terminal and line editor.
#[derive(Debug, Error)]
pub enum Error {
    /// The input descriptor is not an interactive terminal. Detected at
    /// [`Terminal`](crate::terminal::Terminal) construction, before raw
    /// mode is ever touched.
    #[error("file descriptor is not an interactive terminal")]
    NotATerminal,

    /// A termios get/set syscall failed while entering or leaving raw mode.
    #[error("failed to change terminal mode: {0}")]
    RawMode(#[source] io::Error),

    /// The byte stream failed (I/O error or EOF) in the middle of a read.
    ///
    /// `partial` holds everything accumulated before the failure. Callers
    /// must treat the line as incomplete, not as a submission.
    #[error("read interrupted: {source}")]
    Read {
        /// The joined line content accumulated before the failure.
        partial: String,
        #[source]
        source: io::Error,
    },
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn not_a_terminal_message() {
        assert_eq!(
            Error::NotATerminal.to_string(),
            "file descriptor is not an interactive terminal"
        );
    }

    #[test]
    fn raw_mode_wraps_source() {
        let err = Error::RawMode(io::Error::new(io::ErrorKind::Other, "bad ioctl"));
        assert!(err.to_string().contains("bad ioctl"));
        assert!(err.source().is_some());
    }

    #[test]
    fn read_keeps_partial_line() {
        let err = Error::Read {
            partial: "ls -l".into(),
            source: io::Error::new(io::ErrorKind::UnexpectedEof, "end of input"),
        };
        match err {
            Error::Read { partial, .. } => assert_eq!(partial, "ls -l"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
