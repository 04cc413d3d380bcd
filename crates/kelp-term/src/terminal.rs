// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode and the stdin/stdout line-editing facade.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr) and isatty. These are the standard POSIX interfaces for
// terminal control — there is no safe alternative. Each unsafe block is
// minimal.
#![allow(unsafe_code)]
//
// RawMode owns the saved terminal attributes: `enable` captures them once
// and switches stdin to byte-granular, no-echo delivery; `disable` puts
// them back. Both directions are idempotent, and Drop restores on any
// exit path.
//
// The panic hook deserves special mention: a panic while raw mode is
// active would otherwise leave the user's terminal with no echo and no
// line editing — unusable for reading the panic message. The hook
// restores termios from a process-global backup before the original
// handler prints anything.

use std::io::{self, Stdin, Stdout, Write};
use std::sync::{Arc, Mutex, Once};

use crate::ansi;
use crate::editor::LineEditor;
use crate::error::Error;
use crate::history::History;

// ─── Terminal queries ───────────────────────────────────────────────────────

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

// ─── Panic-safe restore ─────────────────────────────────────────────────────

/// Global backup of the original termios for panic recovery.
///
/// [`RawMode`] owns its own copy, but the panic hook cannot reach it.
/// This backup — behind a [`Mutex`], not `static mut` — lets the hook
/// restore the terminal without the struct.
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

/// Panic hook guard — the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

// ─── RawMode ────────────────────────────────────────────────────────────────

/// Raw-mode controller for stdin.
///
/// [`enable`](RawMode::enable) captures the current attributes exactly
/// once and switches the terminal to unbuffered, no-echo, byte-granular
/// delivery. [`disable`](RawMode::disable) restores them and forgets the
/// capture. Both are idempotent; dropping the controller restores
/// best-effort.
#[derive(Default)]
pub struct RawMode {
    /// Original termios, present only while raw mode is active.
    #[cfg(unix)]
    original: Option<libc::termios>,
}

impl RawMode {
    /// Create a controller with raw mode off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether raw mode is currently active.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        #[cfg(unix)]
        {
            self.original.is_some()
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    /// Switch the terminal to raw mode.
    ///
    /// Captures the current attributes on the first call; calling again
    /// while enabled is a no-op, so the eventual restore always puts back
    /// the original state, never an intermediate one.
    ///
    /// # Errors
    ///
    /// [`Error::RawMode`] if the attribute get/set syscall fails (for
    /// example when stdin is a pipe).
    #[cfg(unix)]
    pub fn enable(&mut self) -> Result<(), Error> {
        use std::os::unix::io::AsRawFd;

        if self.original.is_some() {
            return Ok(());
        }

        install_panic_hook();

        let fd = io::stdin().as_raw_fd();

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(Error::RawMode(io::Error::last_os_error()));
            }

            // Save the original for restore, plus the panic-hook backup.
            self.original = Some(termios);
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            // cfmakeraw equivalent: disable all line processing and echo.
            termios.c_iflag &= !(libc::IGNBRK
                | libc::BRKINT
                | libc::PARMRK
                | libc::ISTRIP
                | libc::INLCR
                | libc::IGNCR
                | libc::ICRNL
                | libc::IXON);
            termios.c_oflag &= !libc::OPOST;
            termios.c_lflag &=
                !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
            termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
            termios.c_cflag |= libc::CS8;

            // VMIN=1, VTIME=0: read() blocks until at least one byte.
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                // The terminal is unchanged; drop the capture.
                self.original = None;
                if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                    *guard = None;
                }
                return Err(Error::RawMode(io::Error::last_os_error()));
            }
        }

        Ok(())
    }

    #[cfg(not(unix))]
    pub fn enable(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Restore the originally captured attributes.
    ///
    /// No-op if raw mode is not active, so calling it twice — or after
    /// [`Drop`] already ran it — is harmless.
    ///
    /// # Errors
    ///
    /// [`Error::RawMode`] if the restore syscall fails; the capture is
    /// kept so a later attempt can retry.
    #[cfg(unix)]
    pub fn disable(&mut self) -> Result<(), Error> {
        use std::os::unix::io::AsRawFd;

        if let Some(original) = self.original.take() {
            let fd = io::stdin().as_raw_fd();
            let rc = unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const original) };
            if rc != 0 {
                self.original = Some(original);
                return Err(Error::RawMode(io::Error::last_os_error()));
            }

            // Restored successfully — the panic hook has nothing to do.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }
        }

        Ok(())
    }

    #[cfg(not(unix))]
    pub fn disable(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = self.disable();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Interactive terminal: raw mode plus line editing over stdin/stdout.
///
/// Construction verifies stdin is a real terminal; raw mode is entered
/// explicitly with [`enable_raw_mode`](Terminal::enable_raw_mode) and
/// restored on [`close`](Terminal::close) or drop. One handle per
/// terminal — the raw-mode capture is exclusively owned.
///
/// # Example
///
/// ```no_run
/// use kelp_term::terminal::Terminal;
///
/// let mut term = Terminal::new()?;
/// term.enable_raw_mode()?;
/// let line = term.read_line("$ ")?;
/// term.add_history(&line);
/// term.close()?;
/// # Ok::<(), kelp_term::Error>(())
/// ```
pub struct Terminal {
    raw: RawMode,
    editor: LineEditor<Stdin, Stdout>,
}

impl Terminal {
    /// Create a terminal handle over stdin/stdout with fresh history.
    ///
    /// Does **not** enter raw mode — call
    /// [`enable_raw_mode`](Terminal::enable_raw_mode) for that.
    ///
    /// # Errors
    ///
    /// [`Error::NotATerminal`] if stdin is not an interactive terminal.
    pub fn new() -> Result<Self, Error> {
        if !is_tty() {
            return Err(Error::NotATerminal);
        }

        let history = Arc::new(History::new());
        Ok(Self {
            raw: RawMode::new(),
            editor: LineEditor::new(io::stdin(), io::stdout(), history),
        })
    }

    /// Switch the terminal to raw mode. Idempotent.
    ///
    /// # Errors
    ///
    /// [`Error::RawMode`] if the termios syscalls fail.
    pub fn enable_raw_mode(&mut self) -> Result<(), Error> {
        self.raw.enable()
    }

    /// Restore the original terminal attributes. Idempotent.
    ///
    /// # Errors
    ///
    /// [`Error::RawMode`] if the restore syscall fails.
    pub fn disable_raw_mode(&mut self) -> Result<(), Error> {
        self.raw.disable()
    }

    /// Restore the terminal and release the raw-mode state.
    ///
    /// # Errors
    ///
    /// [`Error::RawMode`] if the restore syscall fails.
    pub fn close(&mut self) -> Result<(), Error> {
        self.raw.disable()
    }

    /// Read one line under `prompt`. See
    /// [`LineEditor::read_line`](crate::editor::LineEditor::read_line).
    ///
    /// # Errors
    ///
    /// [`Error::Read`] on stream failure or EOF, carrying the partial line.
    pub fn read_line(&mut self, prompt: &str) -> Result<String, Error> {
        self.editor.read_line(prompt)
    }

    /// Read one line with echo suppressed.
    ///
    /// # Errors
    ///
    /// [`Error::Read`] on stream failure or EOF.
    pub fn read_password(&mut self, prompt: &str) -> Result<String, Error> {
        self.editor.read_password(prompt)
    }

    /// Toggle hex inspection mode for the session.
    pub fn set_hex_debug(&mut self, on: bool) {
        self.editor.set_hex_debug(on);
    }

    /// Record a submitted line in history.
    pub fn add_history(&mut self, line: &str) {
        self.editor.add_history(line);
    }

    /// Write a message followed by CR+LF.
    ///
    /// Raw mode leaves output post-processing off, so this is the only
    /// safe way to end a line while the terminal is raw.
    ///
    /// # Errors
    ///
    /// Propagates stdout write failures.
    pub fn println(&mut self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.write_all(ansi::NEWLINE)?;
        stdout.flush()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Queries ───────────────────────────────────────────────────────

    #[test]
    fn is_tty_does_not_panic() {
        let _ = is_tty();
    }

    // ── RawMode ───────────────────────────────────────────────────────

    #[test]
    fn raw_mode_starts_disabled() {
        let raw = RawMode::new();
        assert!(!raw.is_enabled());
    }

    #[test]
    fn disable_without_enable_is_noop() {
        let mut raw = RawMode::new();
        raw.disable().unwrap();
        raw.disable().unwrap();
        assert!(!raw.is_enabled());
    }

    #[test]
    fn drop_without_enable_is_harmless() {
        let raw = RawMode::new();
        drop(raw);
    }

    #[cfg(unix)]
    #[test]
    fn enable_off_tty_reports_raw_mode_error() {
        // Exercised when the test harness pipes stdin; on a live terminal
        // the cycle test below covers the other branch.
        if is_tty() {
            return;
        }
        let mut raw = RawMode::new();
        match raw.enable() {
            Err(Error::RawMode(_)) => {}
            other => panic!("expected raw mode error, got {other:?}"),
        }
        assert!(!raw.is_enabled());
    }

    #[cfg(unix)]
    #[test]
    fn enable_disable_cycle_restores_original_attributes() {
        use std::os::unix::io::AsRawFd;

        if !is_tty() {
            return;
        }

        let fd = io::stdin().as_raw_fd();
        let before = unsafe {
            let mut t: libc::termios = std::mem::zeroed();
            assert_eq!(libc::tcgetattr(fd, &raw mut t), 0);
            t
        };

        let mut raw = RawMode::new();
        raw.enable().unwrap();
        assert!(raw.is_enabled());
        // Second enable must not re-capture the (now raw) attributes.
        raw.enable().unwrap();
        raw.disable().unwrap();
        assert!(!raw.is_enabled());

        let after = unsafe {
            let mut t: libc::termios = std::mem::zeroed();
            assert_eq!(libc::tcgetattr(fd, &raw mut t), 0);
            t
        };
        assert_eq!(before.c_iflag, after.c_iflag);
        assert_eq!(before.c_oflag, after.c_oflag);
        assert_eq!(before.c_lflag, after.c_lflag);
        assert_eq!(before.c_cflag, after.c_cflag);
    }

    // ── Terminal ──────────────────────────────────────────────────────

    #[test]
    fn new_matches_tty_detection() {
        match Terminal::new() {
            Ok(_) => assert!(is_tty()),
            Err(Error::NotATerminal) => assert!(!is_tty()),
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
}
