// SPDX-License-Identifier: MIT

//! The interactive loop: prompt, read, tokenize, dispatch.
//!
//! The shell drives the line editor through the [`Readline`] trait — the
//! real implementation is `kelp_term::terminal::Terminal`, tests use a
//! scripted double. Two rules the loop never breaks:
//!
//! - Raw mode is released around external commands, so children inherit
//!   a cooked terminal, and re-acquired the moment they exit.
//! - Every exit path from [`Shell::run`] — clean `exit`, read failure,
//!   raw-mode failure — restores the terminal before returning. This is
//!   the top-level error boundary; `main` only reports.

use std::io;
use std::path::{Path, PathBuf};

use kelp_term::Error;

use crate::builtins::{self, Control};
use crate::env::Environment;
use crate::exec;
use crate::tokenize::tokenize;

/// Primary prompt when `PS1` is unset or empty.
pub const DEFAULT_PROMPT: &str = "$ ";

// ─── Readline ───────────────────────────────────────────────────────────────

/// The terminal surface the shell drives.
///
/// Mirrors the exposed API of `kelp_term::terminal::Terminal`; the
/// indirection exists so the loop is testable without a live terminal.
pub trait Readline {
    /// Switch the terminal to raw mode. Idempotent.
    ///
    /// # Errors
    ///
    /// Terminal-setup failures; fatal to the session.
    fn enable_raw_mode(&mut self) -> Result<(), Error>;

    /// Restore the terminal. Idempotent.
    ///
    /// # Errors
    ///
    /// Terminal-restore failures; fatal to the session.
    fn disable_raw_mode(&mut self) -> Result<(), Error>;

    /// Read one line under `prompt`.
    ///
    /// # Errors
    ///
    /// A read failure carrying the partial line; the line must not be
    /// dispatched.
    fn read_line(&mut self, prompt: &str) -> Result<String, Error>;

    /// Record a submitted line in history.
    fn add_history(&mut self, line: &str);

    /// Write a message, ending the line correctly for the current mode.
    ///
    /// # Errors
    ///
    /// Propagates output failures; callers may ignore them.
    fn println(&mut self, text: &str) -> io::Result<()>;
}

impl Readline for kelp_term::terminal::Terminal {
    fn enable_raw_mode(&mut self) -> Result<(), Error> {
        kelp_term::terminal::Terminal::enable_raw_mode(self)
    }

    fn disable_raw_mode(&mut self) -> Result<(), Error> {
        kelp_term::terminal::Terminal::disable_raw_mode(self)
    }

    fn read_line(&mut self, prompt: &str) -> Result<String, Error> {
        kelp_term::terminal::Terminal::read_line(self, prompt)
    }

    fn add_history(&mut self, line: &str) {
        kelp_term::terminal::Terminal::add_history(self, line);
    }

    fn println(&mut self, text: &str) -> io::Result<()> {
        kelp_term::terminal::Terminal::println(self, text)
    }
}

// ─── Shell ──────────────────────────────────────────────────────────────────

/// Interactive shell session state.
pub struct Shell<T> {
    terminal: T,
    env: Environment,
    pwd: PathBuf,
    exec_enabled: bool,
}

impl<T: Readline> Shell<T> {
    /// Create a session rooted at the current working directory.
    pub fn new(env: Environment, terminal: T) -> Self {
        let pwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        Self {
            terminal,
            env,
            pwd,
            exec_enabled: true,
        }
    }

    /// Disable external command spawning; builtins still run.
    pub fn no_exec(&mut self) {
        self.exec_enabled = false;
    }

    /// The session environment.
    #[must_use]
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Mutable access for builtins (`def`).
    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// The session working directory.
    #[must_use]
    pub fn pwd(&self) -> &Path {
        &self.pwd
    }

    /// Change the session working directory — and the process's, so
    /// relative paths in children resolve against it.
    ///
    /// # Errors
    ///
    /// Propagates the chdir failure; the session directory is unchanged.
    pub fn set_pwd(&mut self, path: PathBuf) -> io::Result<()> {
        std::env::set_current_dir(&path)?;
        self.pwd = path;
        Ok(())
    }

    /// Print through the terminal, best-effort.
    pub fn println(&mut self, text: &str) {
        let _ = self.terminal.println(text);
    }

    /// Run the interactive loop until `exit` or a fatal error.
    ///
    /// This is the session's single error boundary: whatever happens in
    /// the loop, raw mode is restored before the result propagates, so a
    /// failed session never leaves the terminal unusable. When the loop
    /// itself failed, its error wins over a secondary restore failure.
    ///
    /// # Errors
    ///
    /// Raw-mode failures and read failures, after the terminal has been
    /// restored.
    pub fn run(&mut self) -> Result<(), Error> {
        self.terminal.enable_raw_mode()?;
        let result = self.run_loop();
        let restored = self.terminal.disable_raw_mode();
        result.and(restored)
    }

    fn run_loop(&mut self) -> Result<(), Error> {
        loop {
            let prompt = self.env.get_or("PS1", DEFAULT_PROMPT).to_string();
            let line = self.terminal.read_line(&prompt)?;

            let args = tokenize(&line);
            if args.is_empty() {
                continue;
            }

            self.terminal.add_history(&line);

            if let Some(builtin) = builtins::lookup::<T>(&args[0]) {
                match builtin(self, &args[1..]) {
                    Ok(Control::Exit) => return Ok(()),
                    Ok(Control::Continue) => {}
                    Err(err) => self.println(&err.to_string()),
                }
                continue;
            }

            if self.exec_enabled {
                // The child gets a cooked terminal; raw mode comes back
                // the moment it exits.
                self.terminal.disable_raw_mode()?;
                let spawned = exec::run(&args[0], &args[1..], &self.env, &self.pwd);
                self.terminal.enable_raw_mode()?;

                if let Err(err) = spawned {
                    self.println(&err.to_string());
                }
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    // ── Scripted terminal ─────────────────────────────────────────────

    #[derive(Default)]
    struct State {
        /// Lines handed out by `read_line`; empty means EOF.
        lines: VecDeque<String>,
        raw: bool,
        enables: usize,
        disables: usize,
        prompts: Vec<String>,
        history: Vec<String>,
        printed: Vec<String>,
    }

    /// Terminal double whose state stays observable after the shell
    /// consumed it.
    #[derive(Default, Clone)]
    struct Scripted(Arc<Mutex<State>>);

    impl Scripted {
        fn with_lines(lines: &[&str]) -> Self {
            let scripted = Self::default();
            scripted.0.lock().unwrap().lines = lines.iter().map(ToString::to_string).collect();
            scripted
        }

        fn state(&self) -> std::sync::MutexGuard<'_, State> {
            self.0.lock().unwrap()
        }
    }

    impl Readline for Scripted {
        fn enable_raw_mode(&mut self) -> Result<(), Error> {
            let mut state = self.state();
            state.raw = true;
            state.enables += 1;
            Ok(())
        }

        fn disable_raw_mode(&mut self) -> Result<(), Error> {
            let mut state = self.state();
            state.raw = false;
            state.disables += 1;
            Ok(())
        }

        fn read_line(&mut self, prompt: &str) -> Result<String, Error> {
            let mut state = self.state();
            assert!(state.raw, "read_line outside raw mode");
            state.prompts.push(prompt.to_string());
            state.lines.pop_front().ok_or_else(|| Error::Read {
                partial: String::new(),
                source: io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"),
            })
        }

        fn add_history(&mut self, line: &str) {
            self.state().history.push(line.to_string());
        }

        fn println(&mut self, text: &str) -> io::Result<()> {
            self.state().printed.push(text.to_string());
            Ok(())
        }
    }

    fn run_shell(term: &Scripted) -> (Result<(), Error>, Shell<Scripted>) {
        let mut shell = Shell::new(Environment::new(), term.clone());
        let result = shell.run();
        (result, shell)
    }

    // ── Loop behavior ─────────────────────────────────────────────────

    #[test]
    fn exit_ends_the_loop_cleanly() {
        let term = Scripted::with_lines(&["exit"]);
        let (result, _) = run_shell(&term);
        result.unwrap();
        assert!(!term.state().raw);
    }

    #[test]
    fn blank_lines_are_skipped_without_history() {
        let term = Scripted::with_lines(&["", "   ", "exit"]);
        let (result, _) = run_shell(&term);
        result.unwrap();
        assert_eq!(term.state().history, vec!["exit"]);
    }

    #[test]
    fn submitted_commands_land_in_history() {
        let term = Scripted::with_lines(&["pwd", "exit"]);
        let (result, _) = run_shell(&term);
        result.unwrap();
        assert_eq!(term.state().history, vec!["pwd", "exit"]);
    }

    #[test]
    fn prompt_comes_from_ps1() {
        let term = Scripted::with_lines(&[r#"def PS1 ">> ""#, "exit"]);
        let (result, _) = run_shell(&term);
        result.unwrap();
        assert_eq!(term.state().prompts, vec!["$ ", ">> "]);
    }

    #[test]
    fn pwd_prints_the_working_directory() {
        let term = Scripted::with_lines(&["pwd", "exit"]);
        let (result, shell) = run_shell(&term);
        result.unwrap();
        assert_eq!(
            term.state().printed,
            vec![shell.pwd().display().to_string()]
        );
    }

    #[test]
    fn builtin_errors_are_printed_and_survived() {
        let term = Scripted::with_lines(&["def only-key", "exit"]);
        let (result, _) = run_shell(&term);
        result.unwrap();
        let printed = term.state().printed.clone();
        assert_eq!(printed.len(), 1);
        assert!(printed[0].contains("def requires two arguments"));
    }

    #[test]
    fn unknown_commands_are_silent_without_exec() {
        let term = Scripted::with_lines(&["frobnicate --hard", "exit"]);
        let mut shell = Shell::new(Environment::new(), term.clone());
        shell.no_exec();
        shell.run().unwrap();
        assert!(term.state().printed.is_empty());
        // Still recorded: history keeps what was typed, not what ran.
        assert_eq!(term.state().history, vec!["frobnicate --hard", "exit"]);
    }

    #[test]
    fn read_failure_restores_raw_mode_and_propagates() {
        let term = Scripted::with_lines(&[]);
        let (result, _) = run_shell(&term);
        assert!(matches!(result, Err(Error::Read { .. })));
        let state = term.state();
        assert!(!state.raw, "terminal left raw after a failed session");
        assert_eq!(state.disables, 1);
    }

    #[test]
    fn raw_mode_is_dropped_around_external_commands() {
        let term = Scripted::with_lines(&["/bin/sh -c true", "exit"]);
        let mut shell = Shell::new(Environment::from_os(), term.clone());
        shell.run().unwrap();
        let state = term.state();
        // Initial enable + re-enable after the child; the drop for the
        // child + the final restore.
        assert_eq!(state.enables, 2);
        assert_eq!(state.disables, 2);
        assert!(state.printed.is_empty(), "spawn should have succeeded");
    }

    #[test]
    fn spawn_failures_are_printed_and_survived() {
        let term = Scripted::with_lines(&["/definitely/not/a/binary", "exit"]);
        let mut shell = Shell::new(Environment::from_os(), term.clone());
        shell.run().unwrap();
        assert_eq!(term.state().printed.len(), 1);
        assert!(!term.state().raw);
    }
}
