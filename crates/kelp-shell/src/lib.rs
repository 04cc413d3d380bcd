// SPDX-License-Identifier: MIT

//! # kelp-shell — the interactive loop around the line editor
//!
//! Everything here is straightforward sequential logic driving the
//! stateful engine in `kelp-term`:
//!
//! - **[`tokenize`]** — argument splitting (whitespace, `=`, quoting)
//! - **[`env`]** — session key/value store, seeds spawned processes
//! - **[`builtins`]** — static command table (`cd`, `pwd`, `def`, `exit`)
//! - **[`exec`]** — external process spawning with the session env
//! - **[`shell`]** — the REPL: prompt, read, dispatch, raw-mode hand-off

pub mod builtins;
pub mod env;
pub mod exec;
pub mod shell;
pub mod tokenize;
