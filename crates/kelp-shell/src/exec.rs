// SPDX-License-Identifier: MIT

//! External command spawning.
//!
//! The child gets the session environment (nothing inherited beyond it),
//! the shell's working directory, and the real stdio — it owns the
//! terminal until it exits, which is why the caller drops raw mode around
//! this call.

use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};

use crate::env::Environment;

/// Run `name` with `args` and block until it exits.
///
/// A non-zero exit status is not an error — the child already reported
/// whatever went wrong on the shared stderr.
///
/// # Errors
///
/// Spawn failures only: command not found, permission denied, and the
/// like.
pub fn run(
    name: &str,
    args: &[String],
    env: &Environment,
    cwd: &Path,
) -> io::Result<ExitStatus> {
    Command::new(name)
        .args(args)
        .env_clear()
        .envs(env.iter())
        .current_dir(cwd)
        .status()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
