// SPDX-License-Identifier: MIT
//
// kelp — a small interactive shell.
//
// This is the main binary that wires together the crates:
//
//   kelp-term  → raw mode, escape decoding, line editing, history
//   kelp-shell → tokenizing, builtins, environment, process spawning
//
// Each keypress flows through:
//
//   stdin → decoder → line buffer mutation → one batched redraw
//   Enter → shell loop → tokenize → builtin or external command
//
// One flag: --hexdebug echoes every byte a key press emits as hex instead
// of editing, and disables command execution for the session (raw escape
// bytes are not commands).

use std::env;
use std::process;

use kelp_shell::env::Environment;
use kelp_shell::shell::Shell;
use kelp_term::terminal::Terminal;

fn main() {
    let hex_debug = env::args().skip(1).any(|arg| arg == "--hexdebug");

    println!("Welcome to kelp");
    println!("Type a command to begin");

    let mut terminal = Terminal::new().unwrap_or_else(|e| {
        eprintln!("kelp: {e}");
        process::exit(1);
    });
    if hex_debug {
        terminal.set_hex_debug(true);
    }

    let mut shell = Shell::new(Environment::from_os(), terminal);
    if hex_debug {
        shell.no_exec();
    }

    if let Err(e) = shell.run() {
        eprintln!("kelp: {e}");
        process::exit(1);
    }
}
