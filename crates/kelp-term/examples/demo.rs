// SPDX-License-Identifier: MIT
//
// kelp-term demo — a bare echo loop that proves the engine end to end.
//
// Type lines, edit them with arrows/Home/End/Delete, recall with up/down,
// continue with a trailing backslash. Each submitted line is echoed back.
// Type `quit` to leave.
//
// Usage:
//   cargo run -p kelp-term --example demo

use std::process;

use kelp_term::terminal::Terminal;

fn main() {
    let mut term = Terminal::new().unwrap_or_else(|e| {
        eprintln!("demo: {e}");
        process::exit(1);
    });

    if let Err(e) = term.enable_raw_mode() {
        eprintln!("demo: {e}");
        process::exit(1);
    }

    loop {
        match term.read_line("demo> ") {
            Ok(line) if line == "quit" => break,
            Ok(line) => {
                term.add_history(&line);
                let _ = term.println(&format!("you typed: {line}"));
            }
            Err(e) => {
                let _ = term.close();
                eprintln!("demo: {e}");
                process::exit(1);
            }
        }
    }

    let _ = term.close();
}
