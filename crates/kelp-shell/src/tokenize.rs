// SPDX-License-Identifier: MIT

//! Argument tokenizing.
//!
//! Splits a submitted line into arguments: whitespace and `=` separate
//! tokens (so `--output=json` dispatches as two), and double-quoted spans
//! become single tokens with the quotes stripped. There is no escape
//! processing inside quotes; an unterminated quote runs to the end of the
//! line.

/// Split `line` into shell arguments.
#[must_use]
pub fn tokenize(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        if ch.is_whitespace() || ch == '=' {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
            continue;
        }

        if ch == '"' {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
            let mut quoted = String::new();
            for q in chars.by_ref() {
                if q == '"' {
                    break;
                }
                quoted.push(q);
            }
            args.push(quoted);
            continue;
        }

        current.push(ch);
    }

    if !current.is_empty() {
        args.push(current);
    }

    args
}

// ─── Tests ───────────────────────────────────────────────────────────────────
