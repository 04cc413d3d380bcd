// SPDX-License-Identifier: MIT

//! Submitted-line history with adjacent-duplicate suppression.
//!
//! The store is shared between the line editor (recall) and the shell
//! (append on submission), so every access goes through an internal lock.
//! The recall cursor is *not* here — it belongs to the editor, because it
//! is per-session navigation state, not part of the record.
//!
//! Persistence to disk is intentionally not implemented.

use std::sync::Mutex;

/// Append-only ordered store of submitted lines.
#[derive(Debug, Default)]
pub struct History {
    items: Mutex<Vec<String>>,
}

impl History {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `line` unless it equals the immediately preceding entry.
    ///
    /// Only adjacent duplicates are suppressed; the same line may appear
    /// many times as long as something else was submitted in between.
    pub fn add(&self, line: &str) {
        if let Ok(mut items) = self.items.lock() {
            if items.last().map(String::as_str) != Some(line) {
                items.push(line.to_string());
            }
        }
    }

    /// The entry at `index`, or an empty string when out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> String {
        self.items
            .lock()
            .ok()
            .and_then(|items| items.get(index).cloned())
            .unwrap_or_default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().map_or(0, |items| items.len())
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
