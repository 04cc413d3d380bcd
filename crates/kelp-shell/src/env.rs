// SPDX-License-Identifier: MIT

//! Session environment — a plain key/value store.
//!
//! Holds the variables the shell reads (`PS1`, `HOME`) and the full set
//! handed to spawned processes. This is a pure data type: no syscalls,
//! no locking — the shell loop is the only writer.

use std::collections::HashMap;

/// Environment variables for the session and for spawned commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Create an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the parent process environment.
    #[must_use]
    pub fn from_os() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build from `KEY=VALUE` pairs; entries without `=` are skipped.
    #[must_use]
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let vars = pairs
            .into_iter()
            .filter_map(|pair| {
                pair.as_ref()
                    .split_once('=')
                    .map(|(k, v)| (k.to_string(), v.to_string()))
            })
            .collect();
        Self { vars }
    }

    /// The value of `key`, if set.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// The value of `key`, or `default` when unset **or empty** — an
    /// empty `PS1` should fall back to a usable prompt, not erase it.
    #[must_use]
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.vars.get(key) {
            Some(value) if !value.is_empty() => value,
            _ => default,
        }
    }

    /// Whether `key` has a value (empty counts as set here).
    #[must_use]
    pub fn is_set(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Set or overwrite a variable.
    pub fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    /// Iterate all `(key, value)` pairs (for process spawning).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
