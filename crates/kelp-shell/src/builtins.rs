// SPDX-License-Identifier: MIT

//! Builtin commands.
//!
//! A static, read-only mapping from command name to handler, resolved at
//! compile time — there is no runtime registration and nothing to mutate.
//! Handlers get the shell (for the environment and working directory) and
//! the arguments after the command name, and say whether the loop keeps
//! going. A failed builtin is printed and survived, never fatal.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::shell::{Readline, Shell};

/// What the loop should do after a builtin ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Keep reading commands.
    Continue,
    /// Leave the shell cleanly.
    Exit,
}

/// A builtin failed; the message is printed and the session continues.
#[derive(Debug, Error)]
pub enum BuiltinError {
    #[error("path {0} doesn't exist or isn't a directory")]
    NotADirectory(String),

    #[error("can't change directory: {0}")]
    Chdir(#[source] io::Error),

    #[error("cd: HOME is not set")]
    NoHome,

    #[error("def requires two arguments: def key value")]
    DefUsage,
}

/// Handler signature: the shell plus the arguments after the name.
pub type Builtin<T> = fn(&mut Shell<T>, &[String]) -> Result<Control, BuiltinError>;

/// Look up a builtin by name.
#[must_use]
pub fn lookup<T: Readline>(name: &str) -> Option<Builtin<T>> {
    match name {
        "cd" => Some(cd),
        "pwd" => Some(pwd),
        "def" => Some(def),
        "exit" => Some(exit),
        _ => None,
    }
}

/// `cd [path]` — change the working directory; no argument means `$HOME`.
fn cd<T: Readline>(shell: &mut Shell<T>, args: &[String]) -> Result<Control, BuiltinError> {
    let target = match args.first() {
        Some(path) => PathBuf::from(path),
        None => shell
            .env()
            .get("HOME")
            .map(PathBuf::from)
            .ok_or(BuiltinError::NoHome)?,
    };

    let target = if target.is_absolute() {
        target
    } else {
        shell.pwd().join(target)
    };

    if !target.is_dir() {
        return Err(BuiltinError::NotADirectory(target.display().to_string()));
    }

    shell.set_pwd(target).map_err(BuiltinError::Chdir)?;
    Ok(Control::Continue)
}

/// `pwd` — print the working directory.
fn pwd<T: Readline>(shell: &mut Shell<T>, _args: &[String]) -> Result<Control, BuiltinError> {
    let cwd = shell.pwd().display().to_string();
    shell.println(&cwd);
    Ok(Control::Continue)
}

/// `def key value` — set a session variable.
fn def<T: Readline>(shell: &mut Shell<T>, args: &[String]) -> Result<Control, BuiltinError> {
    let [key, value] = args else {
        return Err(BuiltinError::DefUsage);
    };
    shell.env_mut().set(key, value);
    Ok(Control::Continue)
}

/// `exit` — leave the shell.
fn exit<T: Readline>(_shell: &mut Shell<T>, _args: &[String]) -> Result<Control, BuiltinError> {
    Ok(Control::Exit)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use kelp_term::Error as TermError;
    use pretty_assertions::assert_eq;

    /// Terminal double that accepts everything and prints nowhere.
    #[derive(Default)]
    struct NullTerminal;

    impl Readline for NullTerminal {
        fn enable_raw_mode(&mut self) -> Result<(), TermError> {
            Ok(())
        }
        fn disable_raw_mode(&mut self) -> Result<(), TermError> {
            Ok(())
        }
        fn read_line(&mut self, _prompt: &str) -> Result<String, TermError> {
            Err(TermError::Read {
                partial: String::new(),
                source: io::Error::new(io::ErrorKind::UnexpectedEof, "scripted"),
            })
        }
        fn add_history(&mut self, _line: &str) {}
        fn println(&mut self, _text: &str) -> io::Result<()> {
            Ok(())
        }
    }

    fn shell() -> Shell<NullTerminal> {
        Shell::new(Environment::new(), NullTerminal)
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn lookup_finds_every_builtin() {
        for name in ["cd", "pwd", "def", "exit"] {
            assert!(lookup::<NullTerminal>(name).is_some(), "missing {name}");
        }
    }

    #[test]
    fn lookup_unknown_is_none() {
        assert!(lookup::<NullTerminal>("frobnicate").is_none());
        assert!(lookup::<NullTerminal>("").is_none());
    }

    #[test]
    fn exit_requests_loop_exit() {
        let mut sh = shell();
        assert_eq!(exit(&mut sh, &[]).unwrap(), Control::Exit);
    }

    #[test]
    fn def_sets_a_variable() {
        let mut sh = shell();
        let control = def(&mut sh, &args(&["GREETING", "hello"])).unwrap();
        assert_eq!(control, Control::Continue);
        assert_eq!(sh.env().get("GREETING"), Some("hello"));
    }

    #[test]
    fn def_wrong_arity_errors() {
        let mut sh = shell();
        assert!(matches!(
            def(&mut sh, &args(&["only-key"])),
            Err(BuiltinError::DefUsage)
        ));
        assert!(matches!(def(&mut sh, &[]), Err(BuiltinError::DefUsage)));
    }

    #[test]
    fn cd_changes_the_working_directory() {
        let mut sh = shell();
        let temp = std::env::temp_dir();
        let target = temp.display().to_string();
        cd(&mut sh, &args(&[target.as_str()])).unwrap();
        assert_eq!(sh.pwd(), temp.as_path());
    }

    #[test]
    fn cd_nonexistent_path_errors() {
        let mut sh = shell();
        let before = sh.pwd().to_path_buf();
        let result = cd(&mut sh, &args(&["/definitely/not/a/directory"]));
        assert!(matches!(result, Err(BuiltinError::NotADirectory(_))));
        assert_eq!(sh.pwd(), before.as_path());
    }

    #[test]
    fn cd_without_args_needs_home() {
        let mut sh = shell();
        assert!(matches!(cd(&mut sh, &[]), Err(BuiltinError::NoHome)));
    }

    #[test]
    fn cd_without_args_uses_home() {
        let mut sh = shell();
        let temp = std::env::temp_dir();
        sh.env_mut().set("HOME", &temp.display().to_string());
        cd(&mut sh, &[]).unwrap();
        assert_eq!(sh.pwd(), temp.as_path());
    }

    #[test]
    fn error_messages_are_printable() {
        assert_eq!(
            BuiltinError::DefUsage.to_string(),
            "def requires two arguments: def key value"
        );
        assert!(
            BuiltinError::NotADirectory("/nope".into())
                .to_string()
                .contains("/nope")
        );
    }
}
