//! Synchronous execution of external commands.
//!
//! A command runs once, to completion, with no timeout and no retry.

use crate::error::{CalibratorError, Result};
use crate::output::OutputFormatter;
use std::ffi::OsString;
use std::fmt;
use std::process::Command;

/// A program and its arguments, kept as separate tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    /// Arguments are kept as OS strings so non-UTF-8 paths pass through intact.
    pub args: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for ExternalCommand {
    /// Renders the command as it would be typed into a POSIX shell.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(&arg.to_string_lossy()))?;
        }
        Ok(())
    }
}

fn shell_quote(token: &str) -> String {
    let is_plain = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_=./,:@%+".contains(c));
    if is_plain {
        token.to_string()
    } else {
        format!("'{}'", token.replace('\'', r"'\''"))
    }
}

/// Runs a command and returns its captured output as text.
///
/// The returned text is stdout followed by stderr. On a non-zero exit the
/// captured output is printed before the error is returned.
///
/// # Errors
///
/// * `Spawn` if the program cannot be started.
/// * `ProcessFailure` if it exits unsuccessfully.
pub fn run(command: &ExternalCommand) -> Result<String> {
    let output = Command::new(&command.program)
        .args(&command.args)
        .output()
        .map_err(|source| CalibratorError::Spawn {
            command: command.to_string(),
            source,
        })?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        OutputFormatter::plain(&text);
        return Err(CalibratorError::ProcessFailure {
            code: output.status.code(),
            command: command.to_string(),
            output: text,
        });
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_quotes_only_when_needed() {
        let command = ExternalCommand::new("calibredb")
            .arg("add")
            .arg("--title=Foo Bar")
            .arg("--authors=O'Brien")
            .arg("--library-path=/books/lib");
        assert_eq!(
            command.to_string(),
            r"calibredb add '--title=Foo Bar' '--authors=O'\''Brien' --library-path=/books/lib"
        );
    }

    #[test]
    fn test_display_quotes_empty_argument() {
        let command = ExternalCommand::new("calibredb").arg("");
        assert_eq!(command.to_string(), "calibredb ''");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_captures_stdout_then_stderr() {
        let command = ExternalCommand::new("sh").args(["-c", "echo out; echo err >&2"]);
        let output = run(&command).unwrap();
        assert_eq!(output, "out\nerr\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_keeps_arguments_intact() {
        let command = ExternalCommand::new("printf").args(["%s|", "Foo Bar", "\"quoted\""]);
        assert_eq!(run(&command).unwrap(), "Foo Bar|\"quoted\"|");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_non_zero_exit() {
        let command = ExternalCommand::new("sh").args(["-c", "echo failing; exit 3"]);
        match run(&command) {
            Err(CalibratorError::ProcessFailure {
                code,
                command,
                output,
            }) => {
                assert_eq!(code, Some(3));
                assert!(command.starts_with("sh -c"));
                assert_eq!(output, "failing\n");
            }
            other => panic!("expected ProcessFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_run_missing_program() {
        let command = ExternalCommand::new("calibrator-no-such-program-xyz");
        assert!(matches!(run(&command), Err(CalibratorError::Spawn { .. })));
    }
}
