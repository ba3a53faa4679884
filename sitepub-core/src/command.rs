//! External command lines with captured output.
//!
//! Every collaborator this tool drives (container runtime, `git`, `id`) is an
//! opaque program. [`CommandLine`] keeps the program and arguments together so
//! failures can always name the exact command that was run.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::CommandError;

/// Program, arguments and working directory of one external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

/// Captured result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Trimmed stderr, falling back to stdout when stderr is empty.
    pub fn detail(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }

    pub fn status_label(&self) -> String {
        match self.code {
            Some(code) => code.to_string(),
            None => "signal".to_string(),
        }
    }
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Run to completion and capture output. Only a launch failure is an error;
    /// a non-zero exit is reported through [`ExecOutput::code`].
    pub fn output(&self) -> Result<ExecOutput, CommandError> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }
        tracing::debug!(command = %self, "running");
        let output = command.output().map_err(|e| CommandError::Spawn {
            command: self.to_string(),
            source: e,
        })?;
        Ok(ExecOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Run to completion and require a zero exit status.
    pub fn run(&self) -> Result<ExecOutput, CommandError> {
        let output = self.output()?;
        self.check(output)
    }

    /// Turn a non-zero exit into [`CommandError::Failed`].
    pub fn check(&self, output: ExecOutput) -> Result<ExecOutput, CommandError> {
        if output.success() {
            return Ok(output);
        }
        Err(CommandError::Failed {
            command: self.to_string(),
            status: output.status_label(),
            detail: output.detail(),
        })
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg.replace('\'', "'\\''"))?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_arguments_with_spaces() {
        let cmd = CommandLine::new("docker")
            .args(["exec", "c1", "/bin/sh", "-c"])
            .arg("bundle exec rake test");
        assert_eq!(
            cmd.to_string(),
            "docker exec c1 /bin/sh -c 'bundle exec rake test'"
        );
    }

    #[test]
    fn detail_prefers_stderr() {
        let out = ExecOutput {
            code: Some(1),
            stdout: "out\n".to_string(),
            stderr: "  err \n".to_string(),
        };
        assert_eq!(out.detail(), "err");
        let out = ExecOutput {
            code: Some(1),
            stdout: "only out\n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(out.detail(), "only out");
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let err = CommandLine::new("sitepub-definitely-not-a-binary")
            .output()
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }), "got: {err}");
    }

    #[test]
    #[cfg(unix)]
    fn non_zero_exit_is_failed_with_detail() {
        let err = CommandLine::new("sh")
            .args(["-c", "echo boom >&2; exit 3"])
            .run()
            .unwrap_err();
        match err {
            CommandError::Failed { status, detail, .. } => {
                assert_eq!(status, "3");
                assert_eq!(detail, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    #[cfg(unix)]
    fn current_dir_is_applied() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = CommandLine::new("pwd").current_dir(tmp.path()).run().unwrap();
        let reported = std::path::PathBuf::from(out.stdout.trim());
        assert_eq!(
            reported.canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }
}
