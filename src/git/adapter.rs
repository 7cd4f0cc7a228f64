//! Subprocess adapter for `git` and the `git flow` extension.
//!
//! All repository mutations go through [GitAdapter::invoke]. Arguments are
//! passed as a vector, never through a shell.

use crate::error::{FlowError, Result};
use crate::ui;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Captured result of one process run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        CommandOutput {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        CommandOutput {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Spawns processes. Split out so tests can record instead of execute.
pub trait CommandRunner {
    /// Run `program args` in `cwd`.
    ///
    /// With `stream` the child's output goes straight to the terminal and the
    /// returned stdout/stderr are empty.
    fn run(&self, program: &str, args: &[String], cwd: &Path, stream: bool)
        -> Result<CommandOutput>;
}

/// Runs real processes with `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
        stream: bool,
    ) -> Result<CommandOutput> {
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(cwd);

        if stream {
            let stdout = if ui::machine_output() {
                Stdio::from(std::io::stderr())
            } else {
                Stdio::inherit()
            };
            let status = cmd
                .stdin(Stdio::inherit())
                .stdout(stdout)
                .stderr(Stdio::inherit())
                .status()?;
            return Ok(CommandOutput {
                code: status.code(),
                stdout: String::new(),
                stderr: String::new(),
            });
        }

        let output = cmd.output()?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        })
    }
}

/// Per-call behavior switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvokeOptions {
    /// Non-zero exit becomes `Ok(None)` instead of an error
    pub allow_fail: bool,
    /// Log the command instead of running it
    pub dry_run: bool,
    /// Pass child output through live
    pub stream_output: bool,
    /// Talks to a remote; skipped when the adapter is offline
    pub remote: bool,
}

/// What happened to one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Executed,
    DryRun,
    SkippedOffline,
    AllowedFailure,
    Failed,
}

/// One entry of the operation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationRecord {
    pub status: OperationStatus,
    pub command: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

/// Wrapper for invoking `git` with uniform dry-run, offline and allow-fail handling.
///
/// The adapter owns the log of everything it was asked to do; callers take it
/// with [GitAdapter::take_log] once the workflow returns.
pub struct GitAdapter {
    runner: Box<dyn CommandRunner>,
    program: String,
    cwd: PathBuf,
    dry_run: bool,
    offline: bool,
    log: Vec<OperationRecord>,
}

impl GitAdapter {
    /// Create an adapter running `git` in `cwd`
    pub fn new(runner: Box<dyn CommandRunner>, cwd: impl Into<PathBuf>) -> Self {
        GitAdapter {
            runner,
            program: "git".to_string(),
            cwd: cwd.into(),
            dry_run: false,
            offline: false,
            log: Vec::new(),
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// Operations recorded so far
    pub fn log(&self) -> &[OperationRecord] {
        &self.log
    }

    /// Drain the operation log
    pub fn take_log(&mut self) -> Vec<OperationRecord> {
        std::mem::take(&mut self.log)
    }

    /// Invoke `git` with the given arguments.
    ///
    /// # Returns
    /// * `Ok(Some(stdout))` - Success; `Some("")` for dry-run or offline skips
    /// * `Ok(None)` - Non-zero exit with `allow_fail`
    /// * `Err(SubprocessFailure)` - Non-zero exit otherwise
    pub fn invoke<S: AsRef<str>>(
        &mut self,
        args: &[S],
        options: InvokeOptions,
    ) -> Result<Option<String>> {
        let args: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();
        let command_line = render_command(&self.program, &args);

        if options.remote && self.offline {
            tracing::info!(command = %command_line, "offline, skipping remote operation");
            ui::display_status(&format!("offline: skipped `{}`", command_line));
            self.record(OperationStatus::SkippedOffline, args, None);
            return Ok(Some(String::new()));
        }

        if options.dry_run {
            ui::display_dry_run(&command_line);
            self.record(OperationStatus::DryRun, args, None);
            return Ok(Some(String::new()));
        }

        tracing::debug!(command = %command_line, "running");
        let output = self
            .runner
            .run(&self.program, &args, &self.cwd, options.stream_output)?;

        if output.is_success() {
            self.record(OperationStatus::Executed, args, output.code);
            return Ok(Some(output.stdout));
        }

        let code = output.code.unwrap_or(-1);
        if options.allow_fail {
            tracing::debug!(command = %command_line, code, "allowed failure");
            self.record(OperationStatus::AllowedFailure, args, output.code);
            return Ok(None);
        }

        if !output.stderr.is_empty() {
            ui::display_command_stderr(&output.stderr);
        }
        self.record(OperationStatus::Failed, args, output.code);
        Err(FlowError::SubprocessFailure {
            command: command_line,
            code,
            stderr: output.stderr,
        })
    }

    /// Mutating local command; honors the adapter's dry-run switch
    pub fn run<S: AsRef<str>>(&mut self, args: &[S]) -> Result<String> {
        let options = InvokeOptions {
            dry_run: self.dry_run,
            ..Default::default()
        };
        Ok(self.invoke(args, options)?.unwrap_or_default())
    }

    /// Mutating command whose output is shown live (merges, finishes)
    pub fn run_streamed<S: AsRef<str>>(&mut self, args: &[S]) -> Result<()> {
        let options = InvokeOptions {
            dry_run: self.dry_run,
            stream_output: true,
            ..Default::default()
        };
        self.invoke(args, options)?;
        Ok(())
    }

    /// Command that talks to a remote (push, pull, publish)
    pub fn run_remote<S: AsRef<str>>(&mut self, args: &[S], stream: bool) -> Result<()> {
        let options = InvokeOptions {
            dry_run: self.dry_run,
            stream_output: stream,
            remote: true,
            ..Default::default()
        };
        self.invoke(args, options)?;
        Ok(())
    }

    /// Read-only remote existence probe; runs even in dry-run.
    ///
    /// Offline it reports absent without contacting anything.
    pub fn probe_remote<S: AsRef<str>>(&mut self, args: &[S]) -> Result<Option<String>> {
        if self.offline {
            return Ok(None);
        }
        self.invoke(
            args,
            InvokeOptions {
                allow_fail: true,
                remote: true,
                ..Default::default()
            },
        )
    }

    fn record(&mut self, status: OperationStatus, args: Vec<String>, exit_code: Option<i32>) {
        let mut command = Vec::with_capacity(args.len() + 1);
        command.push(self.program.clone());
        command.extend(args);
        self.log.push(OperationRecord {
            status,
            command,
            exit_code,
        });
    }
}

/// Human-readable command line; arguments with spaces or quotes are single-quoted.
pub fn render_command(program: &str, args: &[String]) -> String {
    let mut out = program.to_string();
    for arg in args {
        out.push(' ');
        if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"') {
            out.push('\'');
            out.push_str(&arg.replace('\'', r"'\''"));
            out.push('\'');
        } else {
            out.push_str(arg);
        }
    }
    out
}
