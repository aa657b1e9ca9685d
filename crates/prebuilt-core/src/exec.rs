//! External tool invocation: spawn, stream stdout, surface non-zero exit as an error.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// One external process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, OsString>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
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

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Arguments as UTF-8 (lossy), for logging and assertions.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd.envs(&self.env);
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to start {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` failed: {status}")]
    Failed { command: String, status: ExitStatus },
}

/// Runs external commands to completion.
pub trait Runner {
    fn run(&mut self, spec: &CommandSpec) -> Result<(), ExecError>;
}

/// Runs commands as child processes, echoing their stdout line by line.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run(&mut self, spec: &CommandSpec) -> Result<(), ExecError> {
        tracing::debug!(cwd = ?spec.cwd, "exec {}", spec);
        let spawn_err = |source: io::Error| ExecError::Spawn {
            program: spec.program.clone(),
            source,
        };

        let mut child = spec
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(spawn_err)?;

        if let Some(stdout) = child.stdout.take() {
            echo_lines(BufReader::new(stdout), &mut io::stdout());
        }

        let status = child.wait().map_err(spawn_err)?;
        check_status(spec, status)
    }
}

/// Copy `reader` to `out` a line at a time, bytes untouched, until EOF.
/// Stopping early would leave the child writing into a closed pipe.
fn echo_lines(mut reader: impl BufRead, out: &mut impl Write) {
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {
                let _ = out.write_all(&line);
                let _ = out.flush();
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::warn!("reading child stdout: {}", e);
                break;
            }
        }
    }
}

fn check_status(spec: &CommandSpec, status: ExitStatus) -> Result<(), ExecError> {
    if status.success() {
        return Ok(());
    }
    tracing::warn!("{} failed: {}", spec, status);
    Err(ExecError::Failed {
        command: spec.to_string(),
        status,
    })
}

/// Remove a directory tree if it exists. Returns true when something was removed.
pub fn remove_dir_if_exists(dir: &Path) -> io::Result<bool> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
