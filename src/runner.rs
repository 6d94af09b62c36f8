use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode, ExitStatus, Stdio};

use thiserror::Error;
use tracing::debug;
use which::which;

/// Environment changes applied to the pip child process only.
///
/// A key mapped to `None` is removed from the child even if the parent has it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EnvOverlay {
    vars: BTreeMap<String, Option<String>>,
}

impl EnvOverlay {
    pub fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), Some(value.to_string()));
    }

    pub fn remove(&mut self, key: &str) {
        self.vars.insert(key.to_string(), None);
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).and_then(|v| v.as_deref())
    }

    /// True when `key` is given a value in the child.
    #[cfg(test)]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    #[cfg(test)]
    pub fn removes(&self, key: &str) -> bool {
        matches!(self.vars.get(key), Some(None))
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}

/// Everything a single pip call receives.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PipInvocation {
    pub args: Vec<String>,
    /// Prepended to the interpreter's module search path.
    pub additional_paths: Vec<PathBuf>,
    pub env: EnvOverlay,
}

impl PipInvocation {
    pub fn new(args: Vec<String>) -> Self {
        Self {
            args,
            ..Self::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("python interpreter not found: {0}")]
    InterpreterNotFound(String),

    #[error("failed to execute {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot build PYTHONPATH for pip")]
    InvalidSearchPath(#[source] std::env::JoinPathsError),

    #[error("pip exited with {status}")]
    Failed { status: ExitStatus },

    #[error("unexpected output while probing for pip: {0}")]
    Probe(String),
}

impl RunnerError {
    /// Exit code the CLI should report for this failure.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Failed { status } => exit_code_from_status(*status),
            _ => ExitCode::from(1),
        }
    }
}

pub trait PipRunner {
    fn run_pip(&self, invocation: &PipInvocation) -> Result<(), RunnerError>;
}

/// Runs pip as `<python> -m pip`.
#[derive(Clone, Debug)]
pub struct PythonPipRunner {
    python: PathBuf,
}

impl PythonPipRunner {
    pub fn new(python: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
        }
    }

    fn command(&self, invocation: &PipInvocation) -> Result<Command, RunnerError> {
        let mut cmd = Command::new(&self.python);
        cmd.arg("-m").arg("pip");
        cmd.args(&invocation.args);

        isolate_pip_config(&mut cmd);

        if !invocation.additional_paths.is_empty() {
            cmd.env("PYTHONPATH", python_path(&invocation.additional_paths)?);
        }
        for (key, value) in invocation.env.iter() {
            match value {
                Some(value) => cmd.env(key, value),
                None => cmd.env_remove(key),
            };
        }

        cmd.stdin(Stdio::inherit());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());
        Ok(cmd)
    }
}

impl PipRunner for PythonPipRunner {
    fn run_pip(&self, invocation: &PipInvocation) -> Result<(), RunnerError> {
        let mut cmd = self.command(invocation)?;
        debug!(python = %self.python.display(), args = ?invocation.args, "running pip");

        let status = cmd.status().map_err(|source| RunnerError::Spawn {
            program: self.python.display().to_string(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(RunnerError::Failed { status })
        }
    }
}

/// Keep the user's pip configuration away from the bundled install.
pub(crate) fn isolate_pip_config(cmd: &mut Command) {
    for (key, _) in std::env::vars_os() {
        if key.to_string_lossy().starts_with("PIP_") {
            cmd.env_remove(key);
        }
    }
    cmd.env("PIP_CONFIG_FILE", null_device());
}

fn null_device() -> &'static str {
    #[cfg(windows)]
    {
        "nul"
    }
    #[cfg(not(windows))]
    {
        "/dev/null"
    }
}

fn python_path(additional: &[PathBuf]) -> Result<OsString, RunnerError> {
    let mut entries: Vec<PathBuf> = additional.to_vec();
    if let Some(existing) = std::env::var_os("PYTHONPATH") {
        entries.extend(std::env::split_paths(&existing));
    }
    std::env::join_paths(&entries).map_err(RunnerError::InvalidSearchPath)
}

pub fn resolve_interpreter(configured: &str, fallbacks: &[&str]) -> Result<PathBuf, RunnerError> {
    // If configured path is absolute, use it directly
    let path = Path::new(configured);
    if path.is_absolute() {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(RunnerError::InterpreterNotFound(configured.to_string()));
    }

    if let Ok(resolved) = which(configured) {
        return Ok(resolved);
    }

    for fallback in fallbacks {
        if let Ok(resolved) = which(fallback) {
            return Ok(resolved);
        }
    }

    Err(RunnerError::InterpreterNotFound(configured.to_string()))
}

fn exit_code_from_status(status: ExitStatus) -> ExitCode {
    let code = status
        .code()
        .and_then(|c| u8::try_from(c).ok())
        .filter(|c| *c != 0)
        .unwrap_or(1);
    ExitCode::from(code)
}
