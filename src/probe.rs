use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::runner::{isolate_pip_config, RunnerError};

/// Exit code the probe script uses when `import pip` fails.
const PIP_MISSING_EXIT: i32 = 3;

const PROBE_SCRIPT: &str = "\
import sys
try:
    import pip
except ImportError:
    sys.exit(3)
print(getattr(pip, '__version__', ''))
";

/// What the probe found out about pip in the target environment.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InstalledToolInfo {
    pub present: bool,
    pub version: Option<String>,
}

impl InstalledToolInfo {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn present(version: impl Into<String>) -> Self {
        Self {
            present: true,
            version: Some(version.into()),
        }
    }
}

pub trait PipProbe {
    fn installed_pip(&self) -> Result<InstalledToolInfo, RunnerError>;
}

/// Asks the target interpreter whether it can import pip.
#[derive(Clone, Debug)]
pub struct PythonPipProbe {
    python: PathBuf,
}

impl PythonPipProbe {
    pub fn new(python: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
        }
    }
}

impl PipProbe for PythonPipProbe {
    fn installed_pip(&self) -> Result<InstalledToolInfo, RunnerError> {
        let mut cmd = Command::new(&self.python);
        cmd.arg("-c").arg(PROBE_SCRIPT);
        isolate_pip_config(&mut cmd);

        let output = cmd.output().map_err(|source| RunnerError::Spawn {
            program: self.python.display().to_string(),
            source,
        })?;

        if output.status.code() == Some(PIP_MISSING_EXIT) {
            debug!(python = %self.python.display(), "pip is not importable");
            return Ok(InstalledToolInfo::absent());
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RunnerError::Probe(
                stderr.lines().last().unwrap_or_default().trim().to_string(),
            ));
        }

        // Only the first line carries the version
        let stdout = String::from_utf8_lossy(&output.stdout);
        let version = stdout.lines().next().unwrap_or_default().trim().to_string();
        debug!(python = %self.python.display(), %version, "found pip");
        Ok(InstalledToolInfo::present(version))
    }
}
