use std::str::FromStr;

use pep440_rs::Version;
use tracing::{debug, info, warn};

use crate::bundle::{PIP_VERSION, PROJECTS};
use crate::command_line::{CommandLine, Verbosity};
use crate::error::EnsurepipError;
use crate::probe::PipProbe;
use crate::runner::{PipInvocation, PipRunner};

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UninstallConfig {
    pub verbosity: Verbosity,
}

impl UninstallConfig {
    /// Arguments for `pip uninstall`; projects go in reverse install order.
    pub fn uninstall_args(&self) -> Vec<String> {
        let mut cmd = CommandLine::new("uninstall");
        cmd.arg("-y").verbosity(self.verbosity);
        for project in PROJECTS.iter().rev() {
            cmd.arg(project.name);
        }
        cmd.finish()
    }
}

/// Removes pip and setuptools, but only from an environment where pip
/// reports a sensible version.
pub struct Uninstaller<'a> {
    runner: &'a dyn PipRunner,
    probe: &'a dyn PipProbe,
}

impl<'a> Uninstaller<'a> {
    pub fn new(runner: &'a dyn PipRunner, probe: &'a dyn PipProbe) -> Self {
        Self { runner, probe }
    }

    pub fn uninstall(&self, config: &UninstallConfig) -> Result<(), EnsurepipError> {
        let installed = self.probe.installed_pip()?;
        if !installed.present {
            info!("pip is not installed, nothing to uninstall");
            return Ok(());
        }

        let raw = installed.version.unwrap_or_default();
        let version = Version::from_str(&raw).map_err(|err| EnsurepipError::VersionParse {
            version: raw.clone(),
            reason: err.to_string(),
        })?;
        if raw != PIP_VERSION {
            warn!("installed pip {version} differs from bundled pip {PIP_VERSION}");
        }

        let invocation = PipInvocation::new(config.uninstall_args());
        debug!(args = ?invocation.args, "built uninstall invocation");

        self.runner.run_pip(&invocation)?;
        info!("uninstalled pip {version} and setuptools");
        Ok(())
    }
}
