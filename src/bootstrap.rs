use tracing::{debug, info};

use crate::bundle::{stage_wheels, BundleLocator, PROJECTS};
use crate::command_line::{CommandLine, Verbosity};
use crate::error::EnsurepipError;
use crate::runner::{EnvOverlay, PipInvocation, PipRunner};

/// Tells the installed pip which script names to create.
pub const ENSUREPIP_OPTIONS: &str = "ENSUREPIP_OPTIONS";

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BootstrapConfig {
    pub root: Option<String>,
    pub upgrade: bool,
    pub user: bool,
    pub altinstall: bool,
    pub default_pip: bool,
    pub verbosity: Verbosity,
}

impl BootstrapConfig {
    pub fn validate(&self) -> Result<(), EnsurepipError> {
        if self.altinstall && self.default_pip {
            return Err(EnsurepipError::ConflictingModes);
        }
        Ok(())
    }

    /// Arguments for `pip install`, with `find_links` as the wheel source.
    pub fn install_args(&self, find_links: &str) -> Vec<String> {
        let mut cmd = CommandLine::new("install");
        cmd.arg("--no-index")
            .arg("--find-links")
            .arg(find_links)
            .arg("--pre");
        if let Some(root) = &self.root {
            cmd.arg("--root").arg(root.as_str());
        }
        cmd.arg_if(self.user, "--user")
            .arg_if(self.upgrade, "--upgrade")
            .verbosity(self.verbosity)
            .arg_if(self.altinstall, "--altinstall");
        for project in &PROJECTS {
            cmd.arg(project.name);
        }
        cmd.finish()
    }

    /// `ENSUREPIP_OPTIONS` names the mode; with `default_pip` it is cleared
    /// so a value inherited from the caller does not leak through.
    pub fn env_overlay(&self) -> EnvOverlay {
        let mut env = EnvOverlay::default();
        if self.altinstall {
            env.set(ENSUREPIP_OPTIONS, "altinstall");
        } else if self.default_pip {
            env.remove(ENSUREPIP_OPTIONS);
        } else {
            env.set(ENSUREPIP_OPTIONS, "install");
        }
        env
    }
}

/// Installs the bundled setuptools and pip through a [`PipRunner`].
pub struct Bootstrapper<'a> {
    runner: &'a dyn PipRunner,
    bundle: &'a dyn BundleLocator,
}

impl<'a> Bootstrapper<'a> {
    pub fn new(runner: &'a dyn PipRunner, bundle: &'a dyn BundleLocator) -> Self {
        Self { runner, bundle }
    }

    pub fn bootstrap(&self, config: &BootstrapConfig) -> Result<(), EnsurepipError> {
        config.validate()?;

        let staged = stage_wheels(self.bundle)?;
        let invocation = PipInvocation {
            args: config.install_args(staged.find_links()?),
            additional_paths: staged.wheels().to_vec(),
            env: config.env_overlay(),
        };
        debug!(args = ?invocation.args, "built install invocation");

        self.runner.run_pip(&invocation)?;
        info!("installed bundled setuptools and pip");
        Ok(())
    }
}
