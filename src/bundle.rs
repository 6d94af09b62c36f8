use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;
use tracing::debug;

/// Bundled pip version.
pub const PIP_VERSION: &str = "1.5.4";

/// Bundled setuptools version.
pub const SETUPTOOLS_VERSION: &str = "2.1";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BundledProject {
    pub name: &'static str,
    pub version: &'static str,
}

impl BundledProject {
    pub fn wheel_name(&self) -> String {
        format!("{}-{}-py2.py3-none-any.whl", self.name, self.version)
    }
}

/// Projects shipped as wheels, in install order.
pub const PROJECTS: [BundledProject; 2] = [
    BundledProject {
        name: "setuptools",
        version: SETUPTOOLS_VERSION,
    },
    BundledProject {
        name: "pip",
        version: PIP_VERSION,
    },
];

/// The version of pip this tool installs.
pub fn version() -> &'static str {
    PIP_VERSION
}

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("bundled wheel for {project} not found at {}", .path.display())]
    MissingWheel { project: &'static str, path: PathBuf },

    #[error("failed to stage bundled wheels")]
    Staging(#[source] std::io::Error),

    #[error("staging directory {} is not valid UTF-8", .0.display())]
    NonUtf8Path(PathBuf),
}

pub trait BundleLocator {
    fn wheel_path(&self, project: &BundledProject) -> PathBuf;
}

/// Wheels stored side by side in one directory.
#[derive(Clone, Debug)]
pub struct BundledWheels {
    dir: PathBuf,
}

impl BundledWheels {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl BundleLocator for BundledWheels {
    fn wheel_path(&self, project: &BundledProject) -> PathBuf {
        self.dir.join(project.wheel_name())
    }
}

/// Copies of the bundled wheels in a private temporary directory.
///
/// The directory is removed when this value is dropped, so it must outlive the
/// pip invocation that reads from it.
pub struct StagedWheels {
    dir: TempDir,
    wheels: Vec<PathBuf>,
}

impl StagedWheels {
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// The staging directory as a `--find-links` argument.
    pub fn find_links(&self) -> Result<&str, BundleError> {
        utf8_path(self.dir())
    }

    /// Staged wheel files in [`PROJECTS`] order.
    pub fn wheels(&self) -> &[PathBuf] {
        &self.wheels
    }
}

fn utf8_path(path: &Path) -> Result<&str, BundleError> {
    path.to_str()
        .ok_or_else(|| BundleError::NonUtf8Path(path.to_path_buf()))
}

pub fn stage_wheels(locator: &dyn BundleLocator) -> Result<StagedWheels, BundleError> {
    let dir = TempDir::new().map_err(BundleError::Staging)?;
    let mut wheels = Vec::with_capacity(PROJECTS.len());

    for project in &PROJECTS {
        let source = locator.wheel_path(project);
        if !source.is_file() {
            return Err(BundleError::MissingWheel {
                project: project.name,
                path: source,
            });
        }
        let target = dir.path().join(project.wheel_name());
        fs::copy(&source, &target).map_err(BundleError::Staging)?;
        debug!("staged {} from {}", project.wheel_name(), source.display());
        wheels.push(target);
    }

    Ok(StagedWheels { dir, wheels })
}
