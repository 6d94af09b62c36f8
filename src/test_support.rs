use std::cell::{Cell, RefCell};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::Path;
use std::process::ExitStatus;
use std::sync::{Mutex, MutexGuard};

use tempfile::TempDir;

use crate::bundle::{BundleLocator, BundledWheels, PROJECTS};
use crate::probe::{InstalledToolInfo, PipProbe};
use crate::runner::{PipInvocation, PipRunner, RunnerError};

/// Global lock for tests that mutate process-wide environment variables.
static ENV_LOCK: Mutex<()> = Mutex::new(());

pub fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().expect("env lock should not be poisoned")
}

pub struct EnvVarGuard {
    key: String,
    prev: Option<OsString>,
}

impl EnvVarGuard {
    pub fn set(key: &str, value: impl AsRef<OsStr>) -> Self {
        let prev = std::env::var_os(key);
        std::env::set_var(key, value);
        Self {
            key: key.to_string(),
            prev,
        }
    }

    pub fn remove(key: &str) -> Self {
        let prev = std::env::var_os(key);
        std::env::remove_var(key);
        Self {
            key: key.to_string(),
            prev,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => std::env::set_var(&self.key, v),
            None => std::env::remove_var(&self.key),
        }
    }
}

#[cfg(unix)]
pub fn write_executable(path: &Path, contents: &str) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::write(path, contents)?;
    let perms = fs::Permissions::from_mode(0o755);
    fs::set_permissions(path, perms)?;
    Ok(())
}

/// A bundle directory holding placeholder wheels for every project.
pub fn fake_bundle() -> (TempDir, BundledWheels) {
    let dir = TempDir::new().expect("create bundle dir");
    let bundle = BundledWheels::new(dir.path());
    for project in &PROJECTS {
        fs::write(bundle.wheel_path(project), project.name).expect("write fake wheel");
    }
    (dir, bundle)
}

/// Records every invocation instead of running pip.
#[derive(Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<PipInvocation>>,
}

impl RecordingRunner {
    pub fn calls(&self) -> Vec<PipInvocation> {
        self.calls.borrow().clone()
    }
}

impl PipRunner for RecordingRunner {
    fn run_pip(&self, invocation: &PipInvocation) -> Result<(), RunnerError> {
        self.calls.borrow_mut().push(invocation.clone());
        Ok(())
    }
}

/// Exit code reported by [`FailingRunner`].
pub const FAILING_EXIT: i32 = 3;

/// Behaves like a pip run that exits with [`FAILING_EXIT`].
pub struct FailingRunner;

impl PipRunner for FailingRunner {
    fn run_pip(&self, _invocation: &PipInvocation) -> Result<(), RunnerError> {
        Err(RunnerError::Failed {
            status: exit_status(FAILING_EXIT),
        })
    }
}

pub fn exit_status(code: i32) -> ExitStatus {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }
    #[cfg(windows)]
    {
        use std::os::windows::process::ExitStatusExt;
        ExitStatus::from_raw(code as u32)
    }
}

pub struct FakeProbe {
    info: Option<InstalledToolInfo>,
    probes: Cell<usize>,
}

impl FakeProbe {
    pub fn new(info: InstalledToolInfo) -> Self {
        Self {
            info: Some(info),
            probes: Cell::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            info: None,
            probes: Cell::new(0),
        }
    }

    pub fn probes(&self) -> usize {
        self.probes.get()
    }
}

impl PipProbe for FakeProbe {
    fn installed_pip(&self) -> Result<InstalledToolInfo, RunnerError> {
        self.probes.set(self.probes.get() + 1);
        self.info
            .clone()
            .ok_or_else(|| RunnerError::Probe("ModuleNotFoundError: boom".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_var_guard_restores_previous_value() {
        let _lock = env_lock();

        std::env::remove_var("ENSUREPIP_TEST_ENV");
        {
            let _g = EnvVarGuard::set("ENSUREPIP_TEST_ENV", "value1");
            assert_eq!(std::env::var("ENSUREPIP_TEST_ENV").unwrap(), "value1");
        }
        assert!(std::env::var("ENSUREPIP_TEST_ENV").is_err());

        std::env::set_var("ENSUREPIP_TEST_ENV", "prev");
        {
            let _g = EnvVarGuard::remove("ENSUREPIP_TEST_ENV");
            assert!(std::env::var("ENSUREPIP_TEST_ENV").is_err());
        }
        assert_eq!(std::env::var("ENSUREPIP_TEST_ENV").unwrap(), "prev");
        std::env::remove_var("ENSUREPIP_TEST_ENV");
    }

    #[test]
    fn fake_bundle_has_every_wheel() {
        let (_dir, bundle) = fake_bundle();
        for project in &PROJECTS {
            assert!(bundle.wheel_path(project).is_file());
        }
    }

    #[test]
    fn failing_runner_reports_pip_exit_status() {
        let err = FailingRunner
            .run_pip(&PipInvocation::new(vec![]))
            .unwrap_err();
        match err {
            RunnerError::Failed { status } => {
                assert!(!status.success());
                assert_eq!(status.code(), Some(FAILING_EXIT));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn write_executable_errors_when_path_is_directory() {
        let dir = TempDir::new().unwrap();
        let err = write_executable(dir.path(), "#!/bin/sh\nexit 0\n").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::IsADirectory);
    }
}
