use thiserror::Error;

use crate::bundle::BundleError;
use crate::runner::RunnerError;

#[derive(Debug, Error)]
pub enum EnsurepipError {
    #[error("cannot use --altinstall and --default-pip together")]
    ConflictingModes,

    #[error("verbosity must be between 0 and 3, got {0}")]
    InvalidVerbosity(u8),

    /// The installed pip reported a version string that is not PEP 440.
    #[error("installed pip reports an unrecognized version {version:?}: {reason}")]
    VersionParse { version: String, reason: String },

    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error(transparent)]
    Delegated(#[from] RunnerError),
}
