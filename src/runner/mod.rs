use std::path::PathBuf;

pub mod bsim;
pub mod group;

pub use bsim::{BsimArgs, BsimRunner};

use crate::domains::DomainsError;

pub type RunnerResult = Result<(), RunnerError>;

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("Invalid runner configuration: {0:?}")]
    Configuration(anyhow::Error),
    #[error("Domain error: {0:?}")]
    Domain(anyhow::Error),
    #[error("Failed to launch process: {0:?}")]
    Launch(anyhow::Error),
    #[error("Foreground process failed: {0:?}")]
    Foreground(anyhow::Error),
}

impl From<std::io::Error> for RunnerError {
    fn from(e: std::io::Error) -> Self {
        RunnerError::Launch(e.into())
    }
}

impl From<subprocess::PopenError> for RunnerError {
    fn from(e: subprocess::PopenError) -> Self {
        RunnerError::Launch(e.into())
    }
}

impl From<DomainsError> for RunnerError {
    fn from(e: DomainsError) -> Self {
        RunnerError::Domain(e.into())
    }
}

/// Commands a runner can be asked to carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum RunnerCommand {
    Flash,
    Debug,
}

/// Capability declaration of a runner implementation.
#[derive(Debug, Clone)]
pub struct RunnerCaps {
    pub commands: Vec<RunnerCommand>,
}

/// Pass-through configuration handed to a runner by the build tool.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Top level build directory, containing the domain description for
    /// multi-image builds.
    pub build_dir: PathBuf,
    /// Path of the firmware executable, relative to a domain's build
    /// directory.
    pub exe_file: Option<PathBuf>,
    /// GDB executable to use for debug sessions.
    pub gdb: Option<String>,
}

pub trait BinaryRunner {
    fn capabilities(&self) -> RunnerCaps;

    /// Dispatches one of the commands declared in [`Self::capabilities`].
    fn do_run(&mut self, command: RunnerCommand) -> RunnerResult;
}
