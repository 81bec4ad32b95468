//! Seam to the device test harness. The harness owns process launch and log
//! capture; fixtures configure it through [`DeviceAdapter`] before launch.

use std::path::{Path, PathBuf};
use std::time::Duration;

pub type HarnessResult<T> = Result<T, HarnessError>;

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("Device process error: {0:?}")]
    Io(#[from] std::io::Error),
    #[error("Timed out waiting for {0:?} in device log")]
    Timeout(String),
    #[error("Device adapter error: {0:?}")]
    Other(anyhow::Error),
}

/// Per-device configuration as supplied by the test harness.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub build_dir: PathBuf,
}

/// Process/log adapter for one device under test.
pub trait DeviceAdapter {
    fn config(&self) -> &DeviceConfig;

    /// Path of the build tool used to launch all domains of a build.
    fn west(&self) -> &Path;

    /// Overrides the command the adapter launches.
    fn set_command(&mut self, argv: Vec<String>);
    fn set_cwd(&mut self, dir: &Path);
    fn set_env(&mut self, key: &str, value: &str);

    fn initialize_log_files(&mut self, test_name: &str);

    fn launch(&mut self) -> HarnessResult<()>;
    fn close(&mut self);

    /// Reads device log lines until one matches `pattern`, returning every
    /// line read so far.
    fn readlines_until(&mut self, pattern: &str, timeout: Duration) -> HarnessResult<Vec<String>>;
}
