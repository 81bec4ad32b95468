//! HIL test fixtures: provisioning, credentials and device-under-test glue
//! for the gateway sample.

pub mod creds;
pub mod dut;
pub mod gateway;
pub mod settings;

use crate::cloud::CloudError;
use crate::harness::HarnessError;

pub type FixtureResult<T> = Result<T, FixtureError>;

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("Cloud API error: {0:?}")]
    Cloud(#[from] CloudError),
    #[error("Device harness error: {0:?}")]
    Harness(#[from] HarnessError),
    #[error("External tool failed: {0:?}")]
    Tool(anyhow::Error),
    #[error("Fixture precondition failed: {0:?}")]
    Precondition(anyhow::Error),
    #[error("IO error: {0:?}")]
    Io(#[from] std::io::Error),
}
