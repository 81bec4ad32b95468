use std::time::Duration;

use anyhow::anyhow;

use super::{FixtureError, FixtureResult};
use crate::cloud::Device;
use crate::harness::{DeviceAdapter, HarnessResult};

pub const PSK_ID_ENV: &str = "SAMPLE_PSK_ID";
pub const PSK_ENV: &str = "SAMPLE_PSK";

/// A launched device under test. The adapter is closed on drop, so the
/// device's processes go away on every exit path of the owning test.
pub struct Dut<'a> {
    adapter: &'a mut dyn DeviceAdapter,
}

impl std::fmt::Debug for Dut<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dut").finish_non_exhaustive()
    }
}

impl<'a> Dut<'a> {
    /// Launches the gateway sample with the gateway's first PSK credential in
    /// the environment.
    pub async fn launch(
        adapter: &'a mut dyn DeviceAdapter,
        gateway: &dyn Device,
        test_name: &str,
    ) -> FixtureResult<Dut<'a>> {
        adapter.initialize_log_files(test_name);

        // Run `west flash -d <build_dir>` instead of the domain executable
        // directly, so every BabbleSim domain of the build is launched.
        let build_dir = adapter.config().build_dir.clone();
        let west = adapter.west().to_string_lossy().into_owned();
        adapter.set_command(vec![
            west,
            "flash".into(),
            "-d".into(),
            build_dir.to_string_lossy().into_owned(),
        ]);
        adapter.set_cwd(&build_dir);

        let cred = gateway.credentials().await?.into_iter().next().ok_or_else(|| {
            FixtureError::Precondition(anyhow!("Gateway has no credential to hand to the sample"))
        })?;
        adapter.set_env(PSK_ID_ENV, &cred.identity);
        adapter.set_env(PSK_ENV, &cred.key);

        adapter.launch()?;
        Ok(Dut { adapter })
    }

    pub fn readlines_until(
        &mut self,
        pattern: &str,
        timeout: Duration,
    ) -> HarnessResult<Vec<String>> {
        self.adapter.readlines_until(pattern, timeout)
    }
}

impl Drop for Dut<'_> {
    fn drop(&mut self) {
        self.adapter.close();
    }
}
