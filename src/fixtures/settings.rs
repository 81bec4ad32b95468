use serde_json::Value;

use super::FixtureResult;
use crate::cloud::{Device, Project};

/// Deletes every device-level occurrence of `key`, leaving project-level
/// values in place. Used before a test run and again as cleanup.
pub async fn reset_device_setting(device: &dyn Device, key: &str) -> FixtureResult<()> {
    log::info!("Delete existing device-level setting {key}");
    for setting in device.settings().await? {
        if setting.device_id.is_some() && setting.key == key {
            device.delete_setting(&setting.key).await?;
        }
    }
    Ok(())
}

/// Makes sure the project carries `key` with the given value.
pub async fn ensure_project_setting(
    project: &dyn Project,
    key: &str,
    value: Value,
) -> FixtureResult<()> {
    log::info!("Ensure the project-level setting {key} exists");
    project.set_setting(key, value).await?;
    Ok(())
}
