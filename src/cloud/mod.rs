//! Seam to the remote device management service. The real client lives
//! outside this crate; fixtures only ever talk to these traits.

use async_trait::async_trait;

pub type CloudResult<T> = Result<T, CloudError>;

#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    #[error("Remote API call failed: {0:?}")]
    Api(anyhow::Error),
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Pre-shared-key credential attached to a device.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Credential {
    pub identity: String,
    pub key: String,
}

/// One settings entry as reported by the management service. Entries carrying
/// a device id are device-level overrides of the project-wide value.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: serde_json::Value,
    pub device_id: Option<String>,
}

#[async_trait]
pub trait Device: Send + Sync {
    fn name(&self) -> &str;

    async fn add_credential(&self, identity: &str, key: &str) -> CloudResult<()>;
    async fn credentials(&self) -> CloudResult<Vec<Credential>>;

    /// All settings visible to this device, project-level ones included.
    async fn settings(&self) -> CloudResult<Vec<Setting>>;
    async fn set_setting(&self, key: &str, value: serde_json::Value) -> CloudResult<()>;
    async fn delete_setting(&self, key: &str) -> CloudResult<()>;
}

#[async_trait]
pub trait Project: Send + Sync {
    fn id(&self) -> &str;

    async fn device_by_name(&self, name: &str) -> CloudResult<Box<dyn Device>>;
    async fn create_device(&self, name: &str, hardware_id: &str) -> CloudResult<Box<dyn Device>>;
    async fn delete_device(&self, name: &str) -> CloudResult<()>;

    async fn set_setting(&self, key: &str, value: serde_json::Value) -> CloudResult<()>;

    /// Registers a certificate, returning its id for later deletion.
    async fn add_certificate(&self, cert_pem: &[u8], cert_type: &str) -> CloudResult<String>;
    async fn delete_certificate(&self, cert_id: &str) -> CloudResult<()>;
}
