use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use gateway_hil::cloud::{CloudError, CloudResult, Credential, Device, Project, Setting};
use gateway_hil::harness::{DeviceAdapter, DeviceConfig, HarnessError, HarnessResult};

/// Shared in-memory state behind the mock management service. Tests inspect
/// it after driving the fixtures.
#[derive(Default)]
pub struct CloudState {
    pub devices: Vec<String>,
    pub deleted_devices: Vec<String>,
    pub credentials: Vec<(String, Credential)>,
    pub settings: Vec<Setting>,
    pub project_settings: Vec<(String, serde_json::Value)>,
    pub certificates: Vec<(String, Vec<u8>)>,
    pub deleted_certificates: Vec<String>,
}

pub type SharedState = Arc<Mutex<CloudState>>;

pub struct MockProject {
    pub state: SharedState,
}

impl MockProject {
    pub fn new() -> (Self, SharedState) {
        let state = SharedState::default();
        (MockProject { state: state.clone() }, state)
    }
}

#[async_trait]
impl Project for MockProject {
    fn id(&self) -> &str {
        "mock-project"
    }

    async fn device_by_name(&self, name: &str) -> CloudResult<Box<dyn Device>> {
        let state = self.state.lock().unwrap();
        if !state.devices.iter().any(|d| d == name) {
            return Err(CloudError::NotFound(name.to_string()));
        }
        Ok(Box::new(MockDevice { name: name.to_string(), state: self.state.clone() }))
    }

    async fn create_device(&self, name: &str, _hardware_id: &str) -> CloudResult<Box<dyn Device>> {
        self.state.lock().unwrap().devices.push(name.to_string());
        Ok(Box::new(MockDevice { name: name.to_string(), state: self.state.clone() }))
    }

    async fn delete_device(&self, name: &str) -> CloudResult<()> {
        let mut state = self.state.lock().unwrap();
        state.devices.retain(|d| d != name);
        state.deleted_devices.push(name.to_string());
        Ok(())
    }

    async fn set_setting(&self, key: &str, value: serde_json::Value) -> CloudResult<()> {
        self.state.lock().unwrap().project_settings.push((key.to_string(), value));
        Ok(())
    }

    async fn add_certificate(&self, cert_pem: &[u8], cert_type: &str) -> CloudResult<String> {
        let mut state = self.state.lock().unwrap();
        let id = format!("{cert_type}-{}", state.certificates.len());
        state.certificates.push((id.clone(), cert_pem.to_vec()));
        Ok(id)
    }

    async fn delete_certificate(&self, cert_id: &str) -> CloudResult<()> {
        self.state.lock().unwrap().deleted_certificates.push(cert_id.to_string());
        Ok(())
    }
}

pub struct MockDevice {
    pub name: String,
    pub state: SharedState,
}

#[async_trait]
impl Device for MockDevice {
    fn name(&self) -> &str {
        &self.name
    }

    async fn add_credential(&self, identity: &str, key: &str) -> CloudResult<()> {
        self.state.lock().unwrap().credentials.push((
            self.name.clone(),
            Credential { identity: identity.to_string(), key: key.to_string() },
        ));
        Ok(())
    }

    async fn credentials(&self) -> CloudResult<Vec<Credential>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .credentials
            .iter()
            .filter(|(device, _)| device == &self.name)
            .map(|(_, cred)| cred.clone())
            .collect())
    }

    async fn settings(&self) -> CloudResult<Vec<Setting>> {
        Ok(self.state.lock().unwrap().settings.clone())
    }

    async fn set_setting(&self, key: &str, value: serde_json::Value) -> CloudResult<()> {
        self.state.lock().unwrap().settings.push(Setting {
            key: key.to_string(),
            value,
            device_id: Some(self.name.clone()),
        });
        Ok(())
    }

    async fn delete_setting(&self, key: &str) -> CloudResult<()> {
        self.state
            .lock()
            .unwrap()
            .settings
            .retain(|s| !(s.key == key && s.device_id.as_deref() == Some(&self.name)));
        Ok(())
    }
}

/// Device adapter double recording the configuration the fixtures apply.
pub struct MockAdapter {
    pub config: DeviceConfig,
    pub west: PathBuf,
    pub command: Option<Vec<String>>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
    pub launched: bool,
    pub closed: bool,
    pub log_name: Option<String>,
    pub log_lines: Vec<String>,
}

impl MockAdapter {
    pub fn new(build_dir: &Path) -> Self {
        MockAdapter {
            config: DeviceConfig { build_dir: build_dir.to_path_buf() },
            west: PathBuf::from("/usr/bin/west"),
            command: None,
            cwd: None,
            env: Vec::new(),
            launched: false,
            closed: false,
            log_name: None,
            log_lines: Vec::new(),
        }
    }
}

impl DeviceAdapter for MockAdapter {
    fn config(&self) -> &DeviceConfig {
        &self.config
    }

    fn west(&self) -> &Path {
        &self.west
    }

    fn set_command(&mut self, argv: Vec<String>) {
        self.command = Some(argv);
    }

    fn set_cwd(&mut self, dir: &Path) {
        self.cwd = Some(dir.to_path_buf());
    }

    fn set_env(&mut self, key: &str, value: &str) {
        self.env.push((key.to_string(), value.to_string()));
    }

    fn initialize_log_files(&mut self, test_name: &str) {
        self.log_name = Some(test_name.to_string());
    }

    fn launch(&mut self) -> HarnessResult<()> {
        self.launched = true;
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn readlines_until(&mut self, pattern: &str, _timeout: Duration) -> HarnessResult<Vec<String>> {
        match self.log_lines.iter().position(|line| line.contains(pattern)) {
            Some(index) => Ok(self.log_lines[..=index].to_vec()),
            None => Err(HarnessError::Timeout(pattern.to_string())),
        }
    }
}
