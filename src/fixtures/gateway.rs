use rand::Rng;

use super::FixtureResult;
use crate::cloud::{Device, Project};

const GENERATED_NAME_PREFIX: &str = "generated-gw-";
const GENERATED_NAME_LENGTH: usize = 16;

/// Controls how the gateway device for a test session is obtained.
#[derive(Debug, Clone, Default)]
pub struct GatewayOptions {
    /// Use this pre-provisioned device instead of creating one.
    pub name: Option<String>,
    /// Emit CI masking directives for generated secrets.
    pub mask_secrets: bool,
}

/// A gateway device held for the duration of a test session. Generated
/// devices are deleted again on release; pre-provisioned ones are left alone.
pub struct GatewayLease {
    pub device: Box<dyn Device>,
    generated: bool,
}

impl std::fmt::Debug for GatewayLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayLease")
            .field("device", &self.device.name())
            .field("generated", &self.generated)
            .finish()
    }
}

impl GatewayLease {
    pub async fn acquire(project: &dyn Project, opts: &GatewayOptions) -> FixtureResult<Self> {
        if let Some(name) = &opts.name {
            let device = project.device_by_name(name).await?;
            return Ok(GatewayLease { device, generated: false });
        }

        let name = generated_name();
        if opts.mask_secrets {
            // The generated name doubles as PSK identity and key, keep it out
            // of CI logs
            println!("::add-mask::{name}");
        }

        log::info!("Creating gateway device");
        let device = project.create_device(&name, &name).await?;
        device.add_credential(&name, &name).await?;

        Ok(GatewayLease { device, generated: true })
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub async fn release(self, project: &dyn Project) -> FixtureResult<()> {
        if self.generated {
            log::info!("Deleting generated gateway {}", self.device.name());
            project.delete_device(self.device.name()).await?;
        }
        Ok(())
    }
}

fn generated_name() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..GENERATED_NAME_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format!("{GENERATED_NAME_PREFIX}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_names_are_prefixed_and_unique() {
        let a = generated_name();
        let b = generated_name();

        assert!(a.starts_with(GENERATED_NAME_PREFIX));
        assert_eq!(a.len(), GENERATED_NAME_PREFIX.len() + GENERATED_NAME_LENGTH);
        assert_ne!(a, b);
    }
}
