use std::path::{Path, PathBuf};

use anyhow::anyhow;

/// Name of the domain description file generated into the build directory.
pub const DOMAINS_FILE_NAME: &str = "domains.toml";

#[derive(Debug, thiserror::Error)]
pub enum DomainsError {
    #[error("Failed to read domain description: {0:?}")]
    Io(#[from] std::io::Error),
    #[error("Malformed domain description: {0:?}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid domain description: {0:?}")]
    Invalid(anyhow::Error),
}

/// One independently built firmware image participating in a multi-process
/// simulated run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct Domain {
    pub name: String,
    pub build_dir: PathBuf,
}

/// Domain description of a multi-image build, as generated by the build
/// system into the top level build directory.
#[derive(Debug, serde::Deserialize)]
pub struct Domains {
    default: String,
    build_dir: PathBuf,
    domains: Vec<Domain>,
    flash_order: Option<Vec<String>>,
}

impl Domains {
    pub fn from_file(path: &Path) -> Result<Self, DomainsError> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, DomainsError> {
        let domains: Domains = toml::from_str(raw)?;

        for (i, domain) in domains.domains.iter().enumerate() {
            if domains.domains[..i].iter().any(|d| d.name == domain.name) {
                return Err(DomainsError::Invalid(anyhow!(
                    "Domain {:?} is listed more than once",
                    domain.name
                )));
            }
        }

        if domains.get(&domains.default).is_none() {
            return Err(DomainsError::Invalid(anyhow!(
                "Default domain {:?} is not listed",
                domains.default
            )));
        }

        if let Some(order) = &domains.flash_order {
            for name in order {
                if domains.get(name).is_none() {
                    return Err(DomainsError::Invalid(anyhow!(
                        "Flash order names unknown domain {:?}",
                        name
                    )));
                }
            }
        }

        Ok(domains)
    }

    pub fn get(&self, name: &str) -> Option<&Domain> {
        self.domains.iter().find(|d| d.name == name)
    }

    /// Domains in the order their processes are issued. Follows the explicit
    /// flash order when the build system provides one.
    pub fn in_flash_order(&self) -> Vec<&Domain> {
        match &self.flash_order {
            // Names were validated at parse time
            Some(order) => order.iter().filter_map(|name| self.get(name)).collect(),
            None => self.domains.iter().collect(),
        }
    }

    pub fn default_domain(&self) -> &Domain {
        // Presence was validated at parse time
        self.get(&self.default).expect("default domain is listed")
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }
}
