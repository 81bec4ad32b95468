use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::anyhow;

use super::{FixtureError, FixtureResult};
use crate::cloud::Project;

const CA_SUBJECT: &str = "/C=US/CN=Root CA";
const CA_VALIDITY_DAYS: u32 = 14;
const DEVICE_CERT_VALIDITY_DAYS: u32 = 500;

/// Filesystem layout of one generated credential set.
pub struct DeviceCreds {
    pub dir: PathBuf,
    pub ca_cert: PathBuf,
    pub device_cert_der: PathBuf,
    pub device_key_der: PathBuf,
}

/// Generates a CA key/cert plus a device key, CSR and certificate under
/// `dir`, converting the device key and certificate to DER for the firmware.
pub fn generate_credentials(
    dir: &Path,
    device_name: &str,
    project_id: &str,
) -> FixtureResult<DeviceCreds> {
    std::fs::create_dir_all(dir)?;

    log::info!("CA private key and cert");
    openssl(dir, &["ecparam", "-name", "prime256v1", "-genkey", "-noout", "-out", "ca.key.pem"])?;
    openssl(
        dir,
        &[
            "req",
            "-x509",
            "-new",
            "-nodes",
            "-key",
            "ca.key.pem",
            "-sha256",
            "-subj",
            CA_SUBJECT,
            "-days",
            &CA_VALIDITY_DAYS.to_string(),
            "-out",
            "ca.crt.pem",
        ],
    )?;

    log::info!("Edge node private key, csr and cert");
    let key = format!("{device_name}.key.pem");
    let csr = format!("{device_name}.csr.pem");
    let crt = format!("{device_name}.crt.pem");
    let subject = format!("/C=US/O={project_id}/CN={device_name}");

    openssl(dir, &["ecparam", "-name", "prime256v1", "-genkey", "-noout", "-out", &key])?;
    openssl(dir, &["req", "-new", "-key", &key, "-subj", &subject, "-out", &csr])?;
    openssl(
        dir,
        &[
            "x509",
            "-req",
            "-in",
            &csr,
            "-CA",
            "ca.crt.pem",
            "-CAkey",
            "ca.key.pem",
            "-CAcreateserial",
            "-out",
            &crt,
            "-days",
            &DEVICE_CERT_VALIDITY_DAYS.to_string(),
            "-sha256",
        ],
    )?;

    log::info!("Convert key and cert to DER format");
    openssl(dir, &["x509", "-in", &crt, "-outform", "DER", "-out", "crt.der"])?;
    openssl(dir, &["ec", "-in", &key, "-outform", "DER", "-out", "key.der"])?;

    Ok(DeviceCreds {
        dir: dir.to_path_buf(),
        ca_cert: dir.join("ca.crt.pem"),
        device_cert_der: dir.join("crt.der"),
        device_key_der: dir.join("key.der"),
    })
}

/// Uploads the root CA certificate to the project, returning its id for
/// [`delete_root_certificate`] on teardown.
pub async fn upload_root_certificate(
    project: &dyn Project,
    creds: &DeviceCreds,
) -> FixtureResult<String> {
    log::info!("Upload root public key to server");
    let cert_pem = std::fs::read(&creds.ca_cert)?;
    Ok(project.add_certificate(&cert_pem, "root").await?)
}

/// Removes the uploaded root certificate again after a test session.
pub async fn delete_root_certificate(project: &dyn Project, cert_id: &str) -> FixtureResult<()> {
    log::info!("Delete root certificate {cert_id}");
    project.delete_certificate(cert_id).await?;
    Ok(())
}

fn openssl(cwd: &Path, args: &[&str]) -> FixtureResult<()> {
    let status = Command::new("openssl").args(args).current_dir(cwd).status()?;
    if !status.success() {
        return Err(FixtureError::Tool(anyhow!("openssl {} exited with {status}", args[0])));
    }
    Ok(())
}
