//! Thin adapter around the `nebula-cert` binary
//!
//! The binary is treated as an opaque collaborator: it runs in the working
//! directory and drops its output files there. This module turns that
//! implicit naming contract into typed results.

use crate::config::Settings;
use crate::error::{ProvisionError, Result};
use crate::exec::{self, local};
use crate::platform::Platform;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CA_CERT: &str = "ca.crt";
pub const CA_KEY: &str = "ca.key";

/// Authority files `nebula-cert ca` writes. Not checked for existence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityFiles {
    pub crt: PathBuf,
    pub key: PathBuf,
}

/// Host certificate and key `nebula-cert sign` produced, both verified to exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCertificate {
    pub crt: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone)]
pub struct CertTool {
    program: PathBuf,
    work_dir: PathBuf,
}

impl CertTool {
    pub fn new(program: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            work_dir: work_dir.into(),
        }
    }

    /// Pick the signing tool: configured path, then the release bundled for
    /// this host, then `nebula-cert` on PATH.
    pub fn locate(settings: &Settings) -> Self {
        if let Some(ref program) = settings.cert_tool {
            return Self::new(program, &settings.work_dir);
        }

        // Unknown hosts get the linux build, same as an unpacked linux release
        let host = Platform::host().unwrap_or(Platform::Linux);
        let bundled = settings.resolve(&host.cert_tool_path());
        if bundled.exists() {
            return Self::new(bundled, &settings.work_dir);
        }
        if let Some(found) = local::find_command("nebula-cert") {
            debug!(path = %found.display(), "using nebula-cert from PATH");
            return Self::new(found, &settings.work_dir);
        }
        Self::new(bundled, &settings.work_dir)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// `nebula-cert ca -name <name>`
    pub fn create_authority(&self, name: &str) -> Result<AuthorityFiles> {
        self.run("ca", &["ca", "-name", name])?;
        Ok(AuthorityFiles {
            crt: self.work_dir.join(CA_CERT),
            key: self.work_dir.join(CA_KEY),
        })
    }

    /// `nebula-cert sign -name <name> -ip <ip>`, then check `<name>.crt` and
    /// `<name>.key` landed in the working directory.
    pub fn sign(&self, name: &str, ip: &str) -> Result<SignedCertificate> {
        self.run("sign", &["sign", "-name", name, "-ip", ip])?;

        let signed = SignedCertificate {
            crt: self.work_dir.join(format!("{}.crt", name)),
            key: self.work_dir.join(format!("{}.key", name)),
        };
        for path in [&signed.crt, &signed.key] {
            if !path.is_file() {
                return Err(ProvisionError::MissingArtifact { path: path.clone() });
            }
        }
        Ok(signed)
    }

    fn run(&self, action: &str, args: &[&str]) -> Result<()> {
        debug!(program = %self.program.display(), ?args, "running signing tool");

        let output = local::execute_in(&self.work_dir, &self.program, args).map_err(|e| {
            ProvisionError::ExternalTool {
                tool: self.program.display().to_string(),
                action: action.to_string(),
                message: format!("could not start: {}", e),
            }
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!(output = %stdout.trim(), "signing tool output");
        }

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(ProvisionError::ExternalTool {
                tool: self.program.display().to_string(),
                action: action.to_string(),
                message: format!("exit status {}: {}", code, exec::failure_output(&output)),
            });
        }
        Ok(())
    }
}
