//! Authority initialization and node bundle creation

use crate::cert_tool::{AuthorityFiles, CA_CERT, CertTool};
use crate::config::Settings;
use crate::error::{ProvisionError, Result};
use crate::launcher;
use crate::ledger::Ledger;
use crate::node::{NodeDescriptor, Role};
use crate::overlay_config::{self, LighthousePolicy, PKI_CA, PKI_CERT, PKI_KEY};
use crate::platform::Platform;
use crate::staging::{self, CopyResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_CA_NAME: &str = "MyNebulaCA";
pub const NODE_CONFIG: &str = "config.yml";
pub const NODE_SUMMARY: &str = "node_info.txt";

const STEPS: usize = 10;

/// What a successful `create_node` left behind
#[derive(Debug)]
pub struct NodeReport {
    pub node: NodeDescriptor,
    pub dir: PathBuf,
    /// One entry per known platform; never contains `Failed`
    pub binaries: Vec<CopyResult>,
}

impl NodeReport {
    pub fn staged_platforms(&self) -> Vec<Platform> {
        self.binaries
            .iter()
            .filter(|r| r.is_copied())
            .map(CopyResult::platform)
            .collect()
    }
}

/// Drives `nebula-cert` and lays out node directories under one working directory.
///
/// Operations are not transactional: a failure part way through leaves
/// whatever was written so far, and re-running for the same node overwrites it.
pub struct Provisioner {
    settings: Settings,
    cert_tool: CertTool,
    ledger: Ledger,
    make_executable: bool,
}

impl Provisioner {
    /// Prepare the nodes directory and ledger, locating the signing tool
    pub fn new(settings: Settings) -> Result<Self> {
        let cert_tool = CertTool::locate(&settings);
        Self::with_cert_tool(settings, cert_tool)
    }

    pub fn with_cert_tool(settings: Settings, cert_tool: CertTool) -> Result<Self> {
        fs::create_dir_all(&settings.nodes_dir)
            .map_err(|e| ProvisionError::fs("create", &settings.nodes_dir, e))?;
        let ledger = Ledger::open(&settings.ledger)?;
        debug!(
            work_dir = %settings.work_dir.display(),
            cert_tool = %cert_tool.program().display(),
            "provisioner ready"
        );

        Ok(Self {
            settings,
            cert_tool,
            ledger,
            make_executable: !cfg!(windows),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn cert_tool(&self) -> &CertTool {
        &self.cert_tool
    }

    fn policy(&self) -> LighthousePolicy {
        LighthousePolicy {
            port: self.settings.lighthouse_port,
            interval: self.settings.lighthouse_interval,
        }
    }

    /// Create the certificate authority. A blank name means `MyNebulaCA`.
    pub fn initialize_authority(&self, name: &str) -> Result<AuthorityFiles> {
        let name = match name.trim() {
            "" => DEFAULT_CA_NAME,
            name => name,
        };

        println!("Creating certificate authority '{}'...", name);
        let files = self.cert_tool.create_authority(name)?;
        info!(ca = name, crt = %files.crt.display(), "certificate authority initialized");
        println!("✓ Certificate authority '{}' initialized", name);
        Ok(files)
    }

    /// Sign a certificate for `node` and assemble its directory
    pub fn create_node(&self, node: &NodeDescriptor) -> Result<NodeReport> {
        let dir = self.settings.node_dir(&node.name);
        println!("Creating node {}...", node);
        println!();

        step(1, "Creating node directory");
        fs::create_dir_all(&dir).map_err(|e| ProvisionError::fs("create", &dir, e))?;

        step(2, "Signing host certificate");
        let signed = self.cert_tool.sign(&node.name, &node.ip)?;

        step(3, "Moving host certificate and key");
        move_file(&signed.crt, &dir.join(PKI_CERT))?;
        move_file(&signed.key, &dir.join(PKI_KEY))?;

        step(4, "Copying CA certificate");
        let ca_crt = self.settings.work_dir.join(CA_CERT);
        if !ca_crt.is_file() {
            return Err(ProvisionError::MissingArtifact { path: ca_crt });
        }
        let ca_dest = dir.join(PKI_CA);
        fs::copy(&ca_crt, &ca_dest).map_err(|e| ProvisionError::fs("copy", &ca_dest, e))?;

        step(5, "Staging nebula binaries");
        let mut binaries = Vec::with_capacity(Platform::ALL.len());
        for result in staging::stage_binaries(
            &self.settings.work_dir,
            &dir,
            &Platform::ALL,
            self.make_executable,
        ) {
            match result {
                CopyResult::Failed { error, .. } => return Err(error),
                CopyResult::Copied { platform, .. } => println!("  ✓ {}", platform),
                CopyResult::SkippedMissing { platform, .. } => {
                    println!("  - {} (not found, skipped)", platform)
                }
            }
            binaries.push(result);
        }

        step(6, "Writing config.yml");
        overlay_config::write_node_config(
            &self.settings.template,
            &dir.join(NODE_CONFIG),
            &node.role,
            self.policy(),
        )?;

        step(7, "Recording node in ledger");
        self.ledger.append(node)?;

        step(8, "Writing node summary");
        let summary_path = dir.join(NODE_SUMMARY);
        fs::write(&summary_path, node_summary(node, self.policy()))
            .map_err(|e| ProvisionError::fs("write", &summary_path, e))?;

        step(9, "Writing start.sh");
        step(10, "Writing start.bat");
        launcher::write_launchers(&dir, &node.name, &Platform::ALL)?;

        info!(node = %node.name, dir = %dir.display(), "node created");
        println!();
        println!("✓ Node {} created in {}", node.name, dir.display());

        Ok(NodeReport {
            node: node.clone(),
            dir,
            binaries,
        })
    }
}

fn step(n: usize, message: &str) {
    println!("[{}/{}] {}...", n, STEPS, message);
}

// Rename first; fall back to copy + delete when crossing filesystems.
// The source must not survive either way.
fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to).map_err(|e| ProvisionError::fs("move", from, e))?;
    fs::remove_file(from).map_err(|e| ProvisionError::fs("remove", from, e))
}

/// Human-readable `node_info.txt` kept inside the node directory
pub fn node_summary(node: &NodeDescriptor, policy: LighthousePolicy) -> String {
    let mut summary = format!(
        "Name: {}\nIP: {}\nRole: {}\n",
        node.name,
        node.ip,
        node.role.label()
    );
    if let Role::Node(ref endpoint) = node.role {
        summary.push_str(&format!(
            "Lighthouse: {} ({}:{})\n",
            endpoint.overlay_ip, endpoint.public_ip, policy.port
        ));
    }
    summary.push_str(&format!("Created: {}\n", chrono::Utc::now().to_rfc3339()));
    summary
}
