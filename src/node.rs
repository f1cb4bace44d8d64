use crate::error::{ProvisionError, Result};
use std::fmt;

/// Role a node plays in the overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Lighthouse,
    /// Regular member; learns the mesh from one static lighthouse
    Node(LighthouseEndpoint),
}

impl Role {
    /// Label written to the ledger and the per-node summary
    pub fn label(&self) -> &'static str {
        match self {
            Role::Lighthouse => "lighthouse",
            Role::Node(_) => "node",
        }
    }

    pub fn is_lighthouse(&self) -> bool {
        matches!(self, Role::Lighthouse)
    }
}

/// Where a regular node finds its lighthouse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LighthouseEndpoint {
    /// Overlay address of the lighthouse
    pub overlay_ip: String,
    /// Externally reachable address, without port
    pub public_ip: String,
}

impl LighthouseEndpoint {
    pub fn new(overlay_ip: impl Into<String>, public_ip: impl Into<String>) -> Result<Self> {
        let overlay_ip = non_empty("lighthouse ip", overlay_ip.into())?;
        let public_ip = non_empty("lighthouse public ip", public_ip.into())?;
        Ok(Self {
            overlay_ip,
            public_ip,
        })
    }
}

/// Identity of one overlay participant. `name` doubles as its directory name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    pub name: String,
    pub ip: String,
    pub role: Role,
}

impl NodeDescriptor {
    pub fn new(name: impl Into<String>, ip: impl Into<String>, role: Role) -> Result<Self> {
        let name = validate_name(name.into())?;
        let ip = non_empty("ip", ip.into())?;
        Ok(Self { name, ip, role })
    }

    /// `<name> <ip> <lighthouse|node>`
    pub fn ledger_line(&self) -> String {
        format!("{} {} {}", self.name, self.ip, self.role.label())
    }
}

impl fmt::Display for NodeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.ip, self.role.label())
    }
}

fn non_empty(field: &'static str, value: String) -> Result<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(ProvisionError::InvalidInput {
            field,
            message: "must not be empty".to_string(),
        });
    }
    if value.contains(char::is_whitespace) {
        return Err(ProvisionError::InvalidInput {
            field,
            message: format!("'{}' contains whitespace", value),
        });
    }
    Ok(value)
}

// The name becomes nodes/<name> and <name>.crt in the working directory.
fn validate_name(name: String) -> Result<String> {
    let name = non_empty("node name", name)?;
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(ProvisionError::InvalidInput {
            field: "node name",
            message: format!("'{}' is not a plain directory name", name),
        });
    }
    Ok(name)
}
