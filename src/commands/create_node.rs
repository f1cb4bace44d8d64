//! Node creation command handler

use crate::config::Settings;
use crate::node::{LighthouseEndpoint, NodeDescriptor, Role};
use crate::prompt::Prompter;
use crate::provisioner::{NodeReport, Provisioner};
use anyhow::{Context, Result};
use clap::Args;
use std::io::{BufRead, Write};

/// Values for a new node; anything left out is asked for interactively
#[derive(Args, Debug, Default, Clone)]
pub struct CreateNodeArgs {
    /// Node name, also used as its directory name
    #[arg(long)]
    pub name: Option<String>,
    /// Overlay address to sign into the certificate (e.g. 10.0.0.2/24)
    #[arg(long)]
    pub ip: Option<String>,
    /// Create a lighthouse instead of a regular node
    #[arg(long, conflicts_with_all = ["lighthouse_ip", "lighthouse_public_ip"])]
    pub lighthouse: bool,
    /// Overlay address of the lighthouse this node should use
    #[arg(long)]
    pub lighthouse_ip: Option<String>,
    /// Public address the lighthouse is reachable at
    #[arg(long)]
    pub lighthouse_public_ip: Option<String>,
}

impl CreateNodeArgs {
    fn role_is_known(&self) -> bool {
        self.lighthouse || self.lighthouse_ip.is_some() || self.lighthouse_public_ip.is_some()
    }
}

/// Collect the node description from args and prompts
pub fn resolve_node<R: BufRead, W: Write>(
    args: CreateNodeArgs,
    prompter: &mut Prompter<R, W>,
) -> Result<NodeDescriptor> {
    let name = match args.name {
        Some(ref name) => name.clone(),
        None => prompter.ask_required("Enter node name")?,
    };
    let ip = match args.ip {
        Some(ref ip) => ip.clone(),
        None => prompter.ask_required("Enter node IP address")?,
    };

    let is_lighthouse = if args.role_is_known() {
        args.lighthouse
    } else {
        prompter.confirm("Is this a lighthouse node?")?
    };

    let role = if is_lighthouse {
        Role::Lighthouse
    } else {
        let overlay_ip = match args.lighthouse_ip {
            Some(ip) => ip,
            None => prompter.ask_required("Enter the lighthouse IP address")?,
        };
        let public_ip = match args.lighthouse_public_ip {
            Some(ip) => ip,
            None => prompter.ask_required("Enter the lighthouse public IP address")?,
        };
        Role::Node(LighthouseEndpoint::new(overlay_ip, public_ip)?)
    };

    Ok(NodeDescriptor::new(name, ip, role)?)
}

/// Handle node creation
pub fn handle_create_node<R: BufRead, W: Write>(
    settings: Settings,
    args: CreateNodeArgs,
    prompter: &mut Prompter<R, W>,
) -> Result<NodeReport> {
    let node = resolve_node(args, prompter)?;

    let provisioner = Provisioner::new(settings)?;
    let report = provisioner
        .create_node(&node)
        .with_context(|| format!("Failed to create node '{}'", node.name))?;
    Ok(report)
}
