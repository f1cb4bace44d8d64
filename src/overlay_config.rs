//! Derive a node's Nebula `config.yml` from the shared template

use crate::error::{ProvisionError, Result};
use crate::node::{LighthouseEndpoint, Role};
use std::fs;
use std::path::Path;
use yaml_rust::{Yaml, YamlEmitter, YamlLoader, yaml::Hash};

pub const PKI_CA: &str = "ca.crt";
pub const PKI_CERT: &str = "host.crt";
pub const PKI_KEY: &str = "host.key";

/// How regular nodes reach and poll their lighthouse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LighthousePolicy {
    /// UDP port the lighthouse listens on at its public address
    pub port: u16,
    /// Seconds between lighthouse queries
    pub interval: u32,
}

impl Default for LighthousePolicy {
    fn default() -> Self {
        Self {
            port: crate::config::DEFAULT_LIGHTHOUSE_PORT,
            interval: crate::config::DEFAULT_LIGHTHOUSE_INTERVAL,
        }
    }
}

fn key(s: &str) -> Yaml {
    Yaml::String(s.to_string())
}

// Overwrite in place so existing keys keep their position in the output
fn set(hash: &mut Hash, name: &str, value: Yaml) {
    let name = key(name);
    match hash.get_mut(&name) {
        Some(slot) => *slot = value,
        None => {
            hash.insert(name, value);
        }
    }
}

/// Parse a template and check it has the sections we rewrite
pub fn parse_template(source: &str, path: &Path) -> Result<Yaml> {
    let docs = YamlLoader::load_from_str(source)
        .map_err(|e| ProvisionError::template(path, format!("invalid YAML: {}", e)))?;

    let doc = docs
        .into_iter()
        .next()
        .ok_or_else(|| ProvisionError::template(path, "template is empty"))?;

    let root = doc
        .as_hash()
        .ok_or_else(|| ProvisionError::template(path, "top level is not a mapping"))?;
    match root.get(&key("pki")) {
        Some(Yaml::Hash(_)) => {}
        Some(_) => return Err(ProvisionError::template(path, "`pki` is not a mapping")),
        None => return Err(ProvisionError::template(path, "missing `pki` section")),
    }
    Ok(doc)
}

/// Point PKI at the node-relative files and set the lighthouse sections for `role`
pub fn apply_role(doc: &mut Yaml, role: &Role, policy: LighthousePolicy) {
    let Yaml::Hash(root) = doc else {
        return;
    };

    if let Some(Yaml::Hash(pki)) = root.get_mut(&key("pki")) {
        set(pki, "ca", key(PKI_CA));
        set(pki, "cert", key(PKI_CERT));
        set(pki, "key", key(PKI_KEY));
    }

    let (static_host_map, lighthouse) = match role {
        Role::Lighthouse => {
            let mut lighthouse = Hash::new();
            lighthouse.insert(key("am_lighthouse"), Yaml::Boolean(true));
            (Hash::new(), lighthouse)
        }
        Role::Node(endpoint) => client_sections(endpoint, policy),
    };

    set(root, "static_host_map", Yaml::Hash(static_host_map));
    set(root, "lighthouse", Yaml::Hash(lighthouse));
}

fn client_sections(endpoint: &LighthouseEndpoint, policy: LighthousePolicy) -> (Hash, Hash) {
    let mut static_host_map = Hash::new();
    static_host_map.insert(
        key(&endpoint.overlay_ip),
        Yaml::Array(vec![Yaml::String(format!(
            "{}:{}",
            endpoint.public_ip, policy.port
        ))]),
    );

    let mut lighthouse = Hash::new();
    lighthouse.insert(key("am_lighthouse"), Yaml::Boolean(false));
    lighthouse.insert(key("interval"), Yaml::Integer(i64::from(policy.interval)));
    lighthouse.insert(key("hosts"), Yaml::Array(vec![key(&endpoint.overlay_ip)]));

    (static_host_map, lighthouse)
}

pub fn emit(doc: &Yaml, template_path: &Path) -> Result<String> {
    let mut out = String::new();
    YamlEmitter::new(&mut out)
        .dump(doc)
        .map_err(|e| ProvisionError::template(template_path, format!("cannot serialize: {:?}", e)))?;
    out.push('\n');
    Ok(out)
}

/// Template source in, node `config.yml` text out
pub fn render(
    source: &str,
    template_path: &Path,
    role: &Role,
    policy: LighthousePolicy,
) -> Result<String> {
    let mut doc = parse_template(source, template_path)?;
    apply_role(&mut doc, role, policy);
    emit(&doc, template_path)
}

/// Read the template from disk and write the rendered config to `dest`.
/// The template itself is never modified.
pub fn write_node_config(
    template_path: &Path,
    dest: &Path,
    role: &Role,
    policy: LighthousePolicy,
) -> Result<()> {
    let source = fs::read_to_string(template_path)
        .map_err(|e| ProvisionError::template(template_path, format!("cannot read: {}", e)))?;
    let rendered = render(&source, template_path, role, policy)?;
    fs::write(dest, rendered).map_err(|e| ProvisionError::fs("write", dest, e))
}
