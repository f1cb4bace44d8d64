//! Shared fixtures: a temporary working directory with a fake nebula-cert

#![allow(dead_code)]

use nebula_provision::Settings;
use nebula_provision::platform::Platform;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const TEMPLATE: &str = r#"pki:
  ca: /etc/nebula/ca.crt
  cert: /etc/nebula/host.crt
  key: /etc/nebula/host.key
static_host_map:
  "192.168.100.1": ["100.64.22.11:4242"]
lighthouse:
  am_lighthouse: false
  interval: 60
  hosts:
    - "192.168.100.1"
listen:
  host: 0.0.0.0
  port: 4242
tun:
  dev: nebula1
"#;

/// Behaves like nebula-cert for the two calls we make: writes ca.crt/ca.key
/// or <name>.crt/<name>.key into the current directory.
const FAKE_CERT_TOOL: &str = r#"#!/bin/sh
case "$1" in
  ca)
    echo "$3" > ca.crt
    echo "ca key" > ca.key
    ;;
  sign)
    echo "cert $3 $5" > "$3.crt"
    echo "key $3" > "$3.key"
    ;;
  *)
    echo "unknown command $1" >&2
    exit 2
    ;;
esac
"#;

const FAILING_CERT_TOOL: &str = r#"#!/bin/sh
echo "error while signing: ca.key not found" >&2
exit 1
"#;

pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    /// Work dir with a template and a working fake signer under bin/
    pub fn new() -> Self {
        let ws = Self::empty();
        fs::write(ws.path().join("config.yml"), TEMPLATE).unwrap();
        ws.install_tool(FAKE_CERT_TOOL);
        ws
    }

    /// Same as `new`, but the signer always exits 1
    pub fn with_failing_tool() -> Self {
        let ws = Self::empty();
        fs::write(ws.path().join("config.yml"), TEMPLATE).unwrap();
        ws.install_tool(FAILING_CERT_TOOL);
        ws
    }

    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn tool_path(&self) -> PathBuf {
        self.path().join("bin").join("nebula-cert")
    }

    fn install_tool(&self, script: &str) {
        let tool = self.tool_path();
        fs::create_dir_all(tool.parent().unwrap()).unwrap();
        fs::write(&tool, script).unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// Unpack fake nebula releases for `platforms`, mode 644
    pub fn with_releases(self, platforms: &[Platform]) -> Self {
        for platform in platforms {
            let path = self.path().join(platform.daemon_path());
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, format!("nebula {}", platform)).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        }
        self
    }

    pub fn settings(&self) -> Settings {
        let mut settings = Settings::new(self.path());
        settings.cert_tool = Some(self.tool_path());
        settings
    }

    pub fn node_dir(&self, name: &str) -> PathBuf {
        self.path().join("nodes").join(name)
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path().join(relative)).unwrap()
    }
}

pub fn mode(path: &Path) -> u32 {
    fs::metadata(path).unwrap().permissions().mode() & 0o777
}

pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
