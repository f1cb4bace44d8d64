use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE_NAME: &str = "provision.toml";
pub const DEFAULT_TEMPLATE: &str = "config.yml";
pub const DEFAULT_NODES_DIR: &str = "nodes";
pub const DEFAULT_LEDGER: &str = "node_info.txt";
pub const DEFAULT_LIGHTHOUSE_PORT: u16 = 4242;
pub const DEFAULT_LIGHTHOUSE_INTERVAL: u32 = 60;

pub const ENV_CERT_TOOL: &str = "NEBULA_PROVISION_CERT_TOOL";
pub const ENV_TEMPLATE: &str = "NEBULA_PROVISION_TEMPLATE";

/// Optional `provision.toml` in the working directory
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
    pub cert_tool: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub nodes_dir: Option<PathBuf>,
    pub ledger: Option<PathBuf>,
    pub lighthouse_port: Option<u16>,
    pub lighthouse_interval: Option<u32>,
}

/// Values given on the command line; they win over everything else
#[derive(Debug, Default, Clone)]
pub struct SettingsOverrides {
    pub cert_tool: Option<PathBuf>,
    pub template: Option<PathBuf>,
}

/// Resolved paths and knobs the provisioner runs with.
///
/// All relative paths are resolved against `work_dir`, which is also where
/// the signing tool runs and where the authority files live.
#[derive(Debug, Clone)]
pub struct Settings {
    pub work_dir: PathBuf,
    /// Explicit signing tool; `None` means locate one at run time
    pub cert_tool: Option<PathBuf>,
    pub template: PathBuf,
    pub nodes_dir: PathBuf,
    pub ledger: PathBuf,
    pub lighthouse_port: u16,
    pub lighthouse_interval: u32,
}

impl Settings {
    /// Built-in defaults rooted at `work_dir`
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        let work_dir = work_dir.into();
        Self {
            template: work_dir.join(DEFAULT_TEMPLATE),
            nodes_dir: work_dir.join(DEFAULT_NODES_DIR),
            ledger: work_dir.join(DEFAULT_LEDGER),
            cert_tool: None,
            lighthouse_port: DEFAULT_LIGHTHOUSE_PORT,
            lighthouse_interval: DEFAULT_LIGHTHOUSE_INTERVAL,
            work_dir,
        }
    }

    /// Layer defaults, the settings file, the environment and CLI overrides.
    ///
    /// `settings_file` defaults to `<work_dir>/provision.toml`; a missing
    /// default file is fine, a missing explicit one is not.
    pub fn load(
        work_dir: &Path,
        settings_file: Option<&Path>,
        overrides: &SettingsOverrides,
    ) -> Result<Self> {
        let mut settings = Self::new(work_dir);

        let file = match settings_file {
            Some(path) => Some(load_settings_file(&settings.resolve(path))?),
            None => {
                let default_path = work_dir.join(SETTINGS_FILE_NAME);
                if default_path.exists() {
                    Some(load_settings_file(&default_path)?)
                } else {
                    None
                }
            }
        };
        if let Some(file) = file {
            settings.apply_file(file);
        }

        settings.apply_env(|key| std::env::var(key).ok());
        settings.apply_overrides(overrides);
        Ok(settings)
    }

    pub fn apply_file(&mut self, file: SettingsFile) {
        if let Some(path) = file.cert_tool {
            self.cert_tool = Some(self.resolve(&path));
        }
        if let Some(path) = file.template {
            self.template = self.resolve(&path);
        }
        if let Some(path) = file.nodes_dir {
            self.nodes_dir = self.resolve(&path);
        }
        if let Some(path) = file.ledger {
            self.ledger = self.resolve(&path);
        }
        if let Some(port) = file.lighthouse_port {
            self.lighthouse_port = port;
        }
        if let Some(interval) = file.lighthouse_interval {
            self.lighthouse_interval = interval;
        }
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(ENV_CERT_TOOL).filter(|v| !v.trim().is_empty()) {
            self.cert_tool = Some(self.resolve(Path::new(value.trim())));
        }
        if let Some(value) = lookup(ENV_TEMPLATE).filter(|v| !v.trim().is_empty()) {
            self.template = self.resolve(Path::new(value.trim()));
        }
    }

    pub fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        if let Some(ref path) = overrides.cert_tool {
            self.cert_tool = Some(self.resolve(path));
        }
        if let Some(ref path) = overrides.template {
            self.template = self.resolve(path);
        }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        }
    }

    /// `nodes/<name>`
    pub fn node_dir(&self, name: &str) -> PathBuf {
        self.nodes_dir.join(name)
    }
}

fn load_settings_file(path: &Path) -> Result<SettingsFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse settings file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_live_under_the_work_dir() {
        let settings = Settings::new("/srv/mesh");
        assert_eq!(settings.template, Path::new("/srv/mesh/config.yml"));
        assert_eq!(settings.ledger, Path::new("/srv/mesh/node_info.txt"));
        assert_eq!(settings.node_dir("alice"), Path::new("/srv/mesh/nodes/alice"));
        assert_eq!(settings.lighthouse_port, 4242);
        assert_eq!(settings.lighthouse_interval, 60);
        assert!(settings.cert_tool.is_none());
    }

    #[test]
    fn file_then_env_then_flags() {
        let mut settings = Settings::new("/srv/mesh");

        let file: SettingsFile = toml::from_str(
            r#"
cert_tool = "bin/nebula-cert"
template = "templates/base.yml"
lighthouse_port = 4243
"#,
        )
        .unwrap();
        settings.apply_file(file);
        assert_eq!(
            settings.cert_tool.as_deref(),
            Some(Path::new("/srv/mesh/bin/nebula-cert"))
        );
        assert_eq!(settings.template, Path::new("/srv/mesh/templates/base.yml"));
        assert_eq!(settings.lighthouse_port, 4243);

        let env: HashMap<&str, &str> = [(ENV_TEMPLATE, "/etc/nebula/template.yml")].into();
        settings.apply_env(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(settings.template, Path::new("/etc/nebula/template.yml"));

        settings.apply_overrides(&SettingsOverrides {
            cert_tool: Some(PathBuf::from("/usr/local/bin/nebula-cert")),
            template: None,
        });
        assert_eq!(
            settings.cert_tool.as_deref(),
            Some(Path::new("/usr/local/bin/nebula-cert"))
        );
        assert_eq!(settings.template, Path::new("/etc/nebula/template.yml"));
    }

    #[test]
    fn unknown_settings_keys_are_rejected() {
        assert!(toml::from_str::<SettingsFile>("templte = \"x.yml\"").is_err());
    }

    #[test]
    fn missing_explicit_settings_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Settings::load(
            dir.path(),
            Some(Path::new("absent.toml")),
            &SettingsOverrides::default(),
        );
        assert!(result.is_err());
    }
}
