//! Known Nebula distribution platforms and where their binaries live

use std::fmt;
use std::path::{Path, PathBuf};

/// A platform Nebula ships a release archive for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Darwin,
    Linux,
    Windows,
}

impl Platform {
    /// Every platform, in the order binaries are staged and launcher arms emitted
    pub const ALL: [Platform; 3] = [Platform::Darwin, Platform::Linux, Platform::Windows];

    /// Platform of the machine running this tool, if it is one Nebula ships for
    pub fn host() -> Option<Self> {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Option<Self> {
        match os {
            "macos" | "darwin" => Some(Platform::Darwin),
            "linux" => Some(Platform::Linux),
            "windows" => Some(Platform::Windows),
            _ => None,
        }
    }

    /// Release identifier, also the suffix of the extracted archive directory
    pub fn id(self) -> &'static str {
        match self {
            Platform::Darwin => "darwin",
            Platform::Linux => "linux-amd64",
            Platform::Windows => "windows-amd64",
        }
    }

    fn dist_dir(self) -> String {
        format!("nebula-{}", self.id())
    }

    fn exe(self, stem: &str) -> String {
        match self {
            Platform::Windows => format!("{}.exe", stem),
            _ => stem.to_string(),
        }
    }

    /// Relative path of the `nebula` data-plane binary in an extracted release
    pub fn daemon_path(self) -> PathBuf {
        Path::new(&self.dist_dir()).join(self.exe("nebula"))
    }

    /// Relative path of the `nebula-cert` binary in an extracted release
    pub fn cert_tool_path(self) -> PathBuf {
        Path::new(&self.dist_dir()).join(self.exe("nebula-cert"))
    }

    /// File name the daemon gets inside a node directory
    pub fn staged_name(self) -> &'static str {
        match self {
            Platform::Darwin => "nebula-darwin",
            Platform::Linux => "nebula-linux",
            Platform::Windows => "nebula-windows.exe",
        }
    }

    pub fn is_windows(self) -> bool {
        matches!(self, Platform::Windows)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
