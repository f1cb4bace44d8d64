//! Launcher scripts shipped inside each node directory
//!
//! Both scripts must run on the target machine without this tool installed,
//! so they are plain text generated here and decide the platform themselves.

use crate::error::{ProvisionError, Result};
use crate::exec::local;
use crate::platform::Platform;
use crate::staging::EXECUTABLE_MODE;
use std::fs;
use std::path::Path;

pub const POSIX_LAUNCHER: &str = "start.sh";
pub const WINDOWS_LAUNCHER: &str = "start.bat";
pub const TAP_INSTALLER: &str = r"C:\Program Files\TAP-Windows\bin\tapinstall.exe";

const NODE_CONFIG: &str = "config.yml";

/// `uname -s` pattern for a platform and the command its arm runs
fn uname_arm(platform: Platform) -> (&'static str, String) {
    let run = format!("./{} -config {}", platform.staged_name(), NODE_CONFIG);
    match platform {
        // tun devices need root
        Platform::Linux => ("Linux*", format!("exec sudo {}", run)),
        Platform::Darwin => ("Darwin*", format!("exec sudo {}", run)),
        Platform::Windows => ("CYGWIN*|MINGW32*|MSYS*|MINGW*", format!("exec {}", run)),
    }
}

/// `start.sh` for `node_name`, with one `case` arm per platform
pub fn posix_script(node_name: &str, platforms: &[Platform]) -> String {
    let mut script = String::new();
    script.push_str("#!/bin/sh\n");
    script.push_str(&format!("# Nebula launcher for {}\n", node_name));
    script.push_str("cd \"$(dirname \"$0\")\" || exit 1\n");
    script.push_str("case \"$(uname -s)\" in\n");
    for &platform in platforms {
        let (pattern, command) = uname_arm(platform);
        script.push_str(&format!("  {}) {} ;;\n", pattern, command));
    }
    script.push_str("  *) echo \"Unknown OS: $(uname -s)\" >&2; exit 1 ;;\n");
    script.push_str("esac\n");
    script
}

/// `start.bat` for `node_name`; refuses to start without the TAP driver
pub fn windows_script(node_name: &str) -> String {
    let lines = [
        "@echo off".to_string(),
        format!("rem Nebula launcher for {}", node_name),
        "cd /d \"%~dp0\"".to_string(),
        format!("if not exist \"{}\" (", TAP_INSTALLER),
        "    echo TAP-Windows driver is not installed. Install the TAP-Windows driver first."
            .to_string(),
        "    exit /b 1".to_string(),
        ")".to_string(),
        format!("{} -config {}", Platform::Windows.staged_name(), NODE_CONFIG),
    ];
    let mut script = lines.join("\r\n");
    script.push_str("\r\n");
    script
}

/// Write both launchers into `node_dir`; `start.sh` is made executable
pub fn write_launchers(node_dir: &Path, node_name: &str, platforms: &[Platform]) -> Result<()> {
    let sh = node_dir.join(POSIX_LAUNCHER);
    fs::write(&sh, posix_script(node_name, platforms))
        .map_err(|e| ProvisionError::fs("write", &sh, e))?;
    local::set_mode(&sh, EXECUTABLE_MODE).map_err(|e| ProvisionError::fs("chmod", &sh, e))?;

    let bat = node_dir.join(WINDOWS_LAUNCHER);
    fs::write(&bat, windows_script(node_name)).map_err(|e| ProvisionError::fs("write", &bat, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posix_script_dispatches_on_uname_at_launch() {
        let script = posix_script("alice", &Platform::ALL);
        assert!(script.starts_with("#!/bin/sh\n"));
        assert!(script.contains("# Nebula launcher for alice\n"));
        assert!(script.contains("case \"$(uname -s)\" in\n"));
        assert!(script.contains("  Linux*) exec sudo ./nebula-linux -config config.yml ;;\n"));
        assert!(script.contains("  Darwin*) exec sudo ./nebula-darwin -config config.yml ;;\n"));
        assert!(script.contains(
            "  CYGWIN*|MINGW32*|MSYS*|MINGW*) exec ./nebula-windows.exe -config config.yml ;;\n"
        ));
        assert!(script.ends_with("  *) echo \"Unknown OS: $(uname -s)\" >&2; exit 1 ;;\nesac\n"));
    }

    #[test]
    fn posix_script_only_lists_given_platforms() {
        let script = posix_script("bob", &[Platform::Linux]);
        assert!(script.contains("Linux*)"));
        assert!(!script.contains("Darwin*)"));
        assert!(!script.contains("nebula-windows.exe"));
        assert!(script.contains("Unknown OS"));
    }

    #[test]
    fn windows_script_checks_tap_driver_first() {
        let script = windows_script("alice");
        let lines: Vec<&str> = script.split("\r\n").collect();
        assert_eq!(lines[0], "@echo off");
        assert_eq!(
            lines[3],
            r#"if not exist "C:\Program Files\TAP-Windows\bin\tapinstall.exe" ("#
        );
        assert_eq!(lines[5], "    exit /b 1");
        assert_eq!(lines[7], "nebula-windows.exe -config config.yml");
        assert!(script.ends_with("\r\n"));
    }

    #[cfg(unix)]
    #[test]
    fn start_sh_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        write_launchers(dir.path(), "alice", &Platform::ALL).unwrap();

        let mode = fs::metadata(dir.path().join(POSIX_LAUNCHER))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
        assert!(dir.path().join(WINDOWS_LAUNCHER).is_file());
    }
}
