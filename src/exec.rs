use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Local command execution helpers
pub mod local {
    use super::*;

    /// Run `program` in `cwd`, capturing stdout and stderr
    pub fn execute_in(cwd: &Path, program: &Path, args: &[&str]) -> io::Result<Output> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd.current_dir(cwd);
        cmd.stdout(Stdio::piped()); // Capture stdout for logging
        cmd.stderr(Stdio::piped()); // Capture stderr for error messages
        cmd.stdin(Stdio::null());
        cmd.output()
    }

    /// Find a command on PATH using native Rust (which crate)
    pub fn find_command(command: &str) -> Option<PathBuf> {
        which::which(command).ok()
    }

    /// Set permission bits on unix; no-op elsewhere
    #[cfg(unix)]
    pub fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
    }

    #[cfg(not(unix))]
    pub fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
        Ok(())
    }
}

/// Trimmed stderr, falling back to stdout, for error messages
pub fn failure_output(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !stderr.is_empty() {
        return stderr;
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
