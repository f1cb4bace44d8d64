//! Copy Nebula daemon binaries into a node directory

use crate::error::ProvisionError;
use crate::exec::local;
use crate::platform::Platform;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const EXECUTABLE_MODE: u32 = 0o755;

/// Outcome of staging one platform's binary
#[derive(Debug)]
pub enum CopyResult {
    Copied { platform: Platform, dest: PathBuf },
    /// No binary at the release path; partial distributions are allowed
    SkippedMissing { platform: Platform, source: PathBuf },
    Failed {
        platform: Platform,
        error: ProvisionError,
    },
}

impl CopyResult {
    pub fn platform(&self) -> Platform {
        match self {
            CopyResult::Copied { platform, .. }
            | CopyResult::SkippedMissing { platform, .. }
            | CopyResult::Failed { platform, .. } => *platform,
        }
    }

    pub fn is_copied(&self) -> bool {
        matches!(self, CopyResult::Copied { .. })
    }
}

/// Copy each platform's daemon from `dist_root` into `node_dir`.
///
/// `make_executable` is decided by the host, not the target: on a unix host
/// the darwin and linux copies get mode 755. The windows copy keeps whatever
/// bits the copy gave it.
pub fn stage_binaries(
    dist_root: &Path,
    node_dir: &Path,
    platforms: &[Platform],
    make_executable: bool,
) -> Vec<CopyResult> {
    platforms
        .iter()
        .map(|&platform| stage_one(dist_root, node_dir, platform, make_executable))
        .collect()
}

fn stage_one(
    dist_root: &Path,
    node_dir: &Path,
    platform: Platform,
    make_executable: bool,
) -> CopyResult {
    let source = dist_root.join(platform.daemon_path());
    if !source.is_file() {
        warn!(%platform, source = %source.display(), "nebula binary not found, skipping");
        return CopyResult::SkippedMissing { platform, source };
    }

    let dest = node_dir.join(platform.staged_name());
    if let Err(e) = fs::copy(&source, &dest) {
        return CopyResult::Failed {
            platform,
            error: ProvisionError::fs("copy", &source, e),
        };
    }

    if make_executable && !platform.is_windows() {
        if let Err(e) = local::set_mode(&dest, EXECUTABLE_MODE) {
            return CopyResult::Failed {
                platform,
                error: ProvisionError::fs("chmod", &dest, e),
            };
        }
    }

    info!(%platform, dest = %dest.display(), "staged nebula binary");
    CopyResult::Copied { platform, dest }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn mode(path: &Path) -> u32 {
        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    fn release(root: &Path, platform: Platform) {
        let path = root.join(platform.daemon_path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"binary").unwrap();
        local::set_mode(&path, 0o644).unwrap();
    }

    #[test]
    fn partial_distribution_skips_missing_platforms() {
        let dist = tempfile::tempdir().unwrap();
        let node = tempfile::tempdir().unwrap();
        release(dist.path(), Platform::Linux);

        let results = stage_binaries(dist.path(), node.path(), &Platform::ALL, true);

        assert_eq!(results.len(), 3);
        assert!(matches!(
            results[0],
            CopyResult::SkippedMissing {
                platform: Platform::Darwin,
                ..
            }
        ));
        assert!(results[1].is_copied());
        assert!(matches!(
            results[2],
            CopyResult::SkippedMissing {
                platform: Platform::Windows,
                ..
            }
        ));
        assert!(node.path().join("nebula-linux").is_file());
        assert!(!node.path().join("nebula-darwin").exists());
    }

    #[test]
    fn unix_binaries_become_executable_windows_copy_is_untouched() {
        let dist = tempfile::tempdir().unwrap();
        let node = tempfile::tempdir().unwrap();
        for platform in Platform::ALL {
            release(dist.path(), platform);
        }

        let results = stage_binaries(dist.path(), node.path(), &Platform::ALL, true);
        assert!(results.iter().all(CopyResult::is_copied));

        assert_eq!(mode(&node.path().join("nebula-darwin")), 0o755);
        assert_eq!(mode(&node.path().join("nebula-linux")), 0o755);
        assert_eq!(mode(&node.path().join("nebula-windows.exe")), 0o644);
    }

    #[test]
    fn windows_host_leaves_modes_alone() {
        let dist = tempfile::tempdir().unwrap();
        let node = tempfile::tempdir().unwrap();
        release(dist.path(), Platform::Linux);

        stage_binaries(dist.path(), node.path(), &[Platform::Linux], false);
        assert_eq!(mode(&node.path().join("nebula-linux")), 0o644);
    }

    #[test]
    fn unwritable_destination_is_reported_not_skipped() {
        let dist = tempfile::tempdir().unwrap();
        let node = tempfile::tempdir().unwrap();
        release(dist.path(), Platform::Darwin);

        let missing_dir = node.path().join("gone");
        let results = stage_binaries(dist.path(), &missing_dir, &[Platform::Darwin], true);
        assert!(matches!(results[0], CopyResult::Failed { .. }));
    }
}
