use crate::paths;
use std::path::{Path, PathBuf};

pub fn pid_file() -> PathBuf {
    paths::state_dir().join("daemon.pid")
}

/// Whether the monitoring daemon appears to be running, based on its pid
/// file. The daemon itself is a separate process; the dashboard only shows
/// an indicator.
pub fn is_running() -> bool {
    pid_file_alive(&pid_file())
}

fn pid_file_alive(path: &Path) -> bool {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return false;
    };
    let Ok(pid) = contents.trim().parse::<u32>() else {
        return false;
    };
    process_exists(pid)
}

#[cfg(unix)]
fn process_exists(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}

#[cfg(not(unix))]
fn process_exists(_pid: u32) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_pid_file_means_not_running() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!pid_file_alive(&dir.path().join("daemon.pid")));
    }

    #[test]
    fn garbage_pid_file_means_not_running() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daemon.pid");
        std::fs::write(&path, "not-a-pid").unwrap();
        assert!(!pid_file_alive(&path));
    }

    #[cfg(unix)]
    #[test]
    fn own_pid_counts_as_alive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daemon.pid");
        std::fs::write(&path, std::process::id().to_string()).unwrap();
        assert!(pid_file_alive(&path));
    }
}
