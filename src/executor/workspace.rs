use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic disambiguator so concurrent runs of the same program id never
/// share a directory
static WORKSPACE_SEQ: AtomicU64 = AtomicU64::new(0);

/// An isolated temporary directory scoped to one execution invocation.
///
/// The directory and everything staged into it are removed when the handle
/// is dropped, on success and failure paths alike. Removal is best-effort:
/// a failed cleanup is logged and never overrides the execution result.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    pub fn acquire(program_id: i64) -> std::io::Result<Self> {
        let seq = WORKSPACE_SEQ.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "aula-exec-{}-{program_id}-{seq}",
            std::process::id()
        ));
        fs::create_dir_all(&path)?;

        log::debug!("Acquired workspace {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => log::debug!("Released workspace {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "Failed to clean up workspace {}: {e}",
                self.path.display()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_creates_directory() {
        let workspace = Workspace::acquire(1).unwrap();
        assert!(workspace.path().is_dir());
    }

    #[test]
    fn test_same_program_id_gets_distinct_workspaces() {
        let a = Workspace::acquire(7).unwrap();
        let b = Workspace::acquire(7).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_drop_removes_directory_and_contents() {
        let workspace = Workspace::acquire(2).unwrap();
        let path = workspace.path().to_path_buf();
        fs::write(path.join("artifact.txt"), "data").unwrap();

        drop(workspace);
        assert!(!path.exists());
    }
}
