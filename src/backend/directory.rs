use super::{Backend, BackendKind, is_safe_relative_path, relative_slash_path};
use crate::error::{RepoError, Result};
use crate::types::{Commit, CommitDepth};
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};

/// Backend for a plain directory tree.
///
/// Tracked files are whatever the directory walk yields after `.gitignore`
/// rules are applied. There is no history: the only accepted reference is
/// `HEAD` (or an empty one), and commit lookups are unsupported.
///
/// Symlinks are not followed into directories, and a symlink whose target
/// resolves outside the root is neither listed nor read.
pub struct DirectoryBackend {
    locator: String,
    root: PathBuf,
    /// Canonical root while bound
    bound: Option<PathBuf>,
}

impl DirectoryBackend {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            locator: root.display().to_string(),
            root,
            bound: None,
        }
    }

    fn canonical_root(&self) -> Result<&Path> {
        self.bound.as_deref().ok_or(RepoError::NotInitialized)
    }
}

/// Whether `path` resolves to a location outside `canonical_root`.
///
/// Paths that cannot be resolved (dangling links) do not count as escaping;
/// reading them fails later with the real IO error.
fn escapes_root(canonical_root: &Path, path: &Path) -> bool {
    fs::canonicalize(path).is_ok_and(|target| !target.starts_with(canonical_root))
}

fn walk_error(root: &Path, err: ignore::Error) -> RepoError {
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other(message));
    RepoError::io(root.display().to_string(), source)
}

impl Backend for DirectoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Directory
    }

    fn locator(&self) -> &str {
        &self.locator
    }

    fn bind(&mut self, reference: &str, _depth: CommitDepth) -> Result<Option<String>> {
        if !self.root.exists() {
            return Err(RepoError::binding(&self.locator, "path does not exist"));
        }
        if !self.root.is_dir() {
            return Err(RepoError::binding(&self.locator, "path is not a directory"));
        }

        match reference.trim() {
            "" | "HEAD" => {}
            other => {
                return Err(RepoError::reference(
                    other,
                    "plain directories only support HEAD",
                ));
            }
        }

        let canonical = fs::canonicalize(&self.root)
            .map_err(|e| RepoError::binding(&self.locator, e))?;

        tracing::info!("Bound directory {}", self.locator);
        self.bound = Some(canonical);
        Ok(None)
    }

    fn commit(&self, _sha: &str) -> Result<Option<Commit>> {
        self.canonical_root()?;
        Err(RepoError::Unsupported {
            backend: "directory",
            operation: "commit history",
        })
    }

    fn tracked_files(&self) -> Result<Vec<String>> {
        let canonical_root = self.canonical_root()?;

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(true) // Respect .gitignore, .ignore, etc.
            .hidden(false) // Dotfiles such as workflow definitions are content too
            .require_git(false) // Don't require a .git directory
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| walk_error(&self.root, e))?;
            let path = entry.path();

            // Follows symlinks, so links to directories are skipped too
            if path.is_dir() {
                continue;
            }

            if entry.path_is_symlink() && escapes_root(canonical_root, path) {
                tracing::debug!("Skipping {}: link leaves the root", path.display());
                continue;
            }

            // Explicitly skip .git directory contents
            if path.components().any(|c| c.as_os_str() == ".git") {
                continue;
            }

            if let Some(relative) = relative_slash_path(&self.root, path) {
                files.push(relative);
            }
        }

        files.sort();
        tracing::debug!("{} files under {}", files.len(), self.locator);
        Ok(files)
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let canonical_root = self.canonical_root()?;
        if !is_safe_relative_path(path) {
            return Err(RepoError::io(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path escapes the repository root",
                ),
            ));
        }

        let full = self.root.join(path);
        if escapes_root(canonical_root, &full) {
            return Err(RepoError::io(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "path resolves outside the repository root",
                ),
            ));
        }
        fs::read(&full).map_err(|e| RepoError::io(path, e))
    }

    fn release(&mut self) -> Result<()> {
        self.bound = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("README.md"), "# readme").unwrap();
        fs::create_dir_all(dir.path().join(".github/workflows")).unwrap();
        fs::write(dir.path().join(".github/workflows/ci.yml"), "on: push").unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/config"), "[core]").unwrap();
        dir
    }

    #[test]
    fn test_lists_files_without_vcs_metadata() {
        let dir = setup();
        let mut backend = DirectoryBackend::new(dir.path());
        assert_eq!(backend.bind("HEAD", CommitDepth::UNBOUNDED).unwrap(), None);

        let files = backend.tracked_files().unwrap();
        assert_eq!(
            files,
            vec![
                ".github/workflows/ci.yml".to_string(),
                "README.md".to_string()
            ]
        );
    }

    #[test]
    fn test_respects_gitignore() {
        let dir = setup();
        fs::write(dir.path().join(".gitignore"), "build/\n").unwrap();
        fs::create_dir_all(dir.path().join("build")).unwrap();
        fs::write(dir.path().join("build/out.bin"), "binary").unwrap();

        let mut backend = DirectoryBackend::new(dir.path());
        backend.bind("", CommitDepth::UNBOUNDED).unwrap();
        let files = backend.tracked_files().unwrap();
        assert!(files.contains(&".gitignore".to_string()));
        assert!(!files.iter().any(|f| f.starts_with("build/")));
    }

    #[test]
    fn test_rejects_named_reference() {
        let dir = setup();
        let mut backend = DirectoryBackend::new(dir.path());
        let err = backend.bind("main", CommitDepth::UNBOUNDED).unwrap_err();
        assert!(matches!(err, RepoError::Reference { .. }));
    }

    #[test]
    fn test_rejects_file_locator() {
        let dir = setup();
        let mut backend = DirectoryBackend::new(dir.path().join("README.md"));
        let err = backend.bind("HEAD", CommitDepth::UNBOUNDED).unwrap_err();
        assert!(matches!(err, RepoError::Binding { .. }));
    }

    #[test]
    fn test_history_is_unsupported() {
        let dir = setup();
        let mut backend = DirectoryBackend::new(dir.path());
        backend.bind("HEAD", CommitDepth::UNBOUNDED).unwrap();
        let err = backend.commit("abc").unwrap_err();
        assert!(matches!(err, RepoError::Unsupported { .. }));
    }

    #[test]
    fn test_read_file_and_traversal() {
        let dir = setup();
        let mut backend = DirectoryBackend::new(dir.path());
        backend.bind("HEAD", CommitDepth::UNBOUNDED).unwrap();
        assert_eq!(backend.read_file("README.md").unwrap(), b"# readme".to_vec());
        assert!(matches!(
            backend.read_file("../README.md").unwrap_err(),
            RepoError::Io { .. }
        ));
    }

    #[test]
    fn test_unbound_access_fails() {
        let dir = setup();
        let backend = DirectoryBackend::new(dir.path());
        assert!(matches!(
            backend.tracked_files().unwrap_err(),
            RepoError::NotInitialized
        ));
    }
}
