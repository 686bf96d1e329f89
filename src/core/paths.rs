//! core::paths
//!
//! Centralized path routing for reflog storage locations.
//!
//! # Architecture
//!
//! Git keeps a reference's log under `logs/` mirroring the reference's
//! namespace. Which `logs/` directory depends on whether the reference is
//! shared between worktrees:
//! - Shared refs (`refs/heads/*`, `refs/tags/*`, ...) log under `common_dir`
//! - Per-worktree refs (`HEAD`, `refs/bisect/*`, ...) log under `git_dir`
//!
//! For normal repositories `git_dir == common_dir`; linked worktrees have
//! their own `git_dir` under `<common_dir>/worktrees/<name>/`.
//!
//! Discovery is delegated to libgit2, so bare repositories and `.git`
//! files resolve exactly as git resolves them.
//!
//! # Example
//!
//! ```
//! use reflog::core::paths::RepoPaths;
//! use reflog::core::types::RefName;
//! use std::path::PathBuf;
//!
//! let paths = RepoPaths::new(
//!     PathBuf::from("/repo/.git"),
//!     PathBuf::from("/repo/.git"),
//! );
//!
//! assert_eq!(
//!     paths.reflog_path(&RefName::new("refs/heads/main").unwrap()),
//!     PathBuf::from("/repo/.git/logs/refs/heads/main")
//! );
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use git2::{ErrorCode, Repository, RepositoryOpenFlags};
use thiserror::Error;
use tracing::debug;

use crate::core::types::RefName;

/// Errors from repository discovery.
#[derive(Debug, Error)]
pub enum PathError {
    /// No repository found at or above the start directory.
    #[error("not a git repository (or any parent up to a ceiling): {0}")]
    NotARepo(PathBuf),

    /// libgit2 found something but could not open it.
    #[error("failed to open repository at {path}: {source}")]
    Git {
        path: PathBuf,
        source: git2::Error,
    },
}

impl PathError {
    fn from_git2(path: &Path, source: git2::Error) -> Self {
        match source.code() {
            ErrorCode::NotFound => PathError::NotARepo(path.to_path_buf()),
            _ => PathError::Git {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

/// Environment overrides consulted by [`RepoPaths::discover`].
///
/// Relative paths are resolved against the start directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryEnv {
    /// `$GIT_DIR`: open this directory instead of searching.
    pub git_dir: Option<PathBuf>,
    /// `$GIT_COMMON_DIR`: replaces the discovered common directory.
    pub common_dir: Option<PathBuf>,
    /// `$GIT_CEILING_DIRECTORIES`: the upward search never enters these.
    pub ceiling_dirs: Vec<PathBuf>,
}

impl DiscoveryEnv {
    /// Read the overrides from the process environment.
    pub fn from_env() -> Self {
        let non_empty = |key: &str| std::env::var_os(key).filter(|v| !v.is_empty());
        Self {
            git_dir: non_empty("GIT_DIR").map(PathBuf::from),
            common_dir: non_empty("GIT_COMMON_DIR").map(PathBuf::from),
            ceiling_dirs: non_empty("GIT_CEILING_DIRECTORIES")
                .map(|v| {
                    std::env::split_paths(&v)
                        .filter(|p| !p.as_os_str().is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// Location of a repository's git directories.
///
/// # Invariants
///
/// - Shared logs use `common_dir`
/// - Per-worktree logs use `git_dir`
/// - No code outside this module should compute `*.join("logs")` paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPaths {
    /// Path to the per-worktree .git directory.
    /// For normal repos, this equals common_dir.
    pub git_dir: PathBuf,

    /// Path to the shared git directory (refs, objects, config).
    /// For normal repos, this equals git_dir.
    pub common_dir: PathBuf,
}

impl RepoPaths {
    /// Create a new RepoPaths from git_dir and common_dir.
    pub fn new(git_dir: PathBuf, common_dir: PathBuf) -> Self {
        Self {
            git_dir,
            common_dir,
        }
    }

    /// Paths of an opened repository.
    fn from_repo(repo: &Repository) -> Self {
        // libgit2 reports directories with a trailing separator.
        let clean = |p: &Path| p.components().collect::<PathBuf>();
        Self::new(clean(repo.path()), clean(repo.commondir()))
    }

    /// Paths for the git directory `git_dir`, without searching.
    ///
    /// Works for normal, bare, and linked-worktree git directories; a
    /// worktree's `commondir` file is honoured.
    pub fn from_git_dir(git_dir: impl AsRef<Path>) -> Result<Self, PathError> {
        let git_dir = git_dir.as_ref();
        let repo = Repository::open_ext(
            git_dir,
            RepositoryOpenFlags::NO_SEARCH,
            std::iter::empty::<OsString>(),
        )
        .map_err(|e| PathError::from_git2(git_dir, e))?;
        Ok(Self::from_repo(&repo))
    }

    /// Discover the repository containing `start`.
    ///
    /// Honours `$GIT_DIR`, `$GIT_COMMON_DIR` and `$GIT_CEILING_DIRECTORIES`.
    pub fn discover(start: &Path) -> Result<Self, PathError> {
        Self::discover_with(start, &DiscoveryEnv::from_env())
    }

    /// [`RepoPaths::discover`] with explicit environment overrides.
    ///
    /// Without `git_dir` the search walks up from `start` through working
    /// trees, `.git` files, and bare repositories, stopping below any
    /// ceiling directory.
    pub fn discover_with(start: &Path, env: &DiscoveryEnv) -> Result<Self, PathError> {
        let mut paths = match &env.git_dir {
            Some(git_dir) => {
                let git_dir = start.join(git_dir);
                debug!(git_dir = %git_dir.display(), "using $GIT_DIR");
                Self::from_git_dir(git_dir)?
            }
            None => {
                let repo = Repository::open_ext(
                    start,
                    RepositoryOpenFlags::empty(),
                    env.ceiling_dirs.iter().map(|p| start.join(p)),
                )
                .map_err(|e| PathError::from_git2(start, e))?;
                let paths = Self::from_repo(&repo);
                debug!(
                    git_dir = %paths.git_dir.display(),
                    bare = repo.is_bare(),
                    "discovered repository"
                );
                paths
            }
        };

        if let Some(common_dir) = &env.common_dir {
            paths.common_dir = start.join(common_dir);
            debug!(common_dir = %paths.common_dir.display(), "using $GIT_COMMON_DIR");
        }
        Ok(paths)
    }

    // =========================================================================
    // Log locations
    // =========================================================================

    /// The `logs/` directory holding shared reference logs.
    pub fn logs_dir(&self) -> PathBuf {
        self.common_dir.join("logs")
    }

    /// The on-disk log of `refname`.
    ///
    /// Pure derivation; the file need not exist.
    pub fn reflog_path(&self, refname: &RefName) -> PathBuf {
        let base = if refname.is_per_worktree() {
            &self.git_dir
        } else {
            &self.common_dir
        };
        refname
            .as_str()
            .split('/')
            .fold(base.join("logs"), |path, component| path.join(component))
    }

    // =========================================================================
    // Tool storage
    // =========================================================================

    /// Get the path to the repository configuration file.
    ///
    /// This is `<common_dir>/reflog/config.toml`.
    pub fn repo_config_path(&self) -> PathBuf {
        self.common_dir.join("reflog").join("config.toml")
    }

    /// Advisory lock file guarding writers of `refname`'s log.
    ///
    /// Lives under `<common_dir>/reflog/locks/` so `logs/` only ever holds
    /// logs.
    pub fn reflog_lock_path(&self, refname: &RefName) -> PathBuf {
        let mut name = refname.as_str().replace('/', "%");
        name.push_str(".lock");
        self.common_dir.join("reflog").join("locks").join(name)
    }

    /// Check if this is a linked worktree (common_dir != git_dir).
    pub fn is_worktree(&self) -> bool {
        self.git_dir != self.common_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use std::fs;
    use tempfile::TempDir;

    fn normal_repo() -> RepoPaths {
        RepoPaths::new(PathBuf::from("/repo/.git"), PathBuf::from("/repo/.git"))
    }

    fn worktree() -> RepoPaths {
        RepoPaths::new(
            PathBuf::from("/repo/.git/worktrees/feature"),
            PathBuf::from("/repo/.git"),
        )
    }

    #[test]
    fn branch_log_under_common_dir() {
        let main = RefName::new("refs/heads/feature/x").unwrap();
        assert_eq!(
            worktree().reflog_path(&main),
            PathBuf::from("/repo/.git/logs/refs/heads/feature/x")
        );
    }

    #[test]
    fn head_log_under_git_dir() {
        assert_eq!(
            normal_repo().reflog_path(&RefName::head()),
            PathBuf::from("/repo/.git/logs/HEAD")
        );
        assert_eq!(
            worktree().reflog_path(&RefName::head()),
            PathBuf::from("/repo/.git/worktrees/feature/logs/HEAD")
        );
    }

    #[test]
    fn config_path() {
        assert_eq!(
            normal_repo().repo_config_path(),
            PathBuf::from("/repo/.git/reflog/config.toml")
        );
    }

    #[test]
    fn lock_path_is_flat() {
        assert_eq!(
            worktree().reflog_lock_path(&RefName::new("refs/heads/feature/x").unwrap()),
            PathBuf::from("/repo/.git/reflog/locks/refs%heads%feature%x.lock")
        );
    }

    #[test]
    fn worktree_detection() {
        assert!(!normal_repo().is_worktree());
        assert!(worktree().is_worktree());
    }

    /// Create a repository at `dir` with one empty commit on `main`.
    fn repo_with_commit(dir: &Path) -> Repository {
        let repo = Repository::init(dir).unwrap();
        {
            let sig = Signature::now("Jane Doe", "jane@example.com").unwrap();
            let tree_id = repo.index().unwrap().write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[]).unwrap();
        }
        repo
    }

    fn canonical(path: &Path) -> PathBuf {
        fs::canonicalize(path).unwrap()
    }

    #[test]
    fn discover_walks_up() {
        let temp = TempDir::new().unwrap();
        Repository::init(temp.path()).unwrap();
        let nested = temp.path().join("src/deep");
        fs::create_dir_all(&nested).unwrap();

        let paths = RepoPaths::discover_with(&nested, &DiscoveryEnv::default()).unwrap();
        assert_eq!(canonical(&paths.git_dir), canonical(&temp.path().join(".git")));
        assert!(!paths.is_worktree());
    }

    #[test]
    fn discover_bare_repository() {
        let temp = TempDir::new().unwrap();
        let bare = temp.path().join("repo.git");
        Repository::init_bare(&bare).unwrap();

        for start in [bare.clone(), bare.join("refs/heads")] {
            let paths = RepoPaths::discover_with(&start, &DiscoveryEnv::default()).unwrap();
            assert_eq!(canonical(&paths.git_dir), canonical(&bare));
            assert_eq!(canonical(&paths.common_dir), canonical(&bare));
        }

        let paths = RepoPaths::from_git_dir(&bare).unwrap();
        assert!(!paths.is_worktree());
        assert_eq!(
            paths.reflog_path(&RefName::head()),
            paths.git_dir.join("logs").join("HEAD")
        );
    }

    #[test]
    fn discover_linked_worktree() {
        let temp = TempDir::new().unwrap();
        let main = temp.path().join("main");
        let repo = repo_with_commit(&main);
        let wt_dir = temp.path().join("wt");
        repo.worktree("wt", &wt_dir, None).unwrap();

        let paths = RepoPaths::discover_with(&wt_dir, &DiscoveryEnv::default()).unwrap();
        assert!(paths.is_worktree());
        assert_eq!(canonical(&paths.git_dir), canonical(&main.join(".git/worktrees/wt")));
        assert_eq!(canonical(&paths.common_dir), canonical(&main.join(".git")));

        let from_git_dir = RepoPaths::from_git_dir(&paths.git_dir).unwrap();
        assert_eq!(from_git_dir, paths);
    }

    #[test]
    fn ceiling_stops_search() {
        let temp = TempDir::new().unwrap();
        let outer = canonical(temp.path());
        Repository::init(&outer).unwrap();
        let ceiling = outer.join("mid");
        let inner = ceiling.join("inner");
        fs::create_dir_all(&inner).unwrap();

        let env = DiscoveryEnv {
            ceiling_dirs: vec![ceiling],
            ..DiscoveryEnv::default()
        };
        assert!(matches!(
            RepoPaths::discover_with(&inner, &env),
            Err(PathError::NotARepo(_))
        ));
        assert!(RepoPaths::discover_with(&inner, &DiscoveryEnv::default()).is_ok());
    }

    #[test]
    fn env_git_dir_and_common_dir_override() {
        let temp = TempDir::new().unwrap();
        Repository::init_bare(temp.path().join("a.git")).unwrap();
        let elsewhere = temp.path().join("elsewhere");
        fs::create_dir_all(&elsewhere).unwrap();

        let env = DiscoveryEnv {
            git_dir: Some(PathBuf::from("a.git")),
            common_dir: Some(PathBuf::from("shared")),
            ceiling_dirs: Vec::new(),
        };
        let paths = RepoPaths::discover_with(temp.path(), &env).unwrap();
        assert_eq!(canonical(&paths.git_dir), canonical(&temp.path().join("a.git")));
        assert_eq!(paths.common_dir, temp.path().join("shared"));
        assert!(paths.is_worktree());
    }

    #[test]
    fn not_a_repository() {
        let temp = TempDir::new().unwrap();
        let start = temp.path().join("sub");
        fs::create_dir_all(&start).unwrap();
        let env = DiscoveryEnv {
            ceiling_dirs: vec![canonical(temp.path())],
            ..DiscoveryEnv::default()
        };
        assert!(matches!(
            RepoPaths::discover_with(&start, &env),
            Err(PathError::NotARepo(_))
        ));
        assert!(matches!(
            RepoPaths::from_git_dir(temp.path()),
            Err(PathError::NotARepo(_))
        ));
    }
}
