//! Version-control abstraction layer
//!
//! The release pipeline only talks to version control through the
//! [Repository] trait, so every pipeline stage can be exercised against
//! [mock::MockRepository] without a real working tree.
//!
//! - [repository::Git2Repository]: real implementation using the `git2` crate
//! - [mock::MockRepository]: in-memory implementation for tests

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use std::fmt;
use std::path::Path;

use crate::config::Committer;
use crate::error::Result;

/// Commits under analysis for one package
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommitRange {
    /// Everything reachable from HEAD
    FullHistory,
    /// Commits reachable from HEAD but not from the given commit
    Since(String),
}

impl fmt::Display for CommitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitRange::FullHistory => write!(f, "HEAD"),
            CommitRange::Since(commit) => write!(f, "{}..HEAD", commit),
        }
    }
}

/// Version-control operations the release pipeline needs
///
/// All methods return [crate::error::Result<T>]; a failure aborts the
/// current package's pipeline only.
pub trait Repository {
    /// All tag names, most recent target commit first
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Full hash of the commit a tag points at
    fn resolve_tag(&self, tag_name: &str) -> Result<String>;

    /// Raw log text for a range, in the layout of [crate::domain::LOG_FORMAT]
    fn commits_in_range(&self, range: &CommitRange) -> Result<String>;

    /// Whether any file under `path` differs between `reference` and the
    /// working tree
    fn has_changed_since(&self, path: &Path, reference: &str) -> Result<bool>;

    /// Whether the commit changed any file under `path`
    fn commit_touches_path(&self, full_hash: &str, path: &Path) -> Result<bool>;

    /// Create an annotated tag on HEAD
    fn create_tag(&self, name: &str, message: &str, committer: &Committer) -> Result<()>;

    /// Push a tag to a remote
    fn push_tag(&self, remote: &str, name: &str) -> Result<()>;

    /// URL configured for a remote
    fn remote_url(&self, remote: &str) -> Result<String>;
}

/// Repository-relative path in the forward-slash form git pathspecs use
pub(crate) fn pathspec(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_range_display() {
        assert_eq!(CommitRange::FullHistory.to_string(), "HEAD");
        assert_eq!(
            CommitRange::Since("abc123".to_string()).to_string(),
            "abc123..HEAD"
        );
    }

    #[test]
    fn test_pathspec_normalizes_separators() {
        assert_eq!(pathspec(Path::new("packages/foo/")), "packages/foo");
    }
}
