use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::config::Committer;
use crate::domain::CommitRecord;
use crate::error::{ReleaseError, Result};
use crate::git::{CommitRange, Repository};

/// Mock repository for testing without actual git operations
#[derive(Debug, Default)]
pub struct MockRepository {
    /// (tag, commit), most recent first
    tags: RefCell<Vec<(String, String)>>,
    logs: HashMap<CommitRange, String>,
    /// reference -> files changed in the working tree since it
    changed_since: HashMap<String, Vec<PathBuf>>,
    commit_files: HashMap<String, Vec<PathBuf>>,
    remotes: HashMap<String, String>,
    failing_pushes: HashSet<String>,
    failing_tag_listing: bool,
    created: RefCell<Vec<String>>,
    pushed: RefCell<Vec<(String, String)>>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag pointing at a commit. Call in most-recent-first order.
    pub fn add_tag(&mut self, name: impl Into<String>, commit: impl Into<String>) {
        self.tags.get_mut().push((name.into(), commit.into()));
    }

    /// Append a commit to the log of `range`, recording the files it touched
    pub fn add_commit(&mut self, range: &CommitRange, commit: CommitRecord, files: &[&str]) {
        self.logs
            .entry(range.clone())
            .or_default()
            .push_str(&commit.to_log_entry());
        self.commit_files
            .entry(commit.full_hash)
            .or_default()
            .extend(files.iter().map(PathBuf::from));
    }

    /// Replace the raw log text returned for `range`
    pub fn set_raw_log(&mut self, range: &CommitRange, raw: impl Into<String>) {
        self.logs.insert(range.clone(), raw.into());
    }

    /// Record that `file` differs between `reference` and the working tree
    pub fn mark_changed(&mut self, reference: impl Into<String>, file: &str) {
        self.changed_since
            .entry(reference.into())
            .or_default()
            .push(PathBuf::from(file));
    }

    pub fn set_remote(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.remotes.insert(name.into(), url.into());
    }

    /// Make pushing `tag` fail
    pub fn fail_push(&mut self, tag: impl Into<String>) {
        self.failing_pushes.insert(tag.into());
    }

    /// Make every tag listing fail
    pub fn fail_tag_listing(&mut self) {
        self.failing_tag_listing = true;
    }

    /// Tags created through [Repository::create_tag], in call order
    pub fn created_tags(&self) -> Vec<String> {
        self.created.borrow().clone()
    }

    /// (remote, tag) pairs pushed, in call order
    pub fn pushed_tags(&self) -> Vec<(String, String)> {
        self.pushed.borrow().clone()
    }

    fn any_under(files: Option<&Vec<PathBuf>>, path: &Path) -> bool {
        files.is_some_and(|files| files.iter().any(|f| f.starts_with(path)))
    }
}

impl Repository for MockRepository {
    fn list_tags(&self) -> Result<Vec<String>> {
        if self.failing_tag_listing {
            return Err(ReleaseError::external("git", "cannot list tags"));
        }
        Ok(self.tags.borrow().iter().map(|(name, _)| name.clone()).collect())
    }

    fn resolve_tag(&self, tag_name: &str) -> Result<String> {
        self.tags
            .borrow()
            .iter()
            .find(|(name, _)| name == tag_name)
            .map(|(_, commit)| commit.clone())
            .ok_or_else(|| ReleaseError::external("git", format!("tag '{}' not found", tag_name)))
    }

    fn commits_in_range(&self, range: &CommitRange) -> Result<String> {
        Ok(self.logs.get(range).cloned().unwrap_or_default())
    }

    fn has_changed_since(&self, path: &Path, reference: &str) -> Result<bool> {
        Ok(Self::any_under(self.changed_since.get(reference), path))
    }

    fn commit_touches_path(&self, full_hash: &str, path: &Path) -> Result<bool> {
        Ok(Self::any_under(self.commit_files.get(full_hash), path))
    }

    fn create_tag(&self, name: &str, _message: &str, _committer: &Committer) -> Result<()> {
        if self.tags.borrow().iter().any(|(existing, _)| existing == name) {
            return Err(ReleaseError::external(
                "git",
                format!("tag '{}' already exists", name),
            ));
        }
        self.tags
            .borrow_mut()
            .insert(0, (name.to_string(), "HEAD".to_string()));
        self.created.borrow_mut().push(name.to_string());
        Ok(())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        if self.failing_pushes.contains(name) {
            return Err(ReleaseError::external(
                "git push",
                format!("remote '{}' rejected {}", remote, name),
            ));
        }
        self.pushed
            .borrow_mut()
            .push((remote.to_string(), name.to_string()));
        Ok(())
    }

    fn remote_url(&self, remote: &str) -> Result<String> {
        self.remotes
            .get(remote)
            .cloned()
            .ok_or_else(|| ReleaseError::config(format!("remote '{}' is not configured", remote)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse_log;

    fn committer() -> Committer {
        Committer {
            name: "Release Bot".to_string(),
            email: "bot@example.com".to_string(),
        }
    }

    #[test]
    fn test_mock_repository_tags() {
        let mut repo = MockRepository::new();
        repo.add_tag("foo-v1.1.0", "bbb");
        repo.add_tag("foo-v1.0.0", "aaa");

        assert_eq!(repo.list_tags().unwrap(), vec!["foo-v1.1.0", "foo-v1.0.0"]);
        assert_eq!(repo.resolve_tag("foo-v1.0.0").unwrap(), "aaa");
        assert!(repo.resolve_tag("foo-v9.0.0").is_err());
    }

    #[test]
    fn test_mock_repository_log() {
        let mut repo = MockRepository::new();
        let range = CommitRange::FullHistory;
        repo.add_commit(
            &range,
            CommitRecord::new("feat: a", "", "1111111", "11111111111"),
            &["packages/foo/a.js"],
        );

        let commits = parse_log(&repo.commits_in_range(&range).unwrap()).unwrap();
        assert_eq!(commits.len(), 1);
        assert!(repo
            .commit_touches_path("11111111111", Path::new("packages/foo"))
            .unwrap());
        assert!(!repo
            .commit_touches_path("11111111111", Path::new("packages/bar"))
            .unwrap());
        assert!(repo
            .commits_in_range(&CommitRange::Since("x".to_string()))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_created_tag_is_listed_first() {
        let mut repo = MockRepository::new();
        repo.add_tag("foo-v1.0.0", "aaa");

        repo.create_tag("foo-v1.1.0", "release", &committer()).unwrap();

        assert_eq!(repo.list_tags().unwrap()[0], "foo-v1.1.0");
        assert_eq!(repo.created_tags(), vec!["foo-v1.1.0"]);
        assert!(repo.create_tag("foo-v1.1.0", "again", &committer()).is_err());
    }

    #[test]
    fn test_push_failure_injection() {
        let mut repo = MockRepository::new();
        repo.fail_push("bar-v1.0.0");

        assert!(repo.push_tag("origin", "foo-v1.0.0").is_ok());
        assert!(repo.push_tag("origin", "bar-v1.0.0").is_err());
        assert_eq!(
            repo.pushed_tags(),
            vec![("origin".to_string(), "foo-v1.0.0".to_string())]
        );
    }
}
