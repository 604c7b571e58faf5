use std::path::{Path, PathBuf};
use std::time::Duration;

use git2::{DiffOptions, Oid, Repository as Git2Repo, Signature, Sort};
use log::debug;

use crate::config::Committer;
use crate::domain::CommitRecord;
use crate::error::{ReleaseError, Result};
use crate::git::{pathspec, CommitRange};
use crate::process;

const DEFAULT_PUSH_TIMEOUT: Duration = Duration::from_secs(300);

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    push_timeout: Duration,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository {
            repo,
            push_timeout: DEFAULT_PUSH_TIMEOUT,
        })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository {
            repo,
            push_timeout: DEFAULT_PUSH_TIMEOUT,
        }
    }

    /// Bound `git push` by `timeout`
    pub fn with_push_timeout(mut self, timeout: Duration) -> Self {
        self.push_timeout = timeout;
        self
    }

    /// Root of the working tree
    pub fn workdir(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| ReleaseError::config("repository has no working tree (bare repository)"))
    }

    fn tag_commit(&self, tag_name: &str) -> Result<git2::Commit<'_>> {
        let reference = self
            .repo
            .find_reference(&format!("refs/tags/{}", tag_name))
            .map_err(|e| ReleaseError::external("git", format!("cannot find tag '{}': {}", tag_name, e)))?;
        Ok(reference.peel_to_commit()?)
    }

    fn diff_options(path: &Path) -> DiffOptions {
        let mut options = DiffOptions::new();
        options
            .pathspec(pathspec(path))
            .include_untracked(true)
            .recurse_untracked_dirs(true);
        options
    }
}

/// Version carried by a `<name>-v<semver>` tag, if it parses
fn tag_version(name: &str) -> Option<semver::Version> {
    let (_, version) = name.rsplit_once("-v")?;
    semver::Version::parse(version).ok()
}

impl super::Repository for Git2Repository {
    fn list_tags(&self) -> Result<Vec<String>> {
        let names = self.repo.tag_names(None)?;

        let mut tags: Vec<(i64, Option<semver::Version>, String)> = names
            .iter()
            .flatten()
            .filter_map(|name| {
                // Tags that do not point at a commit cannot be release tags.
                self.tag_commit(name)
                    .ok()
                    .map(|commit| (commit.time().seconds(), tag_version(name), name.to_string()))
            })
            .collect();

        // Same commit: higher version first, then name.
        tags.sort_by(|a, b| b.cmp(a));
        Ok(tags.into_iter().map(|(_, _, name)| name).collect())
    }

    fn resolve_tag(&self, tag_name: &str) -> Result<String> {
        Ok(self.tag_commit(tag_name)?.id().to_string())
    }

    fn commits_in_range(&self, range: &CommitRange) -> Result<String> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push_head()?;
        if let CommitRange::Since(commit) = range {
            revwalk.hide(Oid::from_str(commit)?)?;
        }

        let mut log = String::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            let short = commit.as_object().short_id()?;
            let record = CommitRecord::new(
                commit.summary().unwrap_or_default(),
                commit.body().unwrap_or_default(),
                short.as_str().unwrap_or_default(),
                commit.id().to_string(),
            );
            log.push_str(&record.to_log_entry());
        }

        debug!("read {} bytes of log for range {}", log.len(), range);
        Ok(log)
    }

    fn has_changed_since(&self, path: &Path, reference: &str) -> Result<bool> {
        let tree = self.tag_commit(reference)?.tree()?;
        let mut options = Self::diff_options(path);

        let diff = self
            .repo
            .diff_tree_to_workdir_with_index(Some(&tree), Some(&mut options))?;
        Ok(diff.deltas().len() > 0)
    }

    fn commit_touches_path(&self, full_hash: &str, path: &Path) -> Result<bool> {
        let commit = self.repo.find_commit(Oid::from_str(full_hash)?)?;
        let tree = commit.tree()?;
        let parent_tree = match commit.parents().next() {
            Some(parent) => Some(parent.tree()?),
            None => None,
        };
        let mut options = Self::diff_options(path);

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut options))?;
        Ok(diff.deltas().len() > 0)
    }

    fn create_tag(&self, name: &str, message: &str, committer: &Committer) -> Result<()> {
        let signature = Signature::now(&committer.name, &committer.email)?;
        let head = self.repo.head()?.peel_to_commit()?;

        self.repo
            .tag(name, head.as_object(), &signature, message, false)
            .map_err(|e| ReleaseError::external("git", format!("cannot create tag '{}': {}", name, e)))?;

        Ok(())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        let args = vec![
            "push".to_string(),
            remote.to_string(),
            format!("refs/tags/{}:refs/tags/{}", name, name),
        ];
        process::run_bounded("git push", "git", &args, &self.workdir()?, self.push_timeout)?;
        Ok(())
    }

    fn remote_url(&self, remote: &str) -> Result<String> {
        let found = self
            .repo
            .find_remote(remote)
            .map_err(|e| ReleaseError::config(format!("cannot find remote '{}': {}", remote, e)))?;

        found
            .url()
            .map(str::to_string)
            .ok_or_else(|| ReleaseError::config(format!("remote '{}' has no URL", remote)))
    }
}
