use std::cell::RefCell;
use std::collections::HashSet;

use crate::config::Credentials;
use crate::error::{ReleaseError, Result};
use crate::hosting::{ReleaseHost, RepoIdentity};

/// A release recorded by [`MockReleaseHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRelease {
    pub tag_name: String,
    pub notes: String,
    pub repo: String,
}

/// Mock release host for testing; records every created release
#[derive(Debug, Default)]
pub struct MockReleaseHost {
    failing: HashSet<String>,
    releases: RefCell<Vec<RecordedRelease>>,
}

impl MockReleaseHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make release creation for `tag_name` fail
    pub fn fail_for(&mut self, tag_name: &str) {
        self.failing.insert(tag_name.to_string());
    }

    pub fn releases(&self) -> Vec<RecordedRelease> {
        self.releases.borrow().clone()
    }
}

impl ReleaseHost for MockReleaseHost {
    fn create_release(
        &self,
        tag_name: &str,
        notes: &str,
        repo: &RepoIdentity,
        _credentials: &Credentials,
    ) -> Result<()> {
        if self.failing.contains(tag_name) {
            return Err(ReleaseError::external(
                "hosting",
                format!("release {} rejected", tag_name),
            ));
        }
        self.releases.borrow_mut().push(RecordedRelease {
            tag_name: tag_name.to_string(),
            notes: notes.to_string(),
            repo: repo.name.clone(),
        });
        Ok(())
    }
}
