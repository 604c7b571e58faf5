use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{ReleaseError, Result};
use crate::registry::Registry;

/// Mock registry recording publish calls
#[derive(Debug, Default)]
pub struct MockRegistry {
    failing: HashSet<PathBuf>,
    published: RefCell<Vec<PathBuf>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make publishing `package_dir` fail
    pub fn fail_for(&mut self, package_dir: impl Into<PathBuf>) {
        self.failing.insert(package_dir.into());
    }

    /// Directories published so far, in call order
    pub fn published(&self) -> Vec<PathBuf> {
        self.published.borrow().clone()
    }
}

impl Registry for MockRegistry {
    fn publish(&self, package_dir: &Path) -> Result<()> {
        if self.failing.contains(package_dir) {
            return Err(ReleaseError::external(
                "registry",
                format!("publish of {} rejected", package_dir.display()),
            ));
        }
        self.published.borrow_mut().push(package_dir.to_path_buf());
        Ok(())
    }
}
