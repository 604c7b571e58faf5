//! Package registry collaborator

pub mod mock;
pub mod npm;

pub use mock::MockRegistry;
pub use npm::NpmRegistry;

use std::path::Path;

use crate::error::Result;

/// Publishes a package directory to a registry
pub trait Registry {
    fn publish(&self, package_dir: &Path) -> Result<()>;
}
