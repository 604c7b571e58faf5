use std::path::Path;

use log::debug;

use crate::error::Result;
use crate::git::Repository;

/// Whether a package's own files changed since its reference tag.
///
/// The commit log is shared by every package in the repository, so a
/// semantic change alone is not enough to release: this gate checks the
/// package directory itself. Without a reference tag it is trivially open.
pub fn has_package_changed<R: Repository + ?Sized>(
    repo: &R,
    package_path: &Path,
    reference_tag: Option<&str>,
) -> Result<bool> {
    let Some(tag) = reference_tag else {
        return Ok(true);
    };

    let changed = repo.has_changed_since(package_path, tag)?;
    debug!(
        "{} {} since {}",
        package_path.display(),
        if changed { "changed" } else { "unchanged" },
        tag
    );
    Ok(changed)
}
