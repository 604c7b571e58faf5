use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde_json::{json, Value};

use crate::boundary::BoundaryWarning;
use crate::domain::tag::TagPattern;
use crate::error::{ReleaseError, Result};

/// A publishable unit discovered under the packages directory
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub name: String,
    /// Directory on disk, used for publishing and manifest I/O
    pub directory: PathBuf,
    /// Same directory relative to the repository root, used for VCS queries
    pub repo_path: PathBuf,
    pub manifest_path: PathBuf,
    pub is_private: bool,
    pub current_version: Option<String>,
    pub last_release_tag: Option<String>,
    pub next_version: Option<semver::Version>,
}

impl Package {
    /// Read a package from its manifest.
    ///
    /// `repo_root` and `packages_dir` locate the package both on disk and
    /// inside the repository.
    pub fn load(repo_root: &Path, packages_dir: &Path, dir_name: &str, manifest: &str) -> Result<Self> {
        let directory = repo_root.join(packages_dir).join(dir_name);
        let manifest_path = directory.join(manifest);
        let doc = read_manifest(&manifest_path)?;

        let name = doc
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| {
                ReleaseError::parse(
                    manifest_path.display().to_string(),
                    "manifest has no \"name\"",
                )
            })?
            .to_string();

        Ok(Package {
            name,
            directory,
            repo_path: packages_dir.join(dir_name),
            manifest_path,
            is_private: doc.get("private").and_then(Value::as_bool).unwrap_or(false),
            current_version: doc
                .get("version")
                .and_then(Value::as_str)
                .map(str::to_string),
            last_release_tag: None,
            next_version: None,
        })
    }

    pub fn tag_pattern(&self) -> TagPattern {
        TagPattern::for_package(&self.name)
    }

    /// Overwrite the manifest's `version`, keeping every other key in place.
    pub fn write_version(&self, version: &semver::Version) -> Result<()> {
        let mut doc = read_manifest(&self.manifest_path)?;
        let object = doc.as_object_mut().ok_or_else(|| {
            ReleaseError::parse(
                self.manifest_path.display().to_string(),
                "manifest is not a JSON object",
            )
        })?;
        object.insert("version".to_string(), json!(version.to_string()));

        let mut formatted = serde_json::to_string_pretty(&doc)?;
        formatted.push('\n');
        fs::write(&self.manifest_path, formatted)?;

        debug!(
            "wrote version {} to {}",
            version,
            self.manifest_path.display()
        );
        Ok(())
    }
}

fn read_manifest(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Result of scanning the packages directory
#[derive(Debug, Default)]
pub struct Discovery {
    pub packages: Vec<Package>,
    pub warnings: Vec<BoundaryWarning>,
}

/// Enumerate top-level directories under `packages_dir` holding a manifest.
///
/// Directories are visited in name order so runs are reproducible.
/// Directories without a manifest, or with an unreadable one, become
/// warnings rather than errors.
pub fn discover_packages(repo_root: &Path, packages_dir: &Path, manifest: &str) -> Result<Discovery> {
    let root = repo_root.join(packages_dir);
    let mut dir_names: Vec<String> = fs::read_dir(&root)
        .map_err(|e| {
            ReleaseError::config(format!(
                "cannot read packages directory {}: {}",
                root.display(),
                e
            ))
        })?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect();
    dir_names.sort();

    let mut discovery = Discovery::default();
    for dir_name in dir_names {
        let manifest_path = root.join(&dir_name).join(manifest);
        if !manifest_path.is_file() {
            discovery.warnings.push(BoundaryWarning::MissingManifest {
                directory: root.join(&dir_name).display().to_string(),
            });
            continue;
        }

        match Package::load(repo_root, packages_dir, &dir_name, manifest) {
            Ok(package) => discovery.packages.push(package),
            Err(e) => discovery.warnings.push(BoundaryWarning::UnreadableManifest {
                path: manifest_path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    Ok(discovery)
}
