use std::fmt;

/// Non-fatal conditions met while scanning the repository.
/// These are reported to the user and never stop a run.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// Directory under the packages root without a manifest
    MissingManifest { directory: String },
    /// Manifest that could not be read or lacks a name
    UnreadableManifest { path: String, reason: String },
    /// Commit range for a package contained no commits at all
    NoNewCommits {
        package: String,
        reference_tag: Option<String>,
    },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::MissingManifest { directory } => {
                write!(f, "Skipping '{}': no package manifest", directory)
            }
            BoundaryWarning::UnreadableManifest { path, reason } => {
                write!(f, "Skipping manifest '{}': {}", path, reason)
            }
            BoundaryWarning::NoNewCommits {
                package,
                reference_tag,
            } => match reference_tag {
                Some(tag) => write!(f, "No new commits for '{}' since tag '{}'", package, tag),
                None => write!(f, "No commits found for '{}'", package),
            },
        }
    }
}
