use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{ReleaseType, SemanticChange};
use crate::error::Result;

/// Which commits of the shared log count toward a package's release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeverityScope {
    /// Every matching commit in the range counts, whatever files it touched
    #[default]
    FullRange,
    /// Only commits touching the package's own directory count
    PackagePaths,
}

/// Reduce changes to one release severity.
///
/// Scans tiers in [`ReleaseType::PRIORITY`] order and stops at the first
/// tier with a member: one breaking change forces a major release no
/// matter how many patch-level changes sit beside it.
pub fn resolve_severity(changes: &[SemanticChange]) -> Option<ReleaseType> {
    ReleaseType::PRIORITY
        .into_iter()
        .find(|tier| changes.iter().any(|c| c.release_type == *tier))
}

/// Filter changes according to `scope`.
///
/// `touches_package` answers whether the commit with the given full hash
/// touched the package; it is asked at most once per commit.
pub fn attribute_changes<F>(
    changes: Vec<SemanticChange>,
    scope: SeverityScope,
    mut touches_package: F,
) -> Result<Vec<SemanticChange>>
where
    F: FnMut(&str) -> Result<bool>,
{
    if scope == SeverityScope::FullRange {
        return Ok(changes);
    }

    let mut answers: HashMap<String, bool> = HashMap::new();
    let mut kept = Vec::with_capacity(changes.len());
    for change in changes {
        let touches = match answers.get(&change.full_hash) {
            Some(answer) => *answer,
            None => {
                let answer = touches_package(&change.full_hash)?;
                answers.insert(change.full_hash.clone(), answer);
                answer
            }
        };
        if touches {
            kept.push(change);
        }
    }
    Ok(kept)
}
