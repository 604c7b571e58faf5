//! Domain logic - pure business rules independent of git operations

pub mod commit;
pub mod package;
pub mod rule;
pub mod tag;
pub mod version;

pub use commit::{parse_log, CommitRecord, LOG_FORMAT};
pub use package::{discover_packages, Discovery, Package};
pub use rule::{default_rules, RuleMatcher, RuleSet, SemanticChange, SemanticRule};
pub use tag::TagPattern;
pub use version::{next_version, ReleaseType, INITIAL_VERSION};
