//! Analysis engine: severity, change detection and release notes

pub mod gate;
pub mod notes;
pub mod severity;

pub use gate::has_package_changed;
pub use notes::{generate_release_notes, NotesInput};
pub use severity::{attribute_changes, resolve_severity, SeverityScope};
