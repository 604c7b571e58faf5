//! User interface module
//!
//! Output only: a release run is non-interactive.

pub mod formatter;

pub use formatter::{
    display_boundary_warning, display_error, display_package_outcome, display_release_notes,
    display_run_summary, display_status, display_success, format_outcome, format_run_totals,
};
