pub mod orchestration;

pub use orchestration::{
    build_context, run_release_workflow, Collaborators, PackageOutcome, ReleaseContext,
    ReleaseDecision, ReleaseState, ReleaseWorkflowArgs, RunSummary,
};
