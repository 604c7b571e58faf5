//! Main workflow orchestration logic
//!
//! Drives every discovered package through the release pipeline and keeps
//! each package's failure to itself. CLI parsing stays in main.rs; the
//! collaborators are passed in as trait objects so the whole pipeline runs
//! against mocks in tests.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{debug, error, info, warn};

use crate::analyzer::{
    attribute_changes, generate_release_notes, has_package_changed, resolve_severity, NotesInput,
    SeverityScope,
};
use crate::boundary::BoundaryWarning;
use crate::config::{Config, Credentials};
use crate::domain::{discover_packages, next_version, parse_log, Package, ReleaseType, RuleSet};
use crate::error::{ReleaseError, Result};
use crate::git::{CommitRange, Repository};
use crate::hosting::{ReleaseHost, RepoIdentity};
use crate::registry::Registry;

/// Arguments for the release workflow
///
/// Mirrors the CLI Args but in a format suitable for orchestration logic,
/// so the workflow can be driven without clap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleaseWorkflowArgs {
    /// Path to custom config file
    pub config_path: Option<String>,

    /// Preview mode - compute decisions, change nothing
    pub dry_run: bool,

    /// Only evaluate packages with these names (all when empty)
    pub packages: Vec<String>,

    /// Overrides the configured packages directory
    pub packages_dir: Option<PathBuf>,
}

/// External systems the pipeline talks to
pub struct Collaborators<'a> {
    pub vcs: &'a dyn Repository,
    pub registry: &'a dyn Registry,
    pub host: &'a dyn ReleaseHost,
}

/// Immutable inputs shared by every package iteration
#[derive(Debug, Clone)]
pub struct ReleaseContext {
    pub repo_root: PathBuf,
    /// Relative to `repo_root`
    pub packages_dir: PathBuf,
    pub manifest: String,
    pub rules: RuleSet,
    pub severity_scope: SeverityScope,
    pub remote: String,
    pub repo: RepoIdentity,
    /// Required unless `dry_run`
    pub credentials: Option<Credentials>,
    pub release_date: Option<NaiveDate>,
    pub dry_run: bool,
    pub only: Vec<String>,
}

/// Assemble the run context from configuration and CLI arguments.
///
/// The repository identity comes from the configured remote's URL.
pub fn build_context(
    config: &Config,
    args: &ReleaseWorkflowArgs,
    repo_root: &Path,
    vcs: &dyn Repository,
    credentials: Option<Credentials>,
    release_date: Option<NaiveDate>,
) -> Result<ReleaseContext> {
    let rules = config.rule_set()?;
    let remote_url = vcs.remote_url(&config.remote)?;
    let repo = RepoIdentity::from_remote_url(&remote_url)?;

    Ok(ReleaseContext {
        repo_root: repo_root.to_path_buf(),
        packages_dir: args
            .packages_dir
            .clone()
            .unwrap_or_else(|| config.packages_dir.clone()),
        manifest: config.manifest.clone(),
        rules,
        severity_scope: config.severity_scope,
        remote: config.remote.clone(),
        repo,
        credentials,
        release_date,
        dry_run: args.dry_run,
        only: args.packages.clone(),
    })
}

/// Terminal state of one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseState {
    SkippedPrivate,
    NoSemanticChange,
    NoFileChange,
    /// Dry run: would have been released
    Planned,
    Released,
    Failed(String),
}

impl ReleaseState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseState::SkippedPrivate => "skipped-private",
            ReleaseState::NoSemanticChange => "no-semantic-change",
            ReleaseState::NoFileChange => "no-file-change",
            ReleaseState::Planned => "planned",
            ReleaseState::Released => "released",
            ReleaseState::Failed(_) => "failed",
        }
    }
}

/// What would be (or was) released for a package
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseDecision {
    pub package: String,
    pub severity: ReleaseType,
    pub next_version: semver::Version,
    pub tag: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageOutcome {
    pub package: String,
    pub directory: PathBuf,
    pub state: ReleaseState,
    pub decision: Option<ReleaseDecision>,
}

/// Outcome of a whole run, in discovery order
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub outcomes: Vec<PackageOutcome>,
    pub warnings: Vec<BoundaryWarning>,
}

impl RunSummary {
    fn count(&self, pred: impl Fn(&ReleaseState) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.state)).count()
    }

    pub fn released(&self) -> usize {
        self.count(|s| matches!(s, ReleaseState::Released | ReleaseState::Planned))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ReleaseState::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.released() - self.failed()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub fn outcome(&self, package: &str) -> Option<&PackageOutcome> {
        self.outcomes.iter().find(|o| o.package == package)
    }
}

/// Main release workflow
///
/// For each discovered package, in directory-name order:
/// 1. Skip private packages
/// 2. Find the reference tag and the commit range after it
/// 3. Classify the range and resolve the release severity
/// 4. Check the package's own files changed since the tag
/// 5. Compute the next version and release notes
/// 6. Write the manifest, tag, push, create the hosted release, publish
///
/// Failures in steps 2-6 mark that package failed and the loop moves on.
/// Only configuration problems abort the run.
pub fn run_release_workflow(
    ctx: &ReleaseContext,
    collaborators: &Collaborators<'_>,
) -> Result<RunSummary> {
    if !ctx.dry_run && ctx.credentials.is_none() {
        return Err(ReleaseError::config(
            "credentials are required to release (or pass --dry-run)",
        ));
    }

    let discovery = discover_packages(&ctx.repo_root, &ctx.packages_dir, &ctx.manifest)?;
    let mut summary = RunSummary {
        warnings: discovery.warnings,
        ..RunSummary::default()
    };

    for mut package in discovery.packages {
        if !ctx.only.is_empty() && !ctx.only.contains(&package.name) {
            debug!("{} not selected", package.name);
            continue;
        }

        let result = release_package(ctx, collaborators, &mut package, &mut summary.warnings);
        let (state, decision) = match result {
            Ok(reached) => reached,
            Err(e) => {
                error!("{}: {}", package.name, e);
                (ReleaseState::Failed(e.to_string()), None)
            }
        };
        info!("{}: {}", package.name, state.as_str());

        summary.outcomes.push(PackageOutcome {
            package: package.name,
            directory: package.directory,
            state,
            decision,
        });
    }

    Ok(summary)
}

fn release_package(
    ctx: &ReleaseContext,
    collaborators: &Collaborators<'_>,
    package: &mut Package,
    warnings: &mut Vec<BoundaryWarning>,
) -> Result<(ReleaseState, Option<ReleaseDecision>)> {
    if package.is_private {
        return Ok((ReleaseState::SkippedPrivate, None));
    }

    let vcs = collaborators.vcs;
    let tags = vcs.list_tags()?;
    let pattern = package.tag_pattern();
    package.last_release_tag = pattern.latest(&tags).map(str::to_string);
    let prior_tag = package.last_release_tag.as_deref();

    let range = match prior_tag {
        Some(tag) => CommitRange::Since(vcs.resolve_tag(tag)?),
        None => CommitRange::FullHistory,
    };
    debug!("{}: analyzing {}", package.name, range);

    let commits = parse_log(&vcs.commits_in_range(&range)?)?;
    if commits.is_empty() {
        let warning = BoundaryWarning::NoNewCommits {
            package: package.name.clone(),
            reference_tag: package.last_release_tag.clone(),
        };
        warn!("{}", warning);
        warnings.push(warning);
        return Ok((ReleaseState::NoSemanticChange, None));
    }

    let changes = attribute_changes(ctx.rules.classify(&commits), ctx.severity_scope, |hash| {
        vcs.commit_touches_path(hash, &package.repo_path)
    })?;
    let Some(severity) = resolve_severity(&changes) else {
        return Ok((ReleaseState::NoSemanticChange, None));
    };

    if !has_package_changed(vcs, &package.repo_path, prior_tag)? {
        return Ok((ReleaseState::NoFileChange, None));
    }

    let version = next_version(prior_tag, &pattern, severity)?;
    let tag = pattern.format(&version.to_string());
    let notes = generate_release_notes(
        &NotesInput {
            version: &version.to_string(),
            repo_url: &ctx.repo.public_url(),
            prior_tag,
            next_tag: &tag,
            release_date: ctx.release_date,
            changes: &changes,
        },
        &ctx.rules,
    );
    package.next_version = Some(version.clone());

    let decision = ReleaseDecision {
        package: package.name.clone(),
        severity,
        next_version: version,
        tag,
        notes,
    };

    if ctx.dry_run {
        return Ok((ReleaseState::Planned, Some(decision)));
    }

    let credentials = ctx
        .credentials
        .as_ref()
        .ok_or_else(|| ReleaseError::config("credentials are required to release"))?;

    package.write_version(&decision.next_version)?;
    vcs.create_tag(
        &decision.tag,
        &format!("Release {}", decision.tag),
        &credentials.committer,
    )?;
    vcs.push_tag(&ctx.remote, &decision.tag)?;
    collaborators
        .host
        .create_release(&decision.tag, &decision.notes, &ctx.repo, credentials)?;
    collaborators.registry.publish(&package.directory)?;

    Ok((ReleaseState::Released, Some(decision)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Committer;
    use crate::domain::{default_rules, CommitRecord};
    use crate::git::MockRepository;
    use crate::hosting::MockReleaseHost;
    use crate::registry::MockRegistry;
    use secrecy::SecretString;
    use std::fs;
    use tempfile::TempDir;

    fn write_package(root: &Path, dir: &str, manifest: &str) {
        let path = root.join("packages").join(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("package.json"), manifest).unwrap();
    }

    fn context(root: &Path, dry_run: bool) -> ReleaseContext {
        ReleaseContext {
            repo_root: root.to_path_buf(),
            packages_dir: PathBuf::from("packages"),
            manifest: "package.json".to_string(),
            rules: RuleSet::compile(default_rules()).unwrap(),
            severity_scope: SeverityScope::FullRange,
            remote: "origin".to_string(),
            repo: RepoIdentity {
                host: "github.com".to_string(),
                name: "acme/tools".to_string(),
            },
            credentials: Some(Credentials {
                committer: Committer {
                    name: "Release Bot".to_string(),
                    email: "bot@example.com".to_string(),
                },
                token: SecretString::from("t".to_string()),
            }),
            release_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            dry_run,
            only: Vec::new(),
        }
    }

    #[test]
    fn test_release_state_names() {
        assert_eq!(ReleaseState::SkippedPrivate.as_str(), "skipped-private");
        assert_eq!(ReleaseState::Failed("x".to_string()).as_str(), "failed");
    }

    #[test]
    fn test_requires_credentials_unless_dry_run() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("packages")).unwrap();

        let repo = MockRepository::new();
        let registry = MockRegistry::new();
        let host = MockReleaseHost::new();
        let collaborators = Collaborators {
            vcs: &repo,
            registry: &registry,
            host: &host,
        };

        let mut ctx = context(temp.path(), false);
        ctx.credentials = None;
        let err = run_release_workflow(&ctx, &collaborators).unwrap_err();
        assert!(err.is_configuration());

        ctx.dry_run = true;
        assert!(run_release_workflow(&ctx, &collaborators).is_ok());
    }

    #[test]
    fn test_package_filter() {
        let temp = TempDir::new().unwrap();
        write_package(temp.path(), "foo", r#"{"name": "foo", "version": "0.0.0"}"#);
        write_package(temp.path(), "bar", r#"{"name": "bar", "version": "0.0.0"}"#);

        let mut repo = MockRepository::new();
        repo.add_commit(
            &CommitRange::FullHistory,
            CommitRecord::new("feat: x", "", "1111111", "1111111aaaa"),
            &["packages/foo/index.js"],
        );
        let registry = MockRegistry::new();
        let host = MockReleaseHost::new();
        let collaborators = Collaborators {
            vcs: &repo,
            registry: &registry,
            host: &host,
        };

        let mut ctx = context(temp.path(), true);
        ctx.only = vec!["foo".to_string()];
        let summary = run_release_workflow(&ctx, &collaborators).unwrap();

        assert_eq!(summary.outcomes.len(), 1);
        assert_eq!(summary.outcomes[0].package, "foo");
        assert_eq!(summary.outcomes[0].state, ReleaseState::Planned);
    }

    #[test]
    fn test_empty_range_warns() {
        let temp = TempDir::new().unwrap();
        write_package(temp.path(), "foo", r#"{"name": "foo", "version": "1.0.0"}"#);

        let mut repo = MockRepository::new();
        repo.add_tag("foo-v1.0.0", "aaa");
        let registry = MockRegistry::new();
        let host = MockReleaseHost::new();
        let collaborators = Collaborators {
            vcs: &repo,
            registry: &registry,
            host: &host,
        };

        let summary = run_release_workflow(&context(temp.path(), false), &collaborators).unwrap();

        assert_eq!(summary.outcomes[0].state, ReleaseState::NoSemanticChange);
        assert_eq!(
            summary.warnings,
            vec![BoundaryWarning::NoNewCommits {
                package: "foo".to_string(),
                reference_tag: Some("foo-v1.0.0".to_string()),
            }]
        );
    }

    #[test]
    fn test_tag_listing_failure_fails_each_package() {
        let temp = TempDir::new().unwrap();
        write_package(temp.path(), "bar", r#"{"name": "bar", "version": "0.0.0"}"#);
        write_package(
            temp.path(),
            "baz",
            r#"{"name": "baz", "version": "0.0.0", "private": true}"#,
        );
        write_package(temp.path(), "foo", r#"{"name": "foo", "version": "0.0.0"}"#);

        let mut repo = MockRepository::new();
        repo.fail_tag_listing();
        let registry = MockRegistry::new();
        let host = MockReleaseHost::new();
        let collaborators = Collaborators {
            vcs: &repo,
            registry: &registry,
            host: &host,
        };

        let summary = run_release_workflow(&context(temp.path(), false), &collaborators).unwrap();

        let states: Vec<&str> = summary.outcomes.iter().map(|o| o.state.as_str()).collect();
        assert_eq!(states, vec!["failed", "skipped-private", "failed"]);
        assert_eq!(summary.failed(), 2);
        assert!(repo.created_tags().is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let outcome = |name: &str, state: ReleaseState| PackageOutcome {
            package: name.to_string(),
            directory: PathBuf::from(name),
            state,
            decision: None,
        };
        let summary = RunSummary {
            outcomes: vec![
                outcome("a", ReleaseState::Released),
                outcome("b", ReleaseState::Failed("boom".to_string())),
                outcome("c", ReleaseState::NoFileChange),
                outcome("d", ReleaseState::SkippedPrivate),
            ],
            warnings: Vec::new(),
        };

        assert_eq!(summary.released(), 1);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.skipped(), 2);
        assert!(summary.has_failures());
        assert!(summary.outcome("c").is_some());
    }
}
