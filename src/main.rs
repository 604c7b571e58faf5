use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use monorel::cli::{build_context, run_release_workflow, Collaborators, ReleaseWorkflowArgs};
use monorel::config::{self, Credentials};
use monorel::git::Git2Repository;
use monorel::hosting::GitHubReleases;
use monorel::registry::NpmRegistry;
use monorel::{ui, ReleaseError};

const EXIT_PACKAGE_FAILED: i32 = 1;
const EXIT_CONFIGURATION: i32 = 2;

#[derive(clap::Parser)]
#[command(
    name = "monorel",
    version,
    about = "Release every changed package of a monorepo from its commit history"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, help = "Preview what would happen without making changes")]
    dry_run: bool,

    #[arg(long, help = "Enable debug logging")]
    debug: bool,

    #[arg(short, long = "package", value_name = "NAME", help = "Only release this package (repeatable)")]
    packages: Vec<String>,

    #[arg(long, value_name = "DIR", help = "Packages directory, relative to the repository root")]
    packages_dir: Option<PathBuf>,
}

impl From<Args> for ReleaseWorkflowArgs {
    fn from(args: Args) -> Self {
        ReleaseWorkflowArgs {
            config_path: args.config,
            dry_run: args.dry_run,
            packages: args.packages,
            packages_dir: args.packages_dir,
        }
    }
}

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("monorel")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

/// Exit with the code matching an error raised before any package ran
fn exit_on_setup_error(err: ReleaseError) -> ! {
    ui::display_error(&err.to_string());
    if err.is_configuration() {
        process::exit(EXIT_CONFIGURATION);
    }
    process::exit(EXIT_PACKAGE_FAILED);
}

fn main() -> Result<()> {
    let args = Args::parse();
    initialize_logger(args.debug)?;
    let args = ReleaseWorkflowArgs::from(args);

    let config = config::load_config(args.config_path.as_deref())
        .unwrap_or_else(|e| exit_on_setup_error(e));

    let credentials = if args.dry_run {
        Credentials::from_env().ok()
    } else {
        Some(Credentials::from_env().unwrap_or_else(|e| exit_on_setup_error(e)))
    };

    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    let repo = Git2Repository::open(&cwd)
        .map(|r| r.with_push_timeout(config.timeouts.command()))
        .unwrap_or_else(|e| exit_on_setup_error(e));
    let repo_root = repo.workdir().unwrap_or_else(|e| exit_on_setup_error(e));

    let registry = NpmRegistry::new(&config.registry, config.timeouts.command());
    let host = GitHubReleases::new(&config.hosting, config.timeouts.http())
        .unwrap_or_else(|e| exit_on_setup_error(e));

    let release_date = Some(chrono::Local::now().date_naive());
    let ctx = build_context(&config, &args, &repo_root, &repo, credentials, release_date)
        .unwrap_or_else(|e| exit_on_setup_error(e));

    if args.dry_run {
        ui::display_status("Dry run: nothing will be written, tagged or published");
    }

    let collaborators = Collaborators {
        vcs: &repo,
        registry: &registry,
        host: &host,
    };
    let summary = run_release_workflow(&ctx, &collaborators)
        .unwrap_or_else(|e| exit_on_setup_error(e));

    ui::display_run_summary(&summary, args.dry_run);

    if summary.has_failures() {
        process::exit(EXIT_PACKAGE_FAILED);
    }
    Ok(())
}
