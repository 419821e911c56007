//! envinject Android CLI
//!
//! Injects `.env` credentials into Android string resources and runs Gradle
//! builds with the injection wired in as a pre-build step.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use envinject_android::check;
use envinject_android::env_file::EnvProperties;
use envinject_android::gradle;
use envinject_android::injector::{self, InjectorSettings, ReplaceStringsStep, WriteMode};
use envinject_android::pipeline::BuildPipeline;
use envinject_cli::output::{mask_secret, Status};
use envinject_cli::progress;
use envinject_core::config::{Config, EscapeMode};
use envinject_core::error::exit_codes;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "envinject-android")]
#[command(about = "Inject .env credentials into Android resources before Gradle builds")]
#[command(version)]
struct Cli {
    /// Android project directory; paths in the config file are relative to it
    #[arg(short = 'C', long, global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace resource placeholders with values from the env file
    Inject {
        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,
        /// Env file, relative to the current directory (overrides config)
        #[arg(long)]
        env_file: Option<PathBuf>,
        /// Resource file to write, relative to the current directory (overrides config)
        #[arg(long)]
        resource: Option<PathBuf>,
        /// Template to read instead of the resource, relative to the current
        /// directory (overrides config)
        #[arg(long)]
        template: Option<PathBuf>,
        /// Value escaping (overrides config)
        #[arg(long, value_enum)]
        escape: Option<EscapeArg>,
    },

    /// Report placeholders still present in the resource
    Check {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show resolved paths and which credentials the env file defines
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inject credentials, then run a Gradle task
    Build {
        /// Gradle task (overrides config)
        #[arg(long)]
        task: Option<String>,
        /// Stream Gradle output instead of showing a spinner
        #[arg(long)]
        stream: bool,
    },
}

impl Commands {
    fn wants_json(&self) -> bool {
        matches!(
            self,
            Commands::Check { json: true } | Commands::Status { json: true }
        )
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum EscapeArg {
    None,
    Android,
}

impl From<EscapeArg> for EscapeMode {
    fn from(arg: EscapeArg) -> Self {
        match arg {
            EscapeArg::None => EscapeMode::None,
            EscapeArg::Android => EscapeMode::Android,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }
    Status::set_quiet(cli.quiet);
    init_tracing(cli.verbose);

    let json = cli.command.wants_json();
    let exit_code = match dispatch(cli) {
        Ok(code) => code,
        Err(err) => report_error(&err, json),
    };

    std::process::exit(exit_code);
}

fn init_tracing(verbose: u8) {
    if verbose == 0 {
        return;
    }
    let level = if verbose > 1 { "trace" } else { "debug" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "envinject_core={level},envinject_android={level}"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn report_error(err: &anyhow::Error, json: bool) -> i32 {
    if let Some(core) = err.downcast_ref::<envinject_core::Error>() {
        if json {
            if let Ok(report) = serde_json::to_string_pretty(&core.to_report()) {
                println!("{report}");
            }
        }
        Status::error(&core.to_string());
        core.exit_code()
    } else {
        Status::error(&format!("{err:#}"));
        exit_codes::FAILURE
    }
}

fn dispatch(cli: Cli) -> Result<i32> {
    let config = Config::load(&cli.project_dir, cli.config.as_deref())?;
    if let Some(path) = &config.path {
        tracing::debug!(path = %path.display(), "using config file");
    }
    let settings = InjectorSettings::from_config(&cli.project_dir, &config.schema);

    match cli.command {
        Commands::Inject {
            dry_run,
            env_file,
            resource,
            template,
            escape,
        } => {
            let mut settings = settings;
            if let Some(path) = env_file {
                settings.env_path = path;
            }
            if let Some(path) = resource {
                settings.resource_path = path;
            }
            if template.is_some() {
                settings.template_path = template;
            }
            if let Some(escape) = escape {
                settings.escape = escape.into();
            }
            run_inject(&settings, dry_run)
        }
        Commands::Check { json } => run_check(&settings, json),
        Commands::Status { json } => run_status(&settings, &config, json),
        Commands::Build { task, stream } => {
            let task = task.unwrap_or_else(|| config.schema.build.task.clone());
            run_build(&cli.project_dir, settings, &task, stream, cli.quiet)
        }
    }
}

fn run_inject(settings: &InjectorSettings, dry_run: bool) -> Result<i32> {
    let env = EnvProperties::load(&settings.env_path)?;
    let mode = if dry_run {
        WriteMode::DryRun
    } else {
        WriteMode::Write
    };

    let report = injector::inject(settings, &env, mode)?;
    injector::print_report(&report);

    if dry_run {
        if report.changed {
            Status::info(&format!(
                "Dry run: {} would be rewritten",
                report.resource_path.display()
            ));
        } else {
            Status::info("Dry run: resource is already up to date");
        }
    }

    Ok(exit_codes::SUCCESS)
}

fn run_check(settings: &InjectorSettings, json: bool) -> Result<i32> {
    let report = check::check_resource(settings)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        check::print_results(&report);
    }

    Ok(report.exit_code())
}

#[derive(Serialize)]
struct StatusReport {
    config_path: Option<PathBuf>,
    env_path: PathBuf,
    env_found: bool,
    resource_path: PathBuf,
    resource_found: bool,
    template_path: Option<PathBuf>,
    escape: EscapeMode,
    credentials: Vec<CredentialStatus>,
}

#[derive(Serialize)]
struct CredentialStatus {
    key: String,
    token: String,
    masked_value: Option<String>,
}

fn run_status(settings: &InjectorSettings, config: &Config, json: bool) -> Result<i32> {
    let env = EnvProperties::load(&settings.env_path)?;

    let report = StatusReport {
        config_path: config.path.clone(),
        env_path: settings.env_path.clone(),
        env_found: env.source().is_some(),
        resource_path: settings.resource_path.clone(),
        resource_found: settings.resource_path.is_file(),
        template_path: settings.template_path.clone(),
        escape: settings.escape,
        credentials: settings
            .placeholders
            .iter()
            .map(|p| CredentialStatus {
                key: p.key().to_string(),
                token: p.token().to_string(),
                masked_value: env.get(p.key()).map(mask_secret),
            })
            .collect(),
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize status")?
        );
        return Ok(exit_codes::SUCCESS);
    }

    Status::header("envinject status");
    match &report.config_path {
        Some(path) => Status::info(&format!("Config: {}", path.display())),
        None => Status::info("Config: defaults"),
    }
    if report.env_found {
        Status::success(&format!("Env file: {}", report.env_path.display()));
    } else {
        Status::warning(&format!("Env file missing: {}", report.env_path.display()));
    }
    if report.resource_found {
        Status::success(&format!("Resource: {}", report.resource_path.display()));
    } else {
        Status::error(&format!("Resource missing: {}", report.resource_path.display()));
    }
    if let Some(template) = &report.template_path {
        Status::info(&format!("Template: {}", template.display()));
    }

    for credential in &report.credentials {
        match &credential.masked_value {
            Some(masked) => Status::success(&format!("{} = {}", credential.key, masked)),
            None => Status::warning(&format!("{} not set", credential.key)),
        }
    }

    Ok(exit_codes::SUCCESS)
}

fn run_build(
    project_dir: &Path,
    settings: InjectorSettings,
    task: &str,
    stream: bool,
    quiet: bool,
) -> Result<i32> {
    let mut pipeline = BuildPipeline::new();
    pipeline.register(ReplaceStringsStep::new(settings))?;

    Status::step(1, 2, "Running pre-build steps");
    pipeline.run_then(|| {
        Status::step(2, 2, &format!("Running Gradle task {task}"));
        if stream {
            return gradle::run_task_streaming(project_dir, task);
        }

        let pb = progress::spinner(&format!("./gradlew {task}"), !quiet);
        match gradle::run_task_checked(project_dir, task) {
            Ok(_) => {
                progress::finish_success(&pb, &format!("{task} finished"));
                Ok(())
            }
            Err(err) => {
                progress::finish_error(&pb, &format!("{task} failed"));
                Err(err)
            }
        }
    })?;

    Status::success("Build succeeded");
    Ok(exit_codes::SUCCESS)
}
