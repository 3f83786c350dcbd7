mod cli;

use std::error::Error as _;
use std::path::Path;
use tfbump::filter::{self, Decision};
use tfbump::spec::UpdateSpec;
use tfbump::update::{RunReport, UpdateOptions, Updater};

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("TFBUMP_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    match run(cli) {
        Ok(report) if report.errors.is_empty() => {}
        Ok(_) => std::process::exit(1),
        Err(e) => {
            for error in e.chain() {
                eprintln!("{error}")
            }
            std::process::exit(1);
        }
    }
}

/// Everything a run needs, taken from the command line or a batch file
struct Plan {
    specs: Vec<UpdateSpec>,
    files: Option<String>,
    force_add: bool,
    batch: bool,
}

fn plan(command: cli::Command) -> anyhow::Result<Plan> {
    let single = |spec| Plan {
        specs: vec![spec],
        files: None,
        force_add: false,
        batch: false,
    };

    Ok(match command {
        cli::Command::Module(module) => {
            if filter::is_local_reference(&module.source) {
                eprintln!(
                    "warning: {} is a local module source, local modules have no version",
                    module.source
                );
            }

            single(
                UpdateSpec::module(module.source, module.target_version)
                    .with_from_versions(module.filters.from)
                    .with_ignore_versions(module.filters.ignore_versions)
                    .with_ignore_names(module.ignore_names),
            )
        }
        cli::Command::Provider(provider) => single(
            UpdateSpec::provider(provider.name, provider.target_version)
                .with_from_versions(provider.filters.from)
                .with_ignore_versions(provider.filters.ignore_versions)
                .with_ignore_names(provider.ignore_names),
        ),
        cli::Command::Terraform(terraform) => single(
            UpdateSpec::terraform(terraform.target_version)
                .with_from_versions(terraform.filters.from)
                .with_ignore_versions(terraform.filters.ignore_versions),
        ),
        cli::Command::Batch(command) => {
            let batch = tfbump::batch::Batch::load(&command.file)?;
            Plan {
                specs: batch.specs,
                files: batch.files,
                force_add: batch.force_add,
                batch: true,
            }
        }
    })
}

pub fn run(cli: cli::Cli) -> anyhow::Result<RunReport> {
    let args = cli.run;
    let plan = plan(cli.command)?;

    let root = std::env::current_dir()?;
    let pattern = args
        .files
        .clone()
        .or(plan.files)
        .unwrap_or_else(|| tfbump::discovery::DEFAULT_PATTERN.to_owned());
    let files = tfbump::discovery::find_files(&root, &pattern)?;

    if files.is_empty() {
        eprintln!("warning: no files match {pattern}");
    }

    let options = UpdateOptions {
        dry_run: args.dry_run,
        force_add: args.force_add || plan.force_add,
    };
    let updater = Updater::new(plan.specs, options);
    let report = updater.update_files(&files);

    for error in &report.errors {
        eprintln!("error: {error}");
        let mut source = error.source();
        while let Some(cause) = source {
            eprintln!("  {cause}");
            source = cause.source();
        }
    }

    match args.format {
        cli::OutputFormat::Text => print_text(&root, &report, &args, plan.batch),
        cli::OutputFormat::Json => {
            serde_json::to_writer_pretty(std::io::stdout(), &summary(&report, &args))?
        }
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), &summary(&report, &args))?,
    }

    Ok(report)
}

#[derive(serde::Serialize)]
struct Summary<'r> {
    dry_run: bool,
    files: &'r [tfbump::update::FileReport],
    errors: Vec<String>,
}

fn summary<'r>(report: &'r RunReport, args: &cli::RunArgs) -> Summary<'r> {
    Summary {
        dry_run: args.dry_run,
        files: &report.files,
        errors: report.errors.iter().map(ToString::to_string).collect(),
    }
}

fn print_text(root: &Path, report: &RunReport, args: &cli::RunArgs, batch: bool) {
    let prefix = if args.dry_run { "[dry-run] " } else { "" };

    for file in &report.files {
        let path = file.path.strip_prefix(root).unwrap_or(file.path.as_path());

        for action in &file.actions {
            println!("{prefix}{}: {action}", path.display());
        }

        for skip in &file.skips {
            if skip.reason == Decision::SkipLocalReference && !batch {
                eprintln!(
                    "warning: {}: {} {} has a local source, skipped",
                    path.display(),
                    skip.kind,
                    skip.name
                );
            } else if args.verbose {
                println!("{prefix}{}: skipped {skip}", path.display());
            }
        }
    }

    let verb = if args.dry_run { "Would update" } else { "Updated" };
    println!(
        "{prefix}{verb} {} version(s) in {} of {} file(s)",
        report.action_count(),
        report.changed_files(),
        report.files.len() + report.errors.len(),
    );
}
