//! tfbump cli interface

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; tfbump ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[clap(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Files to update, as glob relative to the work directory
    ///
    /// `*` stays within a directory, `**` matches any number of directories.
    /// Defaults to `**/*.tf`, or to the `files` entry of a batch file.
    #[clap(short = 'f', long = "files", global(true))]
    pub files: Option<String>,

    /// Report what would change without writing any file
    #[clap(short = 'n', long = "dry-run", global(true))]
    pub dry_run: bool,

    /// Add a version to matching blocks that have none
    #[clap(long = "force-add", global(true))]
    pub force_add: bool,

    /// Also report blocks that matched but were skipped
    #[clap(short = 'v', long = "verbose", global(true))]
    pub verbose: bool,

    #[arg(short = 'F', long = "output-format", global(true), default_value_t)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Update the version of modules with the given source
    Module(ModuleCommand),

    /// Update the version of a provider in required_providers
    ///
    /// The provider is matched by its key (`aws`) or its source (`hashicorp/aws`)
    Provider(ProviderCommand),

    /// Update the required_version of terraform blocks
    #[command(alias = "tf")]
    Terraform(TerraformCommand),

    /// Apply all updates listed in a YAML batch file
    Batch(BatchCommand),
}

#[derive(Parser, Debug)]
pub struct ModuleCommand {
    /// Module source, for example `terraform-aws-modules/vpc/aws`
    pub source: String,

    /// Version to set
    #[arg(value_name = "VERSION")]
    pub target_version: String,

    #[clap(flatten)]
    pub filters: FilterArgs,

    /// Skip modules whose name matches this pattern (`*` is a wildcard)
    #[clap(long = "ignore-name")]
    pub ignore_names: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct ProviderCommand {
    /// Provider name or source
    pub name: String,

    /// Version to set
    #[arg(value_name = "VERSION")]
    pub target_version: String,

    #[clap(flatten)]
    pub filters: FilterArgs,

    /// Skip providers whose name matches this pattern (`*` is a wildcard)
    #[clap(long = "ignore-name")]
    pub ignore_names: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct TerraformCommand {
    /// Version constraint to set
    #[arg(value_name = "VERSION")]
    pub target_version: String,

    #[clap(flatten)]
    pub filters: FilterArgs,
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Only update blocks currently at this version (repeatable)
    #[clap(long = "from")]
    pub from: Vec<String>,

    /// Never update blocks currently at this version (repeatable)
    #[clap(long = "ignore-version")]
    pub ignore_versions: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct BatchCommand {
    /// YAML file listing the updates
    pub file: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Default, Debug)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}
