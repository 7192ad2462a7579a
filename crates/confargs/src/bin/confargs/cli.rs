//! confargs cli interface

use clap::{Parser, Subcommand, ValueEnum};
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
    /// This is equivalent to running { cd <directory>; confargs ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Translate a configuration file into command line arguments
    Build(BuildCommand),

    /// Print debug information for development
    Dev(DevCommand),
}

#[derive(Parser, Debug)]
pub struct BuildCommand {
    #[clap(flatten)]
    pub grammar: GrammarArgs,

    #[clap(flatten)]
    pub output: OutputArgs,

    /// Program name used as the first argument
    #[arg(short = 'n', long = "app-name", default_value = "confargs")]
    pub app_name: String,

    /// Fail on lines that match no entry
    #[arg(short = 's', long)]
    pub strict: bool,

    /// How deep includes may nest
    #[arg(long, default_value_t = confargs::driver::DEFAULT_MAX_INCLUDE_DEPTH)]
    pub max_include_depth: usize,

    /// Configuration file to translate
    pub config: PathBuf,
}

#[derive(Parser, Debug)]
pub struct GrammarArgs {
    /// Grammar file (yaml) with the entry table
    #[clap(short = 'g', long = "grammar")]
    pub file: PathBuf,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    /// one argument per line
    #[default]
    Lines,
    Json,
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Lines => f.write_str("lines"),
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

#[derive(Parser, Debug)]
pub struct DevCommand {
    #[command(subcommand)]
    pub command: DevSubCommand,
}

#[derive(Subcommand, Debug)]
pub enum DevSubCommand {
    /// Show the compiled patterns of a grammar
    Patterns(GrammarArgs),
}
