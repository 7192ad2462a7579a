mod cli;

use confargs::handler::{CallSite, Directive, HandlerResult};
use confargs::source::FsSources;
use confargs::{ArgumentList, BuildConfig, Grammar};

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("CONFARGS_LOG"))
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

    let command_result = match cli.command {
        cli::Command::Build(build_cli) => build(build_cli),
        cli::Command::Dev(dev_cli) => dev(dev_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn build(cli: cli::BuildCommand) -> anyhow::Result<()> {
    let grammar = Grammar::load_file(&cli.grammar.file)?;

    let mut include = |argument: &str, site: &CallSite| -> HandlerResult {
        if site.property.eq_ignore_ascii_case("include") {
            Ok(Directive::Include(argument.to_string()))
        } else {
            Err(format!("Unsupported directive {}", site.property).into())
        }
    };

    let config = BuildConfig::default()
        .strict(cli.strict || grammar.strict)
        .max_include_depth(cli.max_include_depth)
        .with_handler(&mut include);

    let args = confargs::build_command_line(
        &cli.config.to_string_lossy(),
        Some(config),
        &grammar.entries,
        &cli.app_name,
        &FsSources,
    )?;

    output(&cli.output, &args)?;
    args.release();
    Ok(())
}

fn output(output: &cli::OutputArgs, args: &ArgumentList) -> anyhow::Result<()> {
    match output.format {
        cli::OutputFormat::Lines => {
            for arg in args {
                println!("{arg}");
            }
        }
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), args)?,
        cli::OutputFormat::Json => serde_json::to_writer_pretty(std::io::stdout(), args)?,
    };

    Ok(())
}

/// (confargs-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(cli: cli::DevCommand) -> anyhow::Result<()> {
    use cli::DevSubCommand::*;

    match cli.command {
        Patterns(grammar_args) => {
            let grammar = Grammar::load_file(&grammar_args.file)?;
            for (index, entry) in grammar.entries.iter().enumerate() {
                let pattern = confargs::pattern::compile(&entry.pattern, index)?;
                println!("{pattern:#?}");
            }
        }
    }

    Ok(())
}
