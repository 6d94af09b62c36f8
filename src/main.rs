mod bootstrap;
mod bundle;
mod cli;
mod command_line;
mod config;
mod error;
mod logging;
mod probe;
mod runner;
mod uninstall;
#[cfg(test)]
mod test_support;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell as CompletionShell};
use tracing::debug;

use crate::bootstrap::Bootstrapper;
use crate::bundle::BundledWheels;
use crate::cli::{Cli, Command, ConfigAction, Shell};
use crate::config::Config;
use crate::error::EnsurepipError;
use crate::probe::PythonPipProbe;
use crate::runner::{resolve_interpreter, PythonPipRunner};
use crate::uninstall::Uninstaller;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // A broken config still gets default logging; install and uninstall
    // refuse to run on it below.
    let loaded = Config::load();
    match &loaded {
        Ok(config) => logging::setup_logging(&config.log_level),
        Err(_) => logging::setup_logging(&Config::default().log_level),
    }

    match run(loaded, cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:?}");
            exit_code_for(&e)
        }
    }
}

fn run(loaded: Result<Config>, cli: Cli) -> Result<ExitCode> {
    if cli.version {
        println!("pip {}", bundle::version());
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(ExitCode::from(2));
    };

    match command {
        Command::Install(args) => {
            let bootstrap = args.to_config()?;
            // Reject conflicting modes before touching the interpreter
            bootstrap.validate()?;

            let config = loaded.context("refusing to install with an unreadable config")?;
            let python = python_for(&config, cli.python.as_deref())?;
            let bundle = BundledWheels::new(bundle_dir_for(&config, cli.bundle_dir)?);
            debug!(python = %python.display(), bundle = %bundle.dir().display(), "bootstrapping");

            let runner = PythonPipRunner::new(python);
            Bootstrapper::new(&runner, &bundle).bootstrap(&bootstrap)?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Uninstall(args) => {
            let config = loaded.context("refusing to uninstall with an unreadable config")?;
            let python = python_for(&config, cli.python.as_deref())?;
            let runner = PythonPipRunner::new(&python);
            let probe = PythonPipProbe::new(&python);
            Uninstaller::new(&runner, &probe).uninstall(&args.to_config()?)?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Version => {
            println!("pip {}", bundle::version());
            Ok(ExitCode::SUCCESS)
        }

        Command::Config(args) => {
            handle_config(args)?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Completions(args) => {
            generate_completions(args.shell);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn python_for(config: &Config, flag: Option<&str>) -> Result<PathBuf, EnsurepipError> {
    let configured = flag.unwrap_or(config.paths.python.as_str());
    Ok(resolve_interpreter(configured, &["python3", "python"])?)
}

fn bundle_dir_for(config: &Config, flag: Option<PathBuf>) -> Result<PathBuf> {
    match flag {
        Some(dir) => Ok(dir),
        None => config.bundle_dir(),
    }
}

/// A failing pip hands its own exit status through.
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<EnsurepipError>() {
        Some(EnsurepipError::Delegated(runner)) => runner.exit_code(),
        _ => ExitCode::from(1),
    }
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };
    generate(shell, &mut cmd, "ensurepip", &mut io::stdout());
}

fn handle_config(args: cli::ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    anyhow::bail!("unknown config key: {key}");
                }
            }
        }

        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            if config.set(&key, &value)? {
                config.save()?;
                println!("{key} = {value}");
            } else {
                anyhow::bail!("unknown config key: {key}");
            }
        }

        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.list() {
                println!("{key} = {value}");
            }
        }

        ConfigAction::Reset => {
            Config::reset()?;
            println!("configuration reset to defaults");
        }

        ConfigAction::Path => {
            let path = config::config_path()?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
