use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::bootstrap::BootstrapConfig;
use crate::command_line::Verbosity;
use crate::error::EnsurepipError;
use crate::uninstall::UninstallConfig;

#[derive(Parser, Debug)]
#[command(name = "ensurepip")]
#[command(about, long_about = None)]
#[command(disable_version_flag = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Print the bundled pip version
    #[arg(short = 'V', long = "version")]
    pub version: bool,

    /// Python interpreter to install into (overrides the configured one)
    #[arg(long, global = true, env = "ENSUREPIP_PYTHON")]
    pub python: Option<String>,

    /// Directory containing the bundled wheels
    #[arg(long, global = true, env = "ENSUREPIP_BUNDLE_DIR")]
    pub bundle_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install the bundled setuptools and pip
    Install(InstallArgs),

    /// Uninstall pip and setuptools
    Uninstall(UninstallArgs),

    /// Show the version of the bundled pip
    Version,

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Args, Debug, Default)]
pub struct InstallArgs {
    /// Install relative to this alternate root directory
    #[arg(long, value_name = "DIR")]
    pub root: Option<String>,

    /// Install using the user scheme
    #[arg(long)]
    pub user: bool,

    /// Upgrade pip and dependencies, even if already installed
    #[arg(short = 'U', long)]
    pub upgrade: bool,

    /// Make an alternate install, installing only the X.Y versioned scripts
    #[arg(long)]
    pub altinstall: bool,

    /// Make a default pip install, installing the unqualified pip script
    #[arg(long)]
    pub default_pip: bool,

    /// Give more output to pip (repeat up to 3 times)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl InstallArgs {
    pub fn to_config(&self) -> Result<BootstrapConfig, EnsurepipError> {
        Ok(BootstrapConfig {
            root: self.root.clone(),
            upgrade: self.upgrade,
            user: self.user,
            altinstall: self.altinstall,
            default_pip: self.default_pip,
            verbosity: Verbosity::new(self.verbose)?,
        })
    }
}

#[derive(Args, Debug, Default)]
pub struct UninstallArgs {
    /// Give more output to pip (repeat up to 3 times)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl UninstallArgs {
    pub fn to_config(&self) -> Result<UninstallConfig, EnsurepipError> {
        Ok(UninstallConfig {
            verbosity: Verbosity::new(self.verbose)?,
        })
    }
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(ValueEnum, Clone, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell
    Elvish,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key (python, bundle_dir, log_level)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },

    /// List all configuration values
    List,

    /// Reset configuration to defaults
    Reset,

    /// Show configuration file path
    Path,
}
