// CLI interface
pub mod commands;

use crate::config::{Config, BROWSER_ENV, COOKIE_FILE_ENV};
use crate::error::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "aws-federated-headless-login")]
#[command(
    about = "Complete `aws sso login` device sign-in in a headless browser",
    long_about = "Reads the output of `aws sso login --no-browser` from stdin, opens the \
                  device authorization URL in Chromium and approves the request.\n\n\
                  Example:\n  aws sso login --no-browser | aws-federated-headless-login"
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Show the browser (disable headless mode)
    #[arg(long)]
    pub show: bool,

    /// Chromium executable to launch
    #[arg(long, env = BROWSER_ENV)]
    pub browser: Option<PathBuf>,

    /// Where the session cookie is kept
    #[arg(long, env = COOKIE_FILE_ENV)]
    pub cookie_file: Option<PathBuf>,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show whether a session cookie is saved and when it expires
    Status {
        /// Output in JSON format for scripting
        #[arg(long)]
        json: bool,
    },

    /// Forget the saved session cookie
    Logout,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a commented sample config file
    Init,
    /// Print the config file location
    Path,
}

#[derive(Debug, Clone, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

impl Cli {
    /// Fold command-line overrides into the loaded configuration
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(browser) = &self.browser {
            config.browser.executable = Some(browser.clone());
        }
        if let Some(cookie_file) = &self.cookie_file {
            config.store.cookie_file = Some(cookie_file.clone());
        }
    }
}

/// Run the selected command and return the process exit code
pub async fn execute(args: Cli) -> Result<i32> {
    match args.command {
        Some(Commands::Status { json }) => {
            let config = load_config(&args)?;
            Ok(commands::status::execute(&config, json))
        }
        Some(Commands::Logout) => {
            let config = load_config(&args)?;
            commands::logout::execute(&config)?;
            Ok(0)
        }
        Some(Commands::Config { command }) => {
            commands::config::execute(command)?;
            Ok(0)
        }
        Some(Commands::Completions { shell }) => {
            commands::completions::execute(shell);
            Ok(0)
        }
        None => Ok(commands::login::execute(load_config(&args), args.show).await),
    }
}

fn load_config(args: &Cli) -> Result<Config> {
    let mut config = Config::load()?;
    args.apply_to(&mut config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_run_is_headless_login() {
        let cli = Cli::try_parse_from(["aws-federated-headless-login"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.show);
    }

    #[test]
    fn test_show_flag() {
        let cli = Cli::try_parse_from(["aws-federated-headless-login", "--show"]).unwrap();
        assert!(cli.show);
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "aws-federated-headless-login",
            "--browser",
            "/opt/chromium/chrome",
            "--cookie-file",
            "/tmp/cookie",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.apply_to(&mut config);
        assert_eq!(
            config.browser.executable,
            Some(PathBuf::from("/opt/chromium/chrome"))
        );
        assert_eq!(config.store.cookie_file, Some(PathBuf::from("/tmp/cookie")));
    }

    #[test]
    fn test_status_subcommand() {
        let cli = Cli::try_parse_from(["aws-federated-headless-login", "status", "--json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Status { json: true })));
    }
}
