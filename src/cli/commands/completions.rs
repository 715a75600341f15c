use crate::cli::{Cli, Shell};
use clap::CommandFactory;
use clap_complete::{generate, Shell as ClapShell};
use std::io;

const BIN_NAME: &str = "aws-federated-headless-login";

pub fn execute(shell: Shell) {
    let mut cmd = Cli::command();

    let clap_shell = match shell {
        Shell::Bash => ClapShell::Bash,
        Shell::Zsh => ClapShell::Zsh,
        Shell::Fish => ClapShell::Fish,
        Shell::PowerShell => ClapShell::PowerShell,
        Shell::Elvish => ClapShell::Elvish,
    };

    generate(clap_shell, &mut cmd, BIN_NAME, &mut io::stdout());

    match shell {
        Shell::Bash => eprintln!("# Add to ~/.bashrc: eval \"$({} completions bash)\"", BIN_NAME),
        Shell::Zsh => eprintln!("# Add to ~/.zshrc: eval \"$({} completions zsh)\"", BIN_NAME),
        Shell::Fish => eprintln!(
            "# Save to ~/.config/fish/completions/{}.fish",
            BIN_NAME
        ),
        Shell::PowerShell => eprintln!(
            "# Add to PowerShell profile: {} completions powershell | Out-String | Invoke-Expression",
            BIN_NAME
        ),
        Shell::Elvish => eprintln!("# Add to Elvish config: eval ({} completions elvish | slurp)", BIN_NAME),
    }
}
