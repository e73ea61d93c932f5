//! Shell completion generation

use clap::CommandFactory;
use clap_complete::{Generator, Shell};

use super::Cli;
use crate::exit_code::ExitCode;

/// Arguments for the completions command
#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Print the completion script for `args.shell` to stdout
pub fn execute(args: CompletionsArgs) -> ExitCode {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, &mut std::io::stdout());
    ExitCode::Success
}

fn generate<G: Generator>(generator: G, cmd: &mut clap::Command, out: &mut dyn std::io::Write) {
    let name = cmd.get_name().to_string();
    clap_complete::generate(generator, cmd, name, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(shell: Shell) -> String {
        let mut buf = Vec::new();
        generate(shell, &mut Cli::command(), &mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_bash_script_names_binary_and_commands() {
        let output = script(Shell::Bash);
        assert!(output.contains("fc"));
        assert!(output.contains("complete"));
        assert!(output.contains("dataset"));
    }

    #[test]
    fn test_zsh_script() {
        assert!(script(Shell::Zsh).contains("compdef"));
    }

    #[test]
    fn test_powershell_script() {
        assert!(script(Shell::PowerShell).contains("Register-ArgumentCompleter"));
    }
}
