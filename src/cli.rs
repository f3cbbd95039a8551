//! Command-line surface.

use clap::{Parser, Subcommand};

use crate::shell::ShellKind;

/// Run Claude Code against the Kimi K2 API.
#[derive(Debug, Parser)]
#[command(name = "kimicc", version, args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Profile to launch with
    #[arg(short, long)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Arguments forwarded to claude
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub claude_args: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Delete the kimicc configuration file
    Reset,

    /// Inject (or remove) KimiCC environment variables in the shell config
    Inject {
        /// Skip confirmation prompts
        #[arg(short, long)]
        force: bool,

        /// Remove previously injected variables instead
        #[arg(short, long)]
        reset: bool,

        /// Target shell instead of auto-detecting from $SHELL
        #[arg(long, value_enum)]
        shell: Option<ShellKind>,
    },

    /// Manage API profiles
    Profile {
        #[command(subcommand)]
        command: Option<ProfileCommand>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// List all profiles
    List,

    /// Add or update a profile
    Add {
        /// Base URL of the Anthropic-compatible endpoint
        url: String,

        /// API key for the endpoint
        api_key: String,

        /// Profile name (derived from the URL's hostname when omitted)
        #[arg(long)]
        slug: Option<String>,

        /// Model to export when launching with this profile
        #[arg(long)]
        model: Option<String>,

        /// Make this the default profile
        #[arg(long = "default")]
        set_default: bool,

        /// Export the key as ANTHROPIC_AUTH_TOKEN instead of ANTHROPIC_API_KEY
        #[arg(long)]
        use_auth_token: bool,
    },

    /// Delete a profile
    #[command(visible_alias = "delete", alias = "remove")]
    Del {
        /// Profile to delete
        slug: Option<String>,

        /// Pick profiles to delete from a numbered list
        #[arg(short, long)]
        interactive: bool,
    },

    /// Set the default profile
    SetDefault {
        /// Profile to make default
        slug: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn bare_invocation_forwards_args_to_claude() {
        let cli = Cli::parse_from(["kimicc", "--verbose", "chat"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.claude_args, vec!["--verbose", "chat"]);
    }

    #[test]
    fn profile_flag_is_consumed_before_forwarding() {
        let cli = Cli::parse_from(["kimicc", "-p", "work", "--model", "m"]);
        assert_eq!(cli.profile.as_deref(), Some("work"));
        assert_eq!(cli.claude_args, vec!["--model", "m"]);
    }

    #[test]
    fn profile_add_parses_flags() {
        let cli = Cli::parse_from([
            "kimicc",
            "profile",
            "add",
            "--slug",
            "work",
            "--default",
            "--use-auth-token",
            "https://x.test",
            "k1",
        ]);
        let Some(Command::Profile {
            command: Some(ProfileCommand::Add {
                url,
                api_key,
                slug,
                set_default,
                use_auth_token,
                model,
            }),
        }) = cli.command
        else {
            panic!("expected profile add");
        };
        assert_eq!(url, "https://x.test");
        assert_eq!(api_key, "k1");
        assert_eq!(slug.as_deref(), Some("work"));
        assert!(set_default);
        assert!(use_auth_token);
        assert!(model.is_none());
    }

    #[test]
    fn inject_reset_flags() {
        let cli = Cli::parse_from(["kimicc", "inject", "--reset", "-f"]);
        let Some(Command::Inject { force, reset, shell }) = cli.command else {
            panic!("expected inject");
        };
        assert!(force);
        assert!(reset);
        assert!(shell.is_none());
    }
}
