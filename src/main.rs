use clap::Parser;
use tracing_subscriber::EnvFilter;

use kimicc::cli::{Cli, Command, ProfileCommand};
use kimicc::commands;
use kimicc::config::ConfigStore;
use kimicc::prompt::TerminalPrompt;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .without_time()
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("❌ {err:#}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let store = ConfigStore::open_default();
    let prompt = TerminalPrompt;

    match cli.command {
        None => commands::launch(&store, cli.profile.as_deref(), &cli.claude_args, &prompt),
        Some(Command::Reset) => {
            commands::reset(&store, &prompt)?;
            Ok(0)
        }
        Some(Command::Inject {
            force,
            reset,
            shell,
        }) => {
            commands::inject(&store, force, reset, shell, &prompt)?;
            Ok(0)
        }
        Some(Command::Profile { command }) => {
            match command.unwrap_or(ProfileCommand::List) {
                ProfileCommand::List => commands::profile_list(&store),
                ProfileCommand::Add {
                    url,
                    api_key,
                    slug,
                    model,
                    set_default,
                    use_auth_token,
                } => commands::profile_add(
                    &store,
                    &url,
                    &api_key,
                    slug.as_deref(),
                    model.as_deref(),
                    set_default,
                    use_auth_token,
                    &prompt,
                )?,
                ProfileCommand::Del { slug, interactive } => {
                    commands::profile_delete(&store, slug.as_deref(), interactive, &prompt)?
                }
                ProfileCommand::SetDefault { slug } => {
                    commands::profile_set_default(&store, &slug)?
                }
            }
            Ok(0)
        }
    }
}
