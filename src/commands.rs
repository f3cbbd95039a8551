//! Subcommand handlers. All user-facing console output lives here or in
//! the shell editor; modules below only log via `tracing`.

use anyhow::{bail, Context, Result};
use url::Url;

use crate::config::{generate_slug_from_url, ConfigStore, EnvOverrides, Resolver};
use crate::launcher;
use crate::prompt::Prompt;
use crate::shell::{ShellKind, ShellRcEditor};

/// The default flow: resolve credentials and hand off to `claude`.
/// Returns the child's exit code.
pub fn launch(
    store: &ConfigStore,
    profile: Option<&str>,
    claude_args: &[String],
    prompt: &dyn Prompt,
) -> Result<i32> {
    println!(
        "🚀 Starting kimicc v{} - Claude Code with Kimi K2...\n",
        env!("CARGO_PKG_VERSION")
    );

    if !launcher::claude_in_path() && !launcher::install_claude_code() {
        bail!("failed to install Claude Code; please install it manually");
    }

    launcher::update_claude_settings();

    let resolver = Resolver::new(store, EnvOverrides::from_env());
    let Some(api_key) = resolver.api_key(profile, prompt) else {
        bail!("no API key provided");
    };
    let base_url = resolver.base_url(profile);
    let model = resolver.model(profile);
    let auth = resolver.auth_mode(profile);

    let env = launcher::build_child_env(&base_url, &api_key, auth, model.as_deref());

    if let Some(name) = profile {
        println!("📋 Using profile: {name}");
    }
    println!("Launching Claude Code...\n");

    launcher::spawn_claude(claude_args, &env)
}

/// `kimicc reset`: delete the config file after confirmation.
pub fn reset(store: &ConfigStore, prompt: &dyn Prompt) -> Result<()> {
    println!("🗑️  Resetting kimicc configuration...\n");

    if !store.path().exists() {
        println!("No configuration file found at {}", store.path().display());
        return Ok(());
    }

    let confirmed = prompt
        .confirm("Are you sure you want to delete the configuration file?")
        .context("failed to read confirmation")?;
    if !confirmed {
        println!("Reset cancelled.");
        return Ok(());
    }

    store
        .delete_file()
        .context("failed to delete configuration file")?;
    println!("✅ Configuration file deleted successfully.");
    Ok(())
}

/// `kimicc inject [--reset]`: add or remove the env-var block in the
/// shell startup file.
pub fn inject(
    store: &ConfigStore,
    force: bool,
    reset: bool,
    shell: Option<ShellKind>,
    prompt: &dyn Prompt,
) -> Result<()> {
    let shell = shell.unwrap_or_else(ShellKind::detect);

    if reset {
        println!("🗑️  Removing KimiCC environment variables from shell config...\n");
        println!("📋 Detected shell: {shell}");

        let editor = ShellRcEditor::for_shell(shell, prompt);
        let removed = editor
            .remove(force)
            .context("failed to remove environment variables")?;
        if !removed {
            println!("Removal cancelled or no variables found.");
        }
        return Ok(());
    }

    println!("💉 Injecting KimiCC environment variables into shell config...\n");

    let resolver = Resolver::new(store, EnvOverrides::from_env());
    let Some(api_key) = resolver.api_key(None, prompt) else {
        bail!("no API key provided; cannot inject environment variables");
    };

    println!("📋 Detected shell: {shell}");

    let editor = ShellRcEditor::for_shell(shell, prompt);
    let injected = editor
        .inject(&api_key, force)
        .context("failed to inject environment variables")?;
    if !injected {
        println!("Injection cancelled by user.");
    }
    Ok(())
}

/// `kimicc profile list`.
pub fn profile_list(store: &ConfigStore) {
    let profiles = store.list_profiles();

    if profiles.is_empty() {
        println!("📋 No profiles found.");
        println!(
            "💡 Use \"kimicc profile add --slug example https://api.example.com YOUR_API_KEY\" \
             to add a profile."
        );
        return;
    }

    println!("📋 Available profiles:\n");
    for profile in profiles {
        let marker = if profile.is_default { " (default)" } else { "" };
        println!("  {}{marker}", profile.slug);
        println!("    URL: {}", profile.url);
        println!("    Key: {}...", truncate_key(&profile.key));
        if let Some(model) = &profile.model {
            println!("    Model: {model}");
        }
        println!("    Auth: {}", profile.auth.as_str());
        println!();
    }
}

/// `kimicc profile add`.
pub fn profile_add(
    store: &ConfigStore,
    url: &str,
    api_key: &str,
    slug: Option<&str>,
    model: Option<&str>,
    set_default: bool,
    use_auth_token: bool,
    prompt: &dyn Prompt,
) -> Result<()> {
    if Url::parse(url).is_err() {
        bail!("invalid URL provided");
    }

    let slug = match slug {
        Some(slug) => slug.to_string(),
        None => generate_slug_from_url(url)
            .context("could not generate slug from URL; please provide --slug manually")?,
    };

    let config = store.read();
    if let Some(existing) = config.profiles.get(&slug) {
        println!("⚠️  Profile '{slug}' already exists.");
        println!(
            "   Existing: URL={}, Key={}...",
            existing.url,
            truncate_key(&existing.key)
        );
        let overwrite = prompt
            .confirm(&format!("Do you want to overwrite profile '{slug}'?"))
            .context("failed to read confirmation")?;
        if !overwrite {
            println!("Profile addition cancelled.");
            return Ok(());
        }
    }

    let updating = config.profiles.contains_key(&slug);
    store.add_profile(&slug, url, api_key, set_default, model, use_auth_token);

    let verb = if updating { "updated" } else { "added" };
    println!("✅ Profile '{slug}' {verb} successfully.");
    if set_default {
        println!("   Set as default profile.");
    }
    if let Some(model) = model {
        println!("   Model: {model}");
    }
    println!(
        "   Auth mode: {}",
        if use_auth_token { "token" } else { "key" }
    );
    Ok(())
}

/// `kimicc profile del [SLUG | -i]`.
pub fn profile_delete(
    store: &ConfigStore,
    slug: Option<&str>,
    interactive: bool,
    prompt: &dyn Prompt,
) -> Result<()> {
    if interactive {
        return profile_delete_interactive(store, prompt);
    }

    let Some(slug) = slug else {
        bail!(
            "missing profile slug\n\
             💡 Usage: kimicc profile del SLUG\n   \
             kimicc profile del -i          # Interactive deletion"
        );
    };

    if !store.read().profiles.contains_key(slug) {
        bail!("profile '{slug}' not found");
    }

    let confirmed = prompt
        .confirm(&format!("Are you sure you want to delete profile '{slug}'?"))
        .context("failed to read confirmation")?;
    if !confirmed {
        println!("Deletion cancelled.");
        return Ok(());
    }

    if store.delete_profile(slug) {
        println!("✅ Profile '{slug}' deleted successfully.");
    } else {
        println!("❌ Failed to delete profile '{slug}'.");
    }
    Ok(())
}

fn profile_delete_interactive(store: &ConfigStore, prompt: &dyn Prompt) -> Result<()> {
    let profiles = store.list_profiles();

    if profiles.is_empty() {
        println!("📋 No profiles found to delete.");
        return Ok(());
    }

    println!("🗑️  Interactive Profile Deletion\n");
    println!("📋 Available profiles:\n");
    for (index, profile) in profiles.iter().enumerate() {
        let marker = if profile.is_default { " (default)" } else { "" };
        println!("  {}. {}{marker}", index + 1, profile.slug);
        println!("     URL: {}", profile.url);
        println!("     Key: {}...", truncate_key(&profile.key));
        println!("     Auth: {}", profile.auth.as_str());
        println!();
    }

    let answer = prompt
        .input("Enter profile numbers to delete (comma-separated, e.g., 1,3)")
        .context("failed to read selection")?;

    let selected: Vec<&str> = answer
        .split(',')
        .filter_map(|part| part.trim().parse::<usize>().ok())
        .filter_map(|n| n.checked_sub(1))
        .filter_map(|i| profiles.get(i))
        .map(|p| p.slug.as_str())
        .collect();

    if selected.is_empty() {
        println!("No valid profile numbers provided. Deletion cancelled.");
        return Ok(());
    }

    println!("\n📋 Selected profiles to delete: {}", selected.join(", "));
    let confirmed = prompt
        .confirm("Are you sure you want to delete these profiles?")
        .context("failed to read confirmation")?;
    if !confirmed {
        println!("Deletion cancelled.");
        return Ok(());
    }

    let mut deleted = 0;
    for slug in &selected {
        if store.delete_profile(slug) {
            println!("✅ Profile '{slug}' deleted successfully.");
            deleted += 1;
        } else {
            println!("❌ Failed to delete profile '{slug}'.");
        }
    }
    println!("\n🎉 Deleted {deleted} profile(s).");
    Ok(())
}

/// `kimicc profile set-default SLUG`.
pub fn profile_set_default(store: &ConfigStore, slug: &str) -> Result<()> {
    if !store.set_default_profile(slug) {
        bail!("profile '{slug}' not found");
    }
    println!("✅ Set '{slug}' as default profile.");
    Ok(())
}

/// First eight characters of a key, for display.
fn truncate_key(key: &str) -> String {
    key.chars().take(8).collect()
}
