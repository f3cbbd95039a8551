//! Locating, configuring and spawning the Claude Code executable.

use std::process::Command;

use anyhow::{Context, Result};
use tracing::warn;

use crate::config::resolve::{
    ANTHROPIC_API_KEY_VAR, ANTHROPIC_BASE_URL_VAR, ANTHROPIC_MODEL_VAR,
};
use crate::config::types::AuthMode;

/// Credential variable used in token mode.
pub const ANTHROPIC_AUTH_TOKEN_VAR: &str = "ANTHROPIC_AUTH_TOKEN";
/// Claude Code also reads a "small/fast model" variable; we mirror the
/// configured model into it.
pub const ANTHROPIC_SMALL_FAST_MODEL_VAR: &str = "ANTHROPIC_SMALL_FAST_MODEL";

/// Is the `claude` executable reachable via PATH?
pub fn claude_in_path() -> bool {
    which::which("claude").is_ok()
}

/// Install Claude Code globally via npm, with inherited stdio so the user
/// sees npm's progress. Returns whether the install succeeded.
pub fn install_claude_code() -> bool {
    println!("Claude Code not found. Installing @anthropic-ai/claude-code globally...");
    match Command::new("npm")
        .args(["install", "-g", "@anthropic-ai/claude-code"])
        .status()
    {
        Ok(status) if status.success() => {
            println!("Claude Code installed successfully!");
            true
        }
        Ok(status) => {
            warn!(%status, "npm install exited with failure");
            false
        }
        Err(err) => {
            warn!(error = %err, "failed to run npm install");
            false
        }
    }
}

/// Best-effort update of `~/.claude.json`: disable auto-updates and mark
/// onboarding complete so the wrapped launch goes straight to work.
/// Failures are logged, never fatal.
pub fn update_claude_settings() {
    let Some(home) = dirs::home_dir() else {
        warn!("could not determine home directory; skipping Claude settings update");
        return;
    };
    update_claude_settings_at(&home.join(".claude.json"));
}

/// Read-modify-write of the settings file at an explicit path.
pub fn update_claude_settings_at(path: &std::path::Path) {
    let mut settings: serde_json::Value = match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "unparseable Claude settings, rewriting");
            serde_json::json!({})
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => serde_json::json!({}),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not read Claude settings");
            return;
        }
    };

    if let Some(map) = settings.as_object_mut() {
        map.insert("autoUpdates".to_string(), serde_json::Value::Bool(false));
        map.insert(
            "hasCompletedOnboarding".to_string(),
            serde_json::Value::Bool(true),
        );
    }

    match serde_json::to_string_pretty(&settings) {
        Ok(json) => {
            if let Err(err) = std::fs::write(path, json) {
                warn!(path = %path.display(), error = %err, "could not update Claude settings");
            }
        }
        Err(err) => warn!(error = %err, "could not serialize Claude settings"),
    }
}

/// Environment variables for the child process.
///
/// Token mode exports `ANTHROPIC_AUTH_TOKEN` and clears `ANTHROPIC_API_KEY`
/// to the empty string so an inherited key cannot shadow the token; key
/// mode exports only `ANTHROPIC_API_KEY`.
pub fn build_child_env(
    base_url: &str,
    api_key: &str,
    auth: AuthMode,
    model: Option<&str>,
) -> Vec<(String, String)> {
    let mut env = vec![(ANTHROPIC_BASE_URL_VAR.to_string(), base_url.to_string())];

    match auth {
        AuthMode::Token => {
            env.push((ANTHROPIC_AUTH_TOKEN_VAR.to_string(), api_key.to_string()));
            env.push((ANTHROPIC_API_KEY_VAR.to_string(), String::new()));
        }
        AuthMode::Key => {
            env.push((ANTHROPIC_API_KEY_VAR.to_string(), api_key.to_string()));
        }
    }

    if let Some(model) = model {
        env.push((ANTHROPIC_MODEL_VAR.to_string(), model.to_string()));
        env.push((
            ANTHROPIC_SMALL_FAST_MODEL_VAR.to_string(),
            model.to_string(),
        ));
    }

    env
}

/// Spawn `claude` with the given arguments and extra environment,
/// inheriting stdio. Returns the child's exit code so the caller can
/// propagate it as our own.
pub fn spawn_claude(args: &[String], env: &[(String, String)]) -> Result<i32> {
    let mut cmd = Command::new("claude");
    cmd.args(args);
    for (key, value) in env {
        cmd.env(key, value);
    }

    let status = cmd
        .status()
        .context("failed to start Claude Code ('claude' not runnable)")?;

    // A signal-terminated child carries no code; report generic failure.
    Ok(status.code().unwrap_or(1))
}
