//! Credential resolution: environment → profile store → prompt.
//!
//! Each of key, base URL and model resolves independently:
//!
//! 1. Its dedicated environment variable always wins outright.
//! 2. A named profile is authoritative: if it (or its key) is missing,
//!    key resolution fails instead of silently falling back.
//! 3. Otherwise the default profile is used, and it must be explicit;
//!    the legacy key is never consulted once any profile exists.
//! 4. With no profiles at all, the legacy `apiKey` applies.
//! 5. Key resolution only: as a last resort, prompt and persist.
//!
//! URL and model resolution never prompt; they fall back to the baseline
//! endpoint and `None` respectively.

use tracing::warn;

use crate::config::store::ConfigStore;
use crate::config::types::AuthMode;
use crate::prompt::Prompt;

/// Baseline Anthropic-compatible endpoint of the Kimi API.
pub const DEFAULT_BASE_URL: &str = "https://api.moonshot.cn/anthropic";

/// Provider-specific API key override; takes priority over the generic one.
pub const KIMI_API_KEY_VAR: &str = "KIMI_API_KEY";
/// Generic API key override (also the variable exported to the child).
pub const ANTHROPIC_API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
/// Base URL override.
pub const ANTHROPIC_BASE_URL_VAR: &str = "ANTHROPIC_BASE_URL";
/// Model override.
pub const ANTHROPIC_MODEL_VAR: &str = "ANTHROPIC_MODEL";

/// Values captured from the process environment.
///
/// Captured once at startup and threaded in, so resolution is testable
/// without mutating the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

impl EnvOverrides {
    /// Snapshot the relevant variables from the process environment.
    /// Empty values are treated as unset.
    pub fn from_env() -> Self {
        Self {
            api_key: read_var(KIMI_API_KEY_VAR).or_else(|| read_var(ANTHROPIC_API_KEY_VAR)),
            base_url: read_var(ANTHROPIC_BASE_URL_VAR),
            model: read_var(ANTHROPIC_MODEL_VAR),
        }
    }
}

fn read_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Resolves launch credentials against a config store.
pub struct Resolver<'a> {
    store: &'a ConfigStore,
    env: EnvOverrides,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a ConfigStore, env: EnvOverrides) -> Self {
        Self { store, env }
    }

    /// Resolve the API key, prompting (and persisting the answer) as a
    /// last resort. Returns `None` when resolution fails.
    pub fn api_key(&self, profile: Option<&str>, prompt: &dyn Prompt) -> Option<String> {
        if let Some(key) = &self.env.api_key {
            return Some(key.clone());
        }

        let mut config = self.store.read();

        if let Some(name) = profile {
            return match config.profiles.get(name) {
                Some(p) if !p.key.is_empty() => Some(p.key.clone()),
                Some(_) => {
                    warn!(profile = name, "profile has no API key");
                    None
                }
                None => {
                    warn!(profile = name, "profile not found");
                    None
                }
            };
        }

        if !config.profiles.is_empty() {
            let Some(default) = config.default_profile.clone() else {
                warn!("profiles exist but no default profile is set; run 'kimicc profile set-default'");
                return None;
            };
            return match config.profiles.get(&default) {
                Some(p) if !p.key.is_empty() => Some(p.key.clone()),
                _ => {
                    warn!(profile = %default, "default profile is missing or has no API key");
                    None
                }
            };
        }

        if let Some(key) = &config.api_key {
            return Some(key.clone());
        }

        // Nothing configured anywhere: ask once and remember the answer.
        let entered = match prompt.api_key() {
            Ok(entered) => entered,
            Err(err) => {
                warn!(error = %err, "failed to read API key from prompt");
                return None;
            }
        };
        if entered.is_empty() {
            return None;
        }

        // No profiles exist on this path, so the key lands in the legacy
        // field; the next `profile add` migrates it into a `default` profile.
        config.api_key = Some(entered.clone());
        self.store.write(&config);
        Some(entered)
    }

    /// Resolve the base URL. Never prompts; falls back to the baseline
    /// endpoint.
    pub fn base_url(&self, profile: Option<&str>) -> String {
        if let Some(url) = &self.env.base_url {
            return url.clone();
        }

        let config = self.store.read();
        let selected = match profile {
            Some(name) => config.profiles.get(name),
            None => config
                .default_profile
                .as_ref()
                .and_then(|slug| config.profiles.get(slug)),
        };

        selected
            .map(|p| p.url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Resolve the model override, if any. Never prompts.
    pub fn model(&self, profile: Option<&str>) -> Option<String> {
        if let Some(model) = &self.env.model {
            return Some(model.clone());
        }

        let config = self.store.read();
        let selected = match profile {
            Some(name) => config.profiles.get(name),
            None => config
                .default_profile
                .as_ref()
                .and_then(|slug| config.profiles.get(slug)),
        };

        selected.and_then(|p| p.model.clone())
    }

    /// Auth mode of the selected profile; `key` when no profile applies.
    pub fn auth_mode(&self, profile: Option<&str>) -> AuthMode {
        let config = self.store.read();
        let selected = match profile {
            Some(name) => config.profiles.get(name),
            None => config
                .default_profile
                .as_ref()
                .and_then(|slug| config.profiles.get(slug)),
        };

        selected.map(|p| p.auth).unwrap_or_default()
    }
}
