use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which environment variable the credential is exported as when
/// launching Claude Code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// `ANTHROPIC_API_KEY`.
    #[default]
    Key,
    /// `ANTHROPIC_AUTH_TOKEN` (with `ANTHROPIC_API_KEY` cleared).
    Token,
}

impl AuthMode {
    /// Stable name as shown in `profile list` output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::Token => "token",
        }
    }
}

/// A single named API endpoint + credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Base URL of the Anthropic-compatible endpoint.
    pub url: String,
    /// Opaque API credential.
    pub key: String,
    #[serde(default)]
    pub auth: AuthMode,
    /// Optional model override exported to the child process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Root document stored at `~/.kimicc.json`.
///
/// `api_key` is the legacy single-key format; it is mutually exclusive with
/// `profiles` in steady state (migration removes it). Profiles live in a
/// `BTreeMap` so slug ordering is deterministic (lexicographic); this is
/// what makes "pick another default after deleting the current one"
/// reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub profiles: BTreeMap<String, Profile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
}

/// A profile joined with its slug and default flag, for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub slug: String,
    pub url: String,
    pub key: String,
    pub auth: AuthMode,
    pub model: Option<String>,
    pub is_default: bool,
}
