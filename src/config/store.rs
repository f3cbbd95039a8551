//! CRUD layer over the `~/.kimicc.json` document.
//!
//! Every operation is a read-modify-write of the whole file. Persistence is
//! best-effort: read and write failures are logged and the caller continues
//! with a default/empty document. The path is threaded in explicitly so
//! tests can point the store at a temp file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use url::Url;

use crate::config::resolve::DEFAULT_BASE_URL;
use crate::config::types::{AuthMode, Config, Profile, ProfileView};

/// File name of the config document under the home directory.
pub const CONFIG_FILE_NAME: &str = ".kimicc.json";

/// Leading hostname labels dropped before deriving a slug.
const GENERIC_SUBDOMAINS: [&str; 8] = [
    "www", "api", "app", "dev", "test", "staging", "beta", "alpha",
];

/// Handle to the config document at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Create a store over an explicit path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the per-user config document (`~/.kimicc.json`).
    ///
    /// Falls back to the current directory if the home directory cannot
    /// be determined.
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(CONFIG_FILE_NAME)
    }

    /// Store over the per-user config document.
    pub fn open_default() -> Self {
        Self::new(Self::default_path())
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and parse the document.
    ///
    /// Returns an empty config if the file is missing or unparseable;
    /// parse failures are logged, never propagated.
    pub fn read(&self) -> Config {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Config::default();
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to read config");
                return Config::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to parse config");
                Config::default()
            }
        }
    }

    /// Serialize pretty-printed and overwrite the file.
    ///
    /// Best-effort: failures are logged, callers get no error signal.
    pub fn write(&self, config: &Config) {
        let json = match serde_json::to_string_pretty(config) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "failed to serialize config");
                return;
            }
        };

        if let Err(err) = fs::write(&self.path, json) {
            warn!(path = %self.path.display(), error = %err, "failed to write config");
        }
    }

    /// Insert or overwrite `profiles[slug]`.
    ///
    /// Runs legacy migration first if this is the first profile and a legacy
    /// `apiKey` exists, so the old credential survives as a `default`
    /// profile. The new profile becomes the default when requested or when
    /// no default exists yet. Any lingering legacy key is removed.
    pub fn add_profile(
        &self,
        slug: &str,
        url: &str,
        key: &str,
        set_as_default: bool,
        model: Option<&str>,
        use_auth_token: bool,
    ) {
        let mut config = self.read();

        if config.profiles.is_empty() && config.api_key.is_some() {
            migrate_in_place(&mut config);
        }

        config.profiles.insert(
            slug.to_string(),
            Profile {
                url: url.to_string(),
                key: key.to_string(),
                auth: if use_auth_token {
                    AuthMode::Token
                } else {
                    AuthMode::Key
                },
                model: model.map(str::to_string),
            },
        );

        if set_as_default || config.default_profile.is_none() {
            config.default_profile = Some(slug.to_string());
        }

        config.api_key = None;
        self.write(&config);
    }

    /// Remove `profiles[slug]`. Returns false if the slug is absent.
    ///
    /// If the removed profile was the default, the lexicographically
    /// smallest remaining slug becomes the new default (null if none
    /// remain).
    pub fn delete_profile(&self, slug: &str) -> bool {
        let mut config = self.read();

        if config.profiles.remove(slug).is_none() {
            return false;
        }

        if config.default_profile.as_deref() == Some(slug) {
            config.default_profile = config.profiles.keys().next().cloned();
        }

        self.write(&config);
        true
    }

    /// Mark `slug` as the default profile. Returns false if absent.
    pub fn set_default_profile(&self, slug: &str) -> bool {
        let mut config = self.read();

        if !config.profiles.contains_key(slug) {
            return false;
        }

        config.default_profile = Some(slug.to_string());
        self.write(&config);
        true
    }

    /// All profiles in lexicographic slug order.
    pub fn list_profiles(&self) -> Vec<ProfileView> {
        let config = self.read();

        config
            .profiles
            .iter()
            .map(|(slug, profile)| ProfileView {
                slug: slug.clone(),
                url: profile.url.clone(),
                key: profile.key.clone(),
                auth: profile.auth,
                model: profile.model.clone(),
                is_default: config.default_profile.as_deref() == Some(slug.as_str()),
            })
            .collect()
    }

    /// Convert a legacy `{apiKey}` document into profile format.
    ///
    /// Only fires when a legacy key is present and no profiles exist; the
    /// key becomes a `default` profile pointed at the baseline endpoint.
    /// Returns whether a migration occurred.
    pub fn migrate_legacy_config(&self) -> bool {
        let mut config = self.read();

        if !migrate_in_place(&mut config) {
            return false;
        }

        self.write(&config);
        debug!("migrated legacy apiKey into 'default' profile");
        true
    }

    /// Delete the config file itself (`kimicc reset`).
    ///
    /// Returns false if there was nothing to delete.
    pub fn delete_file(&self) -> std::io::Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }
}

/// Apply the legacy-to-profile migration to an in-memory document.
///
/// Shared between [`ConfigStore::migrate_legacy_config`] and the add-profile
/// path so each persists exactly once.
fn migrate_in_place(config: &mut Config) -> bool {
    if !config.profiles.is_empty() {
        return false;
    }

    let Some(key) = config.api_key.take() else {
        return false;
    };

    config.profiles.insert(
        "default".to_string(),
        Profile {
            url: DEFAULT_BASE_URL.to_string(),
            key,
            auth: AuthMode::Key,
            model: None,
        },
    );
    config.default_profile = Some("default".to_string());
    true
}

/// Derive a profile slug from a URL's hostname.
///
/// Drops one leading generic label (`api.`, `www.`, ...) and the trailing
/// TLD label, concatenates what remains without dots, and lowercases:
/// `https://api.example.com` → `example`. Returns `None` for unparseable
/// URLs or URLs without a hostname.
pub fn generate_slug_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;

    let mut labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.is_empty() {
        return None;
    }

    if labels.len() > 1 && GENERIC_SUBDOMAINS.contains(&labels[0].to_lowercase().as_str()) {
        labels.remove(0);
    }
    if labels.len() > 1 {
        labels.pop();
    }

    let slug = labels.concat().to_lowercase();
    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}
