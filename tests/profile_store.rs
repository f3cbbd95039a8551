use std::fs;

use kimicc::config::{generate_slug_from_url, AuthMode, Config, ConfigStore, DEFAULT_BASE_URL};
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> ConfigStore {
    ConfigStore::new(dir.path().join(".kimicc.json"))
}

#[test]
fn read_returns_empty_config_when_file_missing() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    assert_eq!(store.read(), Config::default());
}

#[test]
fn read_returns_empty_config_on_parse_failure() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    fs::write(store.path(), "{not json").unwrap();

    assert_eq!(store.read(), Config::default());
}

#[test]
fn write_is_pretty_printed_json() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.add_profile("work", "https://x.test", "k1", false, None, false);

    let content = fs::read_to_string(store.path()).unwrap();
    // 2-space indentation, camelCase keys
    assert!(content.contains("\n  \"profiles\""));
    assert!(content.contains("\"defaultProfile\""));
}

#[test]
fn first_profile_becomes_default_without_asking() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    store.add_profile("work", "https://x.test", "k1", false, None, false);

    let config = store.read();
    assert_eq!(config.default_profile.as_deref(), Some("work"));
}

#[test]
fn second_profile_keeps_existing_default_unless_requested() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.add_profile("work", "https://x.test", "k1", false, None, false);

    store.add_profile("home", "https://y.test", "k2", false, None, false);
    assert_eq!(store.read().default_profile.as_deref(), Some("work"));

    store.add_profile("other", "https://z.test", "k3", true, None, false);
    assert_eq!(store.read().default_profile.as_deref(), Some("other"));
}

#[test]
fn add_with_same_slug_overwrites() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.add_profile("work", "https://x.test", "k1", false, None, false);

    store.add_profile("work", "https://new.test", "k2", false, Some("kimi-k2"), true);

    let config = store.read();
    assert_eq!(config.profiles.len(), 1);
    let profile = &config.profiles["work"];
    assert_eq!(profile.url, "https://new.test");
    assert_eq!(profile.key, "k2");
    assert_eq!(profile.auth, AuthMode::Token);
    assert_eq!(profile.model.as_deref(), Some("kimi-k2"));
}

#[test]
fn add_profile_migrates_legacy_key_first() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    fs::write(store.path(), r#"{"apiKey": "legacy1"}"#).unwrap();

    store.add_profile("work", "https://x.test", "k1", false, None, false);

    let config = store.read();
    assert!(config.api_key.is_none());
    assert_eq!(config.profiles["default"].key, "legacy1");
    assert_eq!(config.profiles["default"].url, DEFAULT_BASE_URL);
    assert_eq!(config.profiles["work"].key, "k1");
    // Migration ran before the insert, so the migrated profile is default.
    assert_eq!(config.default_profile.as_deref(), Some("default"));
}

#[test]
fn api_key_is_always_cleared_once_profiles_exist() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    // A lingering legacy key alongside profiles (hand-edited file).
    fs::write(
        store.path(),
        r#"{
  "apiKey": "stale",
  "profiles": {"p1": {"url": "https://x.test", "key": "k1", "auth": "key"}},
  "defaultProfile": "p1"
}"#,
    )
    .unwrap();

    store.add_profile("p2", "https://y.test", "k2", false, None, false);

    let config = store.read();
    assert!(!config.profiles.is_empty());
    assert!(config.api_key.is_none());
}

#[test]
fn delete_missing_profile_returns_false() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    assert!(!store.delete_profile("nope"));
}

#[test]
fn deleting_default_reassigns_to_smallest_remaining_slug() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.add_profile("zeta", "https://z.test", "k", true, None, false);
    store.add_profile("beta", "https://b.test", "k", false, None, false);
    store.add_profile("alpha", "https://a.test", "k", false, None, false);

    assert!(store.delete_profile("zeta"));

    let config = store.read();
    assert_eq!(config.default_profile.as_deref(), Some("alpha"));
    assert!(config.profiles.contains_key(config.default_profile.as_ref().unwrap()));
}

#[test]
fn deleting_last_profile_clears_default() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.add_profile("only", "https://x.test", "k", true, None, false);

    assert!(store.delete_profile("only"));

    let config = store.read();
    assert!(config.profiles.is_empty());
    assert!(config.default_profile.is_none());
}

#[test]
fn deleting_non_default_keeps_default() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.add_profile("keep", "https://x.test", "k", true, None, false);
    store.add_profile("drop", "https://y.test", "k", false, None, false);

    assert!(store.delete_profile("drop"));
    assert_eq!(store.read().default_profile.as_deref(), Some("keep"));
}

#[test]
fn set_default_requires_existing_slug() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.add_profile("a", "https://a.test", "k", true, None, false);
    store.add_profile("b", "https://b.test", "k", false, None, false);

    assert!(store.set_default_profile("b"));
    assert_eq!(store.read().default_profile.as_deref(), Some("b"));

    assert!(!store.set_default_profile("missing"));
    assert_eq!(store.read().default_profile.as_deref(), Some("b"));
}

#[test]
fn list_is_ordered_by_slug_with_default_flag() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.add_profile("zeta", "https://z.test", "k", false, None, false);
    store.add_profile("alpha", "https://a.test", "k", true, Some("kimi-k2"), false);

    let views = store.list_profiles();
    assert_eq!(views.len(), 2);
    assert_eq!(views[0].slug, "alpha");
    assert!(views[0].is_default);
    assert_eq!(views[0].model.as_deref(), Some("kimi-k2"));
    assert_eq!(views[1].slug, "zeta");
    assert!(!views[1].is_default);
}

#[test]
fn list_is_empty_without_profiles() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    assert!(store.list_profiles().is_empty());
}

#[test]
fn migrate_legacy_config_only_fires_on_legacy_shape() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    // Nothing to migrate.
    assert!(!store.migrate_legacy_config());

    fs::write(store.path(), r#"{"apiKey": "legacy1"}"#).unwrap();
    assert!(store.migrate_legacy_config());

    let config = store.read();
    assert!(config.api_key.is_none());
    assert_eq!(config.default_profile.as_deref(), Some("default"));
    assert_eq!(config.profiles["default"].key, "legacy1");
    assert_eq!(config.profiles["default"].auth, AuthMode::Key);

    // Already migrated: a second call is a no-op.
    assert!(!store.migrate_legacy_config());
}

#[test]
fn slug_derivation_examples() {
    assert_eq!(
        generate_slug_from_url("https://api.example.com").as_deref(),
        Some("example")
    );
    assert_eq!(generate_slug_from_url("not a url"), None);
}

#[test]
fn delete_file_reports_whether_anything_was_removed() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    assert!(!store.delete_file().unwrap());

    store.add_profile("work", "https://x.test", "k", true, None, false);
    assert!(store.delete_file().unwrap());
    assert!(!store.path().exists());
}
