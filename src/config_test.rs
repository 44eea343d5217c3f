use super::*;
use serde_json::json;
use tempfile::TempDir;

// ==================== ExtensionEntry ====================

#[test]
fn test_entry_shape_is_chosen_by_value_type() {
    let config: Config = serde_json::from_value(json!({
        "extensions": {
            "legacy": true,
            "full": {"enabled": false, "config": {"k": 1}}
        },
        "repositories": []
    }))
    .unwrap();

    assert_eq!(config.entry("legacy"), Some(&ExtensionEntry::Legacy(true)));
    assert!(config.is_enabled("legacy"));
    assert!(!config.is_enabled("full"));
    assert_eq!(
        config.entry("full").and_then(ExtensionEntry::overrides),
        Some(&json!({"k": 1}).as_object().cloned().unwrap())
    );
    assert!(!config.is_enabled("missing"));
}

#[test]
fn test_optional_fields_round_trip_in_camel_case() {
    let input = json!({
        "extensions": {},
        "repositories": ["https://example.com/repo.json"],
        "devSearchPaths": ["/dev/ext"],
        "loggerLevel": "debug",
        "patchAll": true
    });
    let config: Config = serde_json::from_value(input.clone()).unwrap();
    assert_eq!(config.dev_search_paths, Some(vec!["/dev/ext".to_string()]));
    assert_eq!(config.logger_level.as_deref(), Some("debug"));
    assert_eq!(config.patch_all, Some(true));
    assert_eq!(serde_json::to_value(&config).unwrap(), input);
}

#[test]
fn test_default_config_has_default_repository() {
    let config = Config::default();
    assert_eq!(config.repositories, vec![DEFAULT_REPOSITORY.to_string()]);
    assert!(config.extensions.is_empty());
}

// ==================== 変更操作 ====================

#[test]
fn test_set_enabled_keeps_legacy_shape() {
    let mut config = Config::default();
    config
        .extensions
        .insert("a".to_string(), ExtensionEntry::Legacy(false));

    config.set_enabled("a", true);
    assert_eq!(config.entry("a"), Some(&ExtensionEntry::Legacy(true)));
}

#[test]
fn test_set_enabled_creates_full_entry() {
    let mut config = Config::default();
    config.set_enabled("a", true);
    assert_eq!(
        config.entry("a"),
        Some(&ExtensionEntry::Full(ConfigExtension {
            enabled: true,
            config: None
        }))
    );
}

#[test]
fn test_set_setting_upgrades_legacy_entry() {
    let mut config = Config::default();
    config
        .extensions
        .insert("a".to_string(), ExtensionEntry::Legacy(true));

    config.set_setting("a", "port", json!(8080));

    let entry = config.entry("a").unwrap();
    assert!(entry.enabled());
    assert_eq!(entry.overrides().unwrap()["port"], json!(8080));
}

#[test]
fn test_remove_setting() {
    let mut config = Config::default();
    config.set_setting("a", "port", json!(1));
    assert_eq!(config.remove_setting("a", "port"), Some(json!(1)));
    assert_eq!(config.remove_setting("a", "port"), None);
    assert_eq!(config.remove_setting("missing", "port"), None);
}

#[test]
fn test_add_repository_rejects_duplicates_and_non_http() {
    let mut config = Config::default();
    assert!(config.add_repository(DEFAULT_REPOSITORY).is_err());
    assert!(config.add_repository("ftp://example.com/repo.json").is_err());
    assert!(config
        .add_repository("https://example.com/repo.json")
        .is_ok());
    assert_eq!(config.repositories.len(), 2);
}

#[test]
fn test_remove_repository() {
    let mut config = Config::default();
    assert!(config.remove_repository(DEFAULT_REPOSITORY).is_ok());
    assert!(config.repositories.is_empty());
    assert!(matches!(
        config.remove_repository(DEFAULT_REPOSITORY),
        Err(MoonbaseError::RepositoryNotFound(_))
    ));
}

// ==================== ConfigFile ====================

#[test]
fn test_load_missing_file_returns_default() {
    let temp_dir = TempDir::new().unwrap();
    let file = ConfigFile::load_from(temp_dir.path().join("config.json")).unwrap();
    assert_eq!(file.config(), &Config::default());
}

#[test]
fn test_save_and_reload() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.json");

    let mut file = ConfigFile::load_from(path.clone()).unwrap();
    file.config_mut().set_enabled("a", true);
    file.config_mut().set_setting("b", "k", json!("v"));
    file.save().unwrap();

    let reloaded = ConfigFile::load_from(path).unwrap();
    assert_eq!(reloaded.config(), file.config());
}

#[test]
fn test_load_invalid_json_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        ConfigFile::load_from(path),
        Err(MoonbaseError::Config(_))
    ));
}

// ==================== HttpConfig ====================

#[test]
fn test_http_config_default() {
    let config = HttpConfig::default();
    assert_eq!(config.user_agent, "moonbase");
    assert!(config.timeout.is_some());
}
