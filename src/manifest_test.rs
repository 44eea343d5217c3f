use super::*;
use crate::settings::SettingKind;
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_parse_repository_manifest() {
    let value = json!({
        "id": "noTrack",
        "version": "1.0.1",
        "apiLevel": 2,
        "meta": {
            "name": "No Track",
            "tagline": "Disables tracking",
            "authors": ["Cynosphere", {"name": "NotNite", "id": "123"}],
            "tags": ["privacy"]
        },
        "settings": {
            "blockSentry": {"type": "boolean", "default": true}
        },
        "download": "https://example.com/noTrack.zip"
    });

    let parsed = RepositoryManifest::from_value(value).unwrap();
    assert_eq!(parsed.id(), "noTrack");
    assert_eq!(parsed.manifest.api_level, Some(2));
    assert_eq!(parsed.manifest.display_name(), "No Track");
    assert_eq!(parsed.manifest.meta.authors.len(), 2);
    assert_eq!(parsed.manifest.meta.authors[1].name(), "NotNite");
    assert_eq!(parsed.download, "https://example.com/noTrack.zip");

    let setting = parsed.manifest.settings.get("blockSentry").unwrap();
    assert!(matches!(
        setting.kind,
        SettingKind::Boolean {
            default: Some(true)
        }
    ));
}

#[test]
fn test_display_name_falls_back_to_id() {
    let manifest = ExtensionManifest::new("quietLoggers");
    assert_eq!(manifest.display_name(), "quietLoggers");
}

#[test]
fn test_unknown_fields_are_ignored() {
    let value = json!({
        "id": "a",
        "environment": "desktop",
        "download": "https://example.com/a.zip"
    });
    assert!(RepositoryManifest::from_value(value).is_ok());
}

// ==================== 不正なマニフェスト ====================

#[test]
fn test_missing_download_is_rejected() {
    let value = json!({"id": "a"});
    assert!(RepositoryManifest::from_value(value).is_err());
}

#[test]
fn test_empty_download_is_rejected() {
    let value = json!({"id": "a", "download": "  "});
    assert!(RepositoryManifest::from_value(value).is_err());
}

#[test]
fn test_empty_id_is_rejected() {
    let value = json!({"id": "", "download": "https://example.com/a.zip"});
    let err = RepositoryManifest::from_value(value).unwrap_err();
    assert!(err.to_string().contains("id cannot be empty"));
}

#[test]
fn test_path_like_id_is_rejected() {
    for id in ["../escape", "a/b", "a\\b", ".hidden", ".."] {
        let value = json!({"id": id, "download": "https://example.com/a.zip"});
        let err = RepositoryManifest::from_value(value).unwrap_err();
        assert!(
            err.to_string().contains("not a valid directory name"),
            "id {:?} should be rejected",
            id
        );
    }
}

#[test]
fn test_non_object_is_rejected() {
    assert!(RepositoryManifest::from_value(json!("a")).is_err());
    assert!(RepositoryManifest::from_value(json!(42)).is_err());
}

#[test]
fn test_unknown_setting_type_is_rejected() {
    let value = json!({
        "id": "a",
        "settings": {"x": {"type": "color"}},
        "download": "https://example.com/a.zip"
    });
    assert!(RepositoryManifest::from_value(value).is_err());
}

// ==================== load ====================

#[test]
fn test_load_from_directory() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join(MANIFEST_FILE),
        r#"{"id":"local","meta":{"name":"Local"}}"#,
    )
    .unwrap();

    let manifest = ExtensionManifest::load(temp_dir.path()).unwrap();
    assert_eq!(manifest.id, "local");
    assert_eq!(manifest.display_name(), "Local");
}

#[test]
fn test_load_missing_manifest_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = ExtensionManifest::load(temp_dir.path()).unwrap_err();
    assert!(matches!(err, MoonbaseError::Io(_)));
}
