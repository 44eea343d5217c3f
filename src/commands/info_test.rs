use super::*;
use moonbase::catalog::{ExtensionSource, ExtensionState};
use moonbase::manifest::{ExtensionAuthor, ExtensionManifest};
use moonbase::settings::{SettingDescriptor, SettingKind};
use serde_json::{json, Map};

fn row<'a>(rows: &'a [(&'static str, String)], field: &str) -> Option<&'a str> {
    rows.iter()
        .find(|(f, _)| *f == field)
        .map(|(_, v)| v.as_str())
}

fn sample() -> MoonbaseExtension {
    let mut manifest = ExtensionManifest::new("sample");
    manifest.version = Some("1.2.0".to_string());
    manifest.meta.name = Some("Sample".to_string());
    manifest.meta.tagline = Some("Does things".to_string());
    manifest.meta.authors = vec![
        ExtensionAuthor::Name("alice".to_string()),
        ExtensionAuthor::Detailed {
            name: "bob".to_string(),
            id: Some("42".to_string()),
        },
    ];
    MoonbaseExtension {
        id: "sample".to_string(),
        unique_id: 3,
        manifest,
        download: Some("https://example.com/sample.asar".to_string()),
        source: ExtensionSource::Repository("https://example.com/repo.json".to_string()),
        state: ExtensionState::Disabled,
    }
}

#[test]
fn test_detail_rows() {
    let rows = detail_rows(&sample());

    assert_eq!(row(&rows, "ID"), Some("sample"));
    assert_eq!(row(&rows, "Name"), Some("Sample"));
    assert_eq!(row(&rows, "Version"), Some("1.2.0"));
    assert_eq!(row(&rows, "State"), Some("disabled"));
    // description が無ければ tagline
    assert_eq!(row(&rows, "Description"), Some("Does things"));
    assert_eq!(row(&rows, "Authors"), Some("alice, bob"));
    assert_eq!(row(&rows, "Tags"), Some("-"));
    assert_eq!(
        row(&rows, "Download"),
        Some("https://example.com/sample.asar")
    );
    assert_eq!(row(&rows, "Deprecated"), None);
}

#[test]
fn test_detail_rows_deprecated_without_download() {
    let mut ext = sample();
    ext.manifest.meta.deprecated = true;
    ext.download = None;

    let rows = detail_rows(&ext);

    assert_eq!(row(&rows, "Deprecated"), Some("yes"));
    assert_eq!(row(&rows, "Download"), None);
}

#[test]
fn test_settings_table_lists_every_key() {
    let mut schema = SettingsSchema::new();
    let mut volume = SettingDescriptor::new(SettingKind::Number {
        default: Some(10.0),
        min: Some(0.0),
        max: Some(100.0),
    });
    volume.display_name = Some("Volume".to_string());
    schema.insert("volume".to_string(), volume);
    schema.insert(
        "muted".to_string(),
        SettingDescriptor::new(SettingKind::Boolean { default: None }),
    );
    let mut config = Map::new();
    config.insert("volume".to_string(), json!(10));
    config.insert("muted".to_string(), json!(false));
    let effective = EffectiveConfig {
        enabled: true,
        config,
    };

    let rendered = settings_table(&schema, &effective).to_string();

    assert!(rendered.contains("Volume"));
    assert!(rendered.contains("number"));
    assert!(rendered.contains("muted"));
    assert!(rendered.contains("false"));
}
