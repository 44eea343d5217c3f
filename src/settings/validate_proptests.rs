//! validate のプロパティテスト

use super::*;
use crate::settings::{SelectOption, SettingDescriptor};
use proptest::prelude::*;

/// 任意の JSON 値
fn json_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1000i64..1000).prop_map(Value::from),
        (-1000.0f64..1000.0).prop_map(|f| Value::from(f)),
        "[a-z]{0,6}".prop_map(Value::String),
        prop::collection::vec("[a-z]{0,3}", 0..3)
            .prop_map(|items| Value::Array(items.into_iter().map(Value::String).collect())),
        prop::collection::btree_map("[a-z]{1,3}", "[a-z]{0,3}", 0..3).prop_map(|m| {
            Value::Object(m.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
        }),
    ];
    leaf.prop_recursive(2, 8, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// 任意の設定種類
fn setting_kind_strategy() -> impl Strategy<Value = SettingKind> {
    prop_oneof![
        proptest::option::of(any::<bool>()).prop_map(|default| SettingKind::Boolean { default }),
        (
            proptest::option::of(-200.0f64..200.0),
            proptest::option::of(-100.0f64..0.0),
            proptest::option::of(0.0f64..100.0)
        )
            .prop_map(|(default, min, max)| SettingKind::Number { default, min, max }),
        proptest::option::of("[a-z]{0,4}").prop_map(|default| SettingKind::String { default }),
        proptest::option::of("[a-z]{0,4}")
            .prop_map(|default| SettingKind::MultilineString { default }),
        prop::collection::vec("[a-c]", 1..3).prop_map(|options| SettingKind::Select {
            default: options.first().cloned(),
            options: options.into_iter().map(SelectOption::Plain).collect(),
        }),
        prop::collection::vec("[a-c]", 1..3).prop_map(|options| SettingKind::MultiSelect {
            default: None,
            options,
        }),
        Just(SettingKind::List { default: None }),
        Just(SettingKind::Dictionary { default: None }),
        Just(SettingKind::Custom { default: None }),
    ]
}

fn schema_strategy() -> impl Strategy<Value = SettingsSchema> {
    prop::collection::btree_map("[a-e]", setting_kind_strategy(), 0..5).prop_map(|m| {
        m.into_iter()
            .map(|(k, kind)| (k, SettingDescriptor::new(kind)))
            .collect()
    })
}

fn raw_strategy() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("[a-h]", json_value_strategy(), 0..6)
        .prop_map(|m| m.into_iter().collect())
}

/// 値が設定種類の JSON 型と一致するか
fn matches_kind(kind: &SettingKind, value: &Value) -> bool {
    match kind {
        SettingKind::Boolean { .. } => value.is_boolean(),
        SettingKind::Number { .. } => value.is_number(),
        SettingKind::String { .. }
        | SettingKind::MultilineString { .. }
        | SettingKind::Select { .. } => value.is_string(),
        SettingKind::MultiSelect { .. } => value.is_array(),
        SettingKind::List { .. } => value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string)),
        SettingKind::Dictionary { .. } => value
            .as_object()
            .is_some_and(|entries| entries.values().all(Value::is_string)),
        SettingKind::Custom { .. } => true,
    }
}

proptest! {
    /// 結果はスキーマの全キーを含み、各値は種類どおりの型を持つ
    #[test]
    fn prop_output_covers_schema_with_matching_types(
        schema in schema_strategy(),
        raw in raw_strategy()
    ) {
        let result = validate(&schema, &raw);
        for (key, descriptor) in &schema {
            let value = result.values.get(key);
            prop_assert!(value.is_some(), "missing key {}", key);
            prop_assert!(matches_kind(&descriptor.kind, value.unwrap()));
        }
    }

    /// スキーマ外のキーはそのまま残る
    #[test]
    fn prop_unknown_keys_are_preserved(
        schema in schema_strategy(),
        raw in raw_strategy()
    ) {
        let result = validate(&schema, &raw);
        for (key, value) in &raw {
            if !schema.contains_key(key) {
                prop_assert_eq!(result.values.get(key), Some(value));
            }
        }
    }

    /// 検証結果を再検証しても値は変わらない
    #[test]
    fn prop_validate_is_stable(
        schema in schema_strategy(),
        raw in raw_strategy()
    ) {
        let first = validate(&schema, &raw);
        let second = validate(&schema, &first.values);
        prop_assert_eq!(first.values, second.values);
    }
}
