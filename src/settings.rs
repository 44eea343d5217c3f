//! 拡張機能の設定スキーマ
//!
//! マニフェストの `settings` に宣言される設定項目の型定義と、
//! ユーザー設定値の検証・正規化を提供する。

mod validate;

pub use validate::{validate, Validated, ValidationIssue, ValidationWarning};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 設定キー → 設定記述子
pub type SettingsSchema = BTreeMap<String, SettingDescriptor>;

/// select の選択肢（値のみ、または値とラベルの組）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectOption {
    Plain(String),
    Labeled { value: String, label: String },
}

impl SelectOption {
    pub fn value(&self) -> &str {
        match self {
            SelectOption::Plain(value) => value,
            SelectOption::Labeled { value, .. } => value,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SelectOption::Plain(value) => value,
            SelectOption::Labeled { label, .. } => label,
        }
    }
}

/// 設定項目の種類と種類ごとの制約
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SettingKind {
    Boolean {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<bool>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },
    MultilineString {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },
    Select {
        options: Vec<SelectOption>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },
    MultiSelect {
        options: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Vec<String>>,
    },
    List {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Vec<String>>,
    },
    Dictionary {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<BTreeMap<String, String>>,
    },
    Custom {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
    },
}

impl SettingKind {
    /// マニフェスト上の type 名
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKind::Boolean { .. } => "boolean",
            SettingKind::Number { .. } => "number",
            SettingKind::String { .. } => "string",
            SettingKind::MultilineString { .. } => "multilinestring",
            SettingKind::Select { .. } => "select",
            SettingKind::MultiSelect { .. } => "multiselect",
            SettingKind::List { .. } => "list",
            SettingKind::Dictionary { .. } => "dictionary",
            SettingKind::Custom { .. } => "custom",
        }
    }
}

impl std::fmt::Display for SettingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 設定項目の記述子
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub kind: SettingKind,
}

impl SettingDescriptor {
    pub fn new(kind: SettingKind) -> Self {
        Self {
            display_name: None,
            description: None,
            kind,
        }
    }
}
