//! 設定値の検証と正規化
//!
//! スキーマに対して生の設定値を検証し、型が合わない値はデフォルト値
//! （未宣言なら種類ごとの空値）に置き換える。1つのキーの不正で全体を
//! 失敗させることはなく、置き換えた値は警告として返す。

use super::{SettingKind, SettingsSchema};
use serde_json::{Map, Number, Value};
use std::fmt;

/// 検証で見つかった問題
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    /// 型が一致しない
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// 範囲外の数値（clamp 済み）
    OutOfRange { value: f64, clamped: f64 },
    /// 選択肢に存在しない値
    NotAnOption { value: Value },
}

/// 1キー分の検証警告
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    pub key: String,
    pub issue: ValidationIssue,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.issue {
            ValidationIssue::TypeMismatch { expected, found } => write!(
                f,
                "'{}': expected {}, found {}; using default",
                self.key, expected, found
            ),
            ValidationIssue::OutOfRange { value, clamped } => write!(
                f,
                "'{}': {} is out of range; clamped to {}",
                self.key, value, clamped
            ),
            ValidationIssue::NotAnOption { value } => write!(
                f,
                "'{}': {} is not one of the allowed options; using default",
                self.key, value
            ),
        }
    }
}

/// 検証結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validated {
    pub values: Map<String, Value>,
    pub warnings: Vec<ValidationWarning>,
}

/// 単一値のチェック結果（内部用）
enum Outcome {
    Valid(Value),
    Clamped { value: Value, original: f64, clamped: f64 },
    Invalid(ValidationIssue),
}

/// スキーマに従って設定値を検証する
///
/// - スキーマの全キーが結果に含まれる（未指定ならデフォルト値）
/// - スキーマに無いキーはそのまま通す
/// - 入力は変更しない
pub fn validate(schema: &SettingsSchema, raw: &Map<String, Value>) -> Validated {
    let mut result = Validated::default();

    for (key, descriptor) in schema {
        let value = match raw.get(key) {
            None => fallback(&descriptor.kind),
            Some(candidate) => match check(&descriptor.kind, candidate) {
                Outcome::Valid(value) => value,
                Outcome::Clamped {
                    value,
                    original,
                    clamped,
                } => {
                    result.warnings.push(ValidationWarning {
                        key: key.clone(),
                        issue: ValidationIssue::OutOfRange {
                            value: original,
                            clamped,
                        },
                    });
                    value
                }
                Outcome::Invalid(issue) => {
                    result.warnings.push(ValidationWarning {
                        key: key.clone(),
                        issue,
                    });
                    fallback(&descriptor.kind)
                }
            },
        };
        result.values.insert(key.clone(), value);
    }

    for (key, value) in raw {
        if !schema.contains_key(key) {
            result.values.insert(key.clone(), value.clone());
        }
    }

    result
}

fn check(kind: &SettingKind, candidate: &Value) -> Outcome {
    match kind {
        SettingKind::Boolean { .. } => match candidate {
            Value::Bool(_) => Outcome::Valid(candidate.clone()),
            other => mismatch("boolean", other),
        },
        SettingKind::Number { min, max, .. } => {
            let Some(number) = candidate.as_f64() else {
                return mismatch("number", candidate);
            };
            match clamp_range(*min, *max) {
                Some((lo, hi)) if number < lo || number > hi => {
                    let clamped = number.clamp(lo, hi);
                    Outcome::Clamped {
                        value: number_value(clamped),
                        original: number,
                        clamped,
                    }
                }
                _ => Outcome::Valid(candidate.clone()),
            }
        }
        SettingKind::String { .. } | SettingKind::MultilineString { .. } => match candidate {
            Value::String(_) => Outcome::Valid(candidate.clone()),
            other => mismatch("string", other),
        },
        SettingKind::Select { options, .. } => match candidate {
            Value::String(value) if options.iter().any(|o| o.value() == value) => {
                Outcome::Valid(candidate.clone())
            }
            Value::String(_) => Outcome::Invalid(ValidationIssue::NotAnOption {
                value: candidate.clone(),
            }),
            other => mismatch("string", other),
        },
        SettingKind::MultiSelect { options, .. } => match candidate {
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::String(value) if options.iter().any(|o| o == value) => {}
                        _ => {
                            return Outcome::Invalid(ValidationIssue::NotAnOption {
                                value: item.clone(),
                            })
                        }
                    }
                }
                Outcome::Valid(candidate.clone())
            }
            other => mismatch("array", other),
        },
        SettingKind::List { .. } => match candidate {
            Value::Array(items) => match items.iter().find(|item| !item.is_string()) {
                Some(item) => mismatch("string", item),
                None => Outcome::Valid(candidate.clone()),
            },
            other => mismatch("array", other),
        },
        SettingKind::Dictionary { .. } => match candidate {
            Value::Object(entries) => match entries.values().find(|v| !v.is_string()) {
                Some(value) => mismatch("string", value),
                None => Outcome::Valid(candidate.clone()),
            },
            other => mismatch("object", other),
        },
        SettingKind::Custom { .. } => Outcome::Valid(candidate.clone()),
    }
}

/// デフォルト値、なければ種類ごとの空値
fn fallback(kind: &SettingKind) -> Value {
    match kind {
        SettingKind::Boolean { default } => Value::Bool(default.unwrap_or(false)),
        SettingKind::Number { default, min, max } => {
            let value = default.unwrap_or(0.0);
            // デフォルト値も clamp しないと再検証で値が変わる
            let value = match clamp_range(*min, *max) {
                Some((lo, hi)) => value.clamp(lo, hi),
                None => value,
            };
            number_value(value)
        }
        SettingKind::String { default }
        | SettingKind::MultilineString { default }
        | SettingKind::Select { default, .. } => {
            Value::String(default.clone().unwrap_or_default())
        }
        SettingKind::MultiSelect { default, .. } | SettingKind::List { default } => {
            Value::Array(
                default
                    .iter()
                    .flatten()
                    .map(|s| Value::String(s.clone()))
                    .collect(),
            )
        }
        SettingKind::Dictionary { default } => Value::Object(
            default
                .iter()
                .flatten()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        ),
        SettingKind::Custom { default } => default.clone().unwrap_or(Value::Null),
    }
}

/// min/max が両方指定され、かつ min <= max のときのみ clamp する
fn clamp_range(min: Option<f64>, max: Option<f64>) -> Option<(f64, f64)> {
    match (min, max) {
        (Some(lo), Some(hi)) if lo <= hi => Some((lo, hi)),
        _ => None,
    }
}

/// 整数値は整数として、それ以外は浮動小数として JSON 化
fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::from(0))
    }
}

fn mismatch(expected: &'static str, found: &Value) -> Outcome {
    Outcome::Invalid(ValidationIssue::TypeMismatch {
        expected,
        found: json_type(found),
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;

#[cfg(test)]
#[path = "validate_proptests.rs"]
mod proptests;
