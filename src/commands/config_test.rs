use super::*;
use serde_json::json;

#[test]
fn test_parse_json_values() {
    assert_eq!(
        parse_assignment("volume=50").unwrap(),
        ("volume".to_string(), json!(50))
    );
    assert_eq!(
        parse_assignment("muted=true").unwrap(),
        ("muted".to_string(), json!(true))
    );
    assert_eq!(
        parse_assignment(r#"tags=["a","b"]"#).unwrap(),
        ("tags".to_string(), json!(["a", "b"]))
    );
    assert_eq!(
        parse_assignment(r#"name="quoted""#).unwrap(),
        ("name".to_string(), json!("quoted"))
    );
}

#[test]
fn test_parse_falls_back_to_string() {
    assert_eq!(
        parse_assignment("theme=dark").unwrap(),
        ("theme".to_string(), json!("dark"))
    );
    // 最初の '=' で分割する
    assert_eq!(
        parse_assignment("expr=a=b").unwrap(),
        ("expr".to_string(), json!("a=b"))
    );
    assert_eq!(
        parse_assignment("empty=").unwrap(),
        ("empty".to_string(), json!(""))
    );
}

#[test]
fn test_parse_rejects_invalid() {
    assert!(parse_assignment("novalue").is_err());
    assert!(parse_assignment("=1").is_err());
    assert!(parse_assignment("  =1").is_err());
}
