use super::*;

#[test]
fn test_is_confirmation_accepts_yes() {
    assert!(is_confirmation("y\n"));
    assert!(is_confirmation("Y"));
    assert!(is_confirmation("  yes  "));
    assert!(is_confirmation("YES\r\n"));
}

#[test]
fn test_is_confirmation_rejects_others() {
    assert!(!is_confirmation(""));
    assert!(!is_confirmation("\n"));
    assert!(!is_confirmation("n"));
    assert!(!is_confirmation("yep"));
}
