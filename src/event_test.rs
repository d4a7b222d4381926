use super::*;

// =============================================================
// Key
// =============================================================

#[test]
fn key_from_browser_maps_named_keys() {
    assert_eq!(Key::from_browser("Tab"), Key::Tab);
    assert_eq!(Key::from_browser("Escape"), Key::Escape);
    assert_eq!(Key::from_browser("Esc"), Key::Escape);
    assert_eq!(Key::from_browser("Enter"), Key::Enter);
    assert_eq!(Key::from_browser(" "), Key::Space);
    assert_eq!(Key::from_browser("Spacebar"), Key::Space);
}

#[test]
fn key_from_browser_keeps_unknown_keys() {
    assert_eq!(Key::from_browser("ArrowDown"), Key::Other("ArrowDown".to_owned()));
}

#[test]
fn only_enter_and_space_activate() {
    assert!(Key::Enter.is_activation());
    assert!(Key::Space.is_activation());
    assert!(!Key::Tab.is_activation());
    assert!(!Key::Escape.is_activation());
    assert!(!Key::Other("a".to_owned()).is_activation());
}

// =============================================================
// Outcome
// =============================================================

#[test]
fn outcome_default_is_ignored() {
    assert_eq!(Outcome::default(), Outcome::Ignored);
    assert!(!Outcome::default().is_consumed());
}
