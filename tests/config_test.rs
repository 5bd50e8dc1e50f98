//! Configuration loading.

use companion::{CompanionConfig, Persona};
use std::io::Write;
use std::time::Duration;

#[test]
fn test_defaults() {
    let config = CompanionConfig::default();
    assert_eq!(config.model(), "gemini-2.5-flash");
    assert_eq!(*config.persona(), Persona::ZenCompanion);
    assert_eq!(config.opponent_delay(), Duration::from_millis(500));
    assert_eq!(config.reveal_delay(), Duration::from_millis(1000));
    assert_eq!(*config.arcade_settings().mine_count(), 12);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
name = "Sol"
persona = "witty-pal"
mine_rows = 8
"#
    )
    .unwrap();

    let config = CompanionConfig::from_file(file.path()).unwrap();
    assert_eq!(config.name(), "Sol");
    assert_eq!(*config.persona(), Persona::WittyPal);
    assert_eq!(*config.mine_rows(), 8);
    assert_eq!(*config.mine_cols(), 10);
    assert_eq!(config.api_base(), "https://generativelanguage.googleapis.com");
}

#[test]
fn test_invalid_file_is_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "persona = \"grumpy\"").unwrap();

    let err = CompanionConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = CompanionConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.model(), "gemini-2.5-flash");
    assert!(CompanionConfig::from_file(dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_setters_override() {
    let config = CompanionConfig::default()
        .with_model("gemini-2.5-pro".to_string())
        .with_persona(Persona::CreativeMuse);
    assert_eq!(config.model(), "gemini-2.5-pro");
    assert_eq!(*config.persona(), Persona::CreativeMuse);
}
