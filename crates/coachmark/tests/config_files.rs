#![forbid(unsafe_code)]

//! GuideConfig loading from TOML and JSON.

use std::io::Write;

use coachmark::{ConfigError, GuideConfig, IllegalTargetPolicy};
use coachmark_core::animation::Easing;
use coachmark_core::color::Rgba;

#[test]
fn toml_overrides_and_defaults() {
    let cfg = GuideConfig::from_toml_str(
        r#"
        animation_duration_ms = 400
        transition_easing = "ease_in_out"
        illegal_target_policy = "drop"

        [mask_color]
        r = 10
        g = 20
        b = 30
        a = 128
        "#,
    )
    .expect("valid toml");
    assert_eq!(cfg.animation_duration_ms, 400);
    assert_eq!(cfg.transition_easing, Easing::EaseInOut);
    assert_eq!(cfg.illegal_target_policy, IllegalTargetPolicy::Drop);
    assert_eq!(cfg.mask_color, Rgba::new(10, 20, 30, 128));
    // Unspecified fields keep their defaults.
    assert!(!cfg.animates_step_transition);
}

#[test]
fn empty_toml_is_default() {
    let cfg = GuideConfig::from_toml_str("").expect("empty toml");
    assert_eq!(cfg, GuideConfig::default());
}

#[test]
fn json_round_trip_through_file() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    write!(
        file,
        r#"{{"animates_step_transition": true, "animation_duration_ms": 120}}"#
    )
    .expect("write");
    let cfg = GuideConfig::from_json_file(file.path()).expect("valid json");
    assert!(cfg.animates_step_transition);
    assert_eq!(cfg.animation_duration_ms, 120);
}

#[test]
fn toml_file_missing_is_io_error() {
    let err = GuideConfig::from_toml_file("/nonexistent/guide.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
    assert!(err.to_string().starts_with("I/O error"));
}

#[test]
fn malformed_inputs_report_parser() {
    let err = GuideConfig::from_toml_str("animation_duration_ms = \"slow\"").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
    let err = GuideConfig::from_json_str("{not json").unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn loaded_config_can_be_validated() {
    let err = GuideConfig::from_toml_str("animation_duration_ms = 999999")
        .and_then(GuideConfig::validated)
        .unwrap_err();
    match err {
        ConfigError::Validation(errors) => assert_eq!(errors.len(), 1),
        other => panic!("expected validation error, got {other}"),
    }
}
