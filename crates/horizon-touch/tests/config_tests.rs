//! Tests for loading configuration files and applying them to the engine.

use std::io::Write;

use horizon_touch::{
    ConfigError, GestureError, GestureManager, GesturePriority, GestureSettings, ManagerConfig,
    PointerEvent, PressGesture, TouchConfig,
};

const CONFIG: &str = r#"
[manager]
propagate_to_ancestors = false
pointer_history_len = 4

[gestures.button]
min_pointers = 1
max_pointers = 1
ignore_children = true
priority = "High"

[gestures.two_finger]
min_pointers = 2
send_messages = false
"#;

#[test]
fn test_load_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();

    let config = TouchConfig::load_toml(file.path()).unwrap();
    assert_eq!(
        config.manager,
        ManagerConfig::new()
            .with_propagate_to_ancestors(false)
            .with_pointer_history_len(4)
    );

    let button = config.gesture("button").unwrap();
    assert_eq!(button.max_pointers, 1);
    assert!(button.ignore_children);
    assert_eq!(button.priority, GesturePriority::High);

    let two_finger = config.gesture("two_finger").unwrap();
    assert_eq!(two_finger.min_pointers, 2);
    assert_eq!(two_finger.max_pointers, 0);
    assert!(!two_finger.send_messages);
    assert!(two_finger.enabled);
}

#[test]
fn test_load_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("touch.json");
    std::fs::write(
        &path,
        r#"{ "gestures": { "tap": { "min_pointers": 1, "enabled": false } } }"#,
    )
    .unwrap();

    let config = TouchConfig::load_json(&path).unwrap();
    assert_eq!(config.manager, ManagerConfig::default());
    assert!(!config.gesture("tap").unwrap().enabled);
}

#[test]
fn test_inverted_thresholds_are_rejected() {
    let err = TouchConfig::from_toml_str(
        r#"
        [gestures.broken]
        min_pointers = 3
        max_pointers = 2
        "#,
    )
    .unwrap_err();

    match err {
        ConfigError::InvalidGesture { name, source } => {
            assert_eq!(name, "broken");
            assert_eq!(source, GestureError::InvalidThresholds { min: 3, max: 2 });
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = TouchConfig::load_toml(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { path: ref p, .. } if p == &path));
}

#[test]
fn test_round_trip_through_toml() {
    let mut config = TouchConfig::new();
    config.insert_gesture(
        "press",
        GestureSettings::new()
            .with_min_pointers(1)
            .with_priority(GesturePriority::Low),
    );
    let text = config.to_toml_string().unwrap();
    assert_eq!(TouchConfig::from_toml_str(&text).unwrap(), config);
}

#[test]
fn test_loaded_config_drives_the_engine() {
    let config = TouchConfig::from_toml_str(CONFIG).unwrap();
    let mut manager = GestureManager::with_config(config.manager.clone());
    let panel = manager.hierarchy_mut().create_node("panel");
    let icon = manager.hierarchy_mut().create_child(panel, "icon").unwrap();

    let button = config.gesture("button").unwrap().clone();
    let id = manager
        .attach(panel, PressGesture::with_settings(button))
        .unwrap();

    // No propagation: a press on the child never reaches the panel.
    let report = manager.process_batch(&[PointerEvent::pressed(1, (0.0, 0.0), icon)]);
    assert!(report.transitions.is_empty());

    let report = manager.process_batch(&[PointerEvent::pressed(2, (0.0, 0.0), panel)]);
    assert_eq!(report.recognized(), vec![id]);

    for step in 1..=10 {
        manager.process_batch(&[PointerEvent::updated(2, (step as f32, 0.0))]);
    }
    let pointer = manager.dispatcher().pointer(2.into()).unwrap();
    assert_eq!(pointer.history().len(), 4);
}
