use super::*;

#[test]
fn parses_minimal_wiring_file() {
    let json = r#"{
        "wiring": [
            {
                "plugin_name": "JTest",
                "type_name": "EnergySum",
                "prefix": "energysum",
                "level": "PhysicsEvent",
                "input_names": ["hits"],
                "input_levels": ["PhysicsEvent"],
                "output_names": ["energy"],
                "configs": {"threshold": "5.0"}
            }
        ],
        "configs": {"global_seed": "42"}
    }"#;
    let file = WiringFile::parse(json).expect("parse");
    assert_eq!(file.wiring.len(), 1);
    assert_eq!(file.wiring[0].prefix, "energysum");
    assert_eq!(file.configs.get("global_seed"), Some(&"42".to_string()));
}

#[test]
fn duplicate_prefix_within_a_layer_is_an_error() {
    let json = r#"{
        "wiring": [
            {"prefix": "a"},
            {"prefix": "a"}
        ]
    }"#;
    let file = WiringFile::parse(json).expect("parse");
    let err = ResolvedWiring::from_layers(vec![file]).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicatePrefixInLayer { .. }));
}

#[test]
fn duplicate_prefix_across_layers_is_allowed_and_overlaid() {
    let base = WiringFile::parse(r#"{"wiring": [{"prefix": "a", "type_name": "Foo"}]}"#).unwrap();
    let higher =
        WiringFile::parse(r#"{"wiring": [{"prefix": "a", "type_name": "Bar", "level": "Run"}]}"#)
            .unwrap();
    let resolved = ResolvedWiring::from_layers(vec![base, higher]).expect("resolve");
    let entry = resolved.lookup("a").expect("entry present");
    assert_eq!(entry.type_name.as_deref(), Some("Foo"), "lower-priority field is not clobbered");
    assert_eq!(entry.level.as_deref(), Some("Run"), "higher-priority fills the unset field");
}

#[test]
fn higher_priority_does_not_override_already_set_field() {
    let base = WiringFile::parse(r#"{"wiring": [{"prefix": "a", "level": "Run"}]}"#).unwrap();
    let higher =
        WiringFile::parse(r#"{"wiring": [{"prefix": "a", "level": "Timeslice"}]}"#).unwrap();
    let resolved = ResolvedWiring::from_layers(vec![base, higher]).expect("resolve");
    assert_eq!(resolved.lookup("a").unwrap().level.as_deref(), Some("Run"));
}

#[test]
fn shared_configs_follow_the_same_first_wins_rule() {
    let base = WiringFile::parse(r#"{"configs": {"seed": "1"}}"#).unwrap();
    let higher = WiringFile::parse(r#"{"configs": {"seed": "2", "extra": "x"}}"#).unwrap();
    let resolved = ResolvedWiring::from_layers(vec![base, higher]).expect("resolve");
    assert_eq!(resolved.shared("seed"), Some("1"));
    assert_eq!(resolved.shared("extra"), Some("x"));
}

#[test]
fn missing_prefix_resolves_to_none() {
    let resolved = ResolvedWiring::from_layers(vec![]).expect("resolve");
    assert!(resolved.lookup("nonexistent").is_none());
}
