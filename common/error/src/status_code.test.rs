use super::*;
use strum::IntoEnumIterator;

#[test]
fn test_status_code_values() {
    assert_eq!(StatusCode::Success as i32, 00_000);
    assert_eq!(StatusCode::Unknown as i32, 01_000);
    assert_eq!(StatusCode::IoError as i32, 02_000);
    assert_eq!(StatusCode::AmbiguousWiring as i32, 10_000);
    assert_eq!(StatusCode::ComponentRaised as i32, 11_000);
    assert_eq!(StatusCode::UnresolvedInputLevel as i32, 12_000);
    assert_eq!(StatusCode::PoolExhausted as i32, 13_000);
    assert_eq!(StatusCode::InvalidEngineState as i32, 14_000);
    assert_eq!(StatusCode::Interrupt as i32, 15_000);
}

#[test]
fn test_is_success() {
    assert!(StatusCode::is_success(0));
    assert!(!StatusCode::is_success(01_000));
}

#[test]
fn test_is_retryable() {
    assert!(StatusCode::QueueFull.is_retryable());
    assert!(StatusCode::Empty.is_retryable());
    assert!(!StatusCode::CycleDetected.is_retryable());
    assert!(!StatusCode::InvalidEngineState.is_retryable());
}

#[test]
fn test_should_log_error() {
    assert!(StatusCode::Unknown.should_log_error());
    assert!(StatusCode::PoolExhausted.should_log_error());
    assert!(!StatusCode::CycleDetected.should_log_error());
}

#[test]
fn test_display_and_name() {
    assert_eq!(format!("{}", StatusCode::Success), "Success");
    assert_eq!(StatusCode::CycleDetected.name(), "CycleDetected");
}

#[test]
fn test_category() {
    assert_eq!(StatusCode::Success.category(), StatusCategory::Success);
    assert_eq!(StatusCode::CycleDetected.category(), StatusCategory::Resolution);
    assert_eq!(StatusCode::QueueFull.category(), StatusCategory::Resource);
    assert_eq!(StatusCode::Timeout.category(), StatusCategory::External);
}

#[test]
fn test_exit_code_mapping() {
    assert_eq!(StatusCode::Success.exit_code(), 0);
    assert_eq!(StatusCode::Timeout.exit_code(), 2);
    assert_eq!(StatusCode::ComponentRaised.exit_code(), 1);
}

#[test]
fn test_metadata_consistency_with_value_range() {
    for code in StatusCode::iter() {
        let meta = code.meta();
        let value = code as i32;
        match meta.category {
            StatusCategory::Success => assert_eq!(value, 0),
            StatusCategory::Common => assert!((01_000..02_000).contains(&value)),
            StatusCategory::Io => assert!((02_000..03_000).contains(&value)),
            StatusCategory::Configuration => assert!((10_000..11_000).contains(&value)),
            StatusCategory::Component => assert!((11_000..12_000).contains(&value)),
            StatusCategory::Resolution => assert!((12_000..13_000).contains(&value)),
            StatusCategory::Resource => assert!((13_000..14_000).contains(&value)),
            StatusCategory::Lifecycle => assert!((14_000..15_000).contains(&value)),
            StatusCategory::External => assert!((15_000..16_000).contains(&value)),
        }
    }
}
