use super::*;
use jana_arrow::ArrowError;
use pretty_assertions::assert_eq;

#[test]
fn invalid_state_maps_to_lifecycle_category() {
    let err = EngineError::InvalidState { operation: "Run", state: crate::state::EngineState::Unopened };
    assert_eq!(err.status_code(), StatusCode::InvalidEngineState);
}

#[test]
fn timeout_maps_to_timeout_code_and_exit_code_two() {
    let err = EngineError::Timeout {
        worker_id: 0,
        arrow: "map".to_string(),
        elapsed_ms: 500,
        deadline_ms: 100,
    };
    assert_eq!(err.status_code(), StatusCode::Timeout);
    assert_eq!(err.status_code().exit_code(), 2);
}

#[test]
fn interrupted_maps_to_external_category_and_exit_code_one() {
    let err = EngineError::Interrupted;
    assert_eq!(err.status_code(), StatusCode::Interrupt);
    assert_eq!(err.status_code().exit_code(), 1);
}

#[test]
fn unknown_auto_activation_maps_to_configuration_category() {
    let err = EngineError::UnknownAutoActivation { type_name: "f64".to_string(), label: "calib".to_string() };
    assert_eq!(err.status_code(), StatusCode::MalformedConfig);
}

#[test]
fn pool_setup_error_conversion_preserves_the_underlying_status_code() {
    let pool_err = jana_pool::PoolError::Exhausted { level: jana_factory::EventLevel::None, requested: 4 };
    let expected = pool_err.status_code();
    let engine_err: EngineError = pool_err.into();
    assert_eq!(engine_err.status_code(), expected);
}

#[test]
fn arrow_error_conversion_preserves_the_underlying_status_code() {
    let arrow_err = ArrowError::SourceRaised { name: "src".to_string(), message: "boom".to_string() };
    let expected = arrow_err.status_code();
    let engine_err: EngineError = arrow_err.into();
    assert_eq!(engine_err.status_code(), expected);
}
