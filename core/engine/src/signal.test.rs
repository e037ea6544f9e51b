use super::*;

#[test]
fn three_sigints_are_observable_by_count() {
    let before = SignalState::sigint_count();
    SignalState::simulate_sigint();
    SignalState::simulate_sigint();
    SignalState::simulate_sigint();
    assert_eq!(SignalState::sigint_count(), before + 3);
}

#[test]
fn status_request_is_consumed_exactly_once() {
    SignalState::simulate_status_request();
    assert!(SignalState::take_status_request());
    assert!(!SignalState::take_status_request());
}
