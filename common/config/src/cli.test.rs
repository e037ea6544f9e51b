use super::*;

#[test]
fn parses_basic_flags() {
    let args = CliArgs::parse_from([
        "jana",
        "--nthreads=4",
        "--nevents=100",
        "-Pthreshold=5.0",
        "-Pverbose=",
    ]);
    assert_eq!(args.nthreads, 4);
    assert_eq!(args.nevents, Some(100));
    assert_eq!(args.param_overrides, vec!["threshold=5.0", "verbose="]);
}

#[test]
fn plugin_flags_are_accepted_but_rejected_at_use_time() {
    let args = CliArgs::parse_from(["jana", "--plugin=JTestPlugin"]);
    assert_eq!(args.plugins, vec!["JTestPlugin"]);
    let err = args.reject_plugin_loading().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::PluginLoadingNotImplemented { .. }
    ));
}

#[test]
fn no_plugin_flags_means_no_error() {
    let args = CliArgs::parse_from(["jana"]);
    assert!(args.reject_plugin_loading().is_ok());
}

#[test]
fn auto_activate_splits_type_and_label() {
    assert_eq!(
        CliArgs::parse_auto_activate("EnergySum:calib"),
        ("EnergySum", "calib")
    );
    assert_eq!(CliArgs::parse_auto_activate("EnergySum"), ("EnergySum", ""));
}

#[test]
fn default_nthreads_is_at_least_one() {
    let args = CliArgs::parse_from(["jana"]);
    assert!(args.nthreads >= 1);
}
