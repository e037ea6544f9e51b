use super::*;
use std::io::Write;

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("tempfile");
    f.write_all(contents.as_bytes()).expect("write");
    f
}

#[test]
fn parses_basic_key_value_pairs() {
    let file = write_temp("nthreads 4\nnevents 100\n");
    let mut mgr = ParameterManager::new();
    mgr.load_file(file.path()).expect("load");
    assert_eq!(mgr.get("nthreads"), Some("4"));
    assert_eq!(mgr.get("nevents"), Some("100"));
}

#[test]
fn ignores_comments_and_blank_lines() {
    let file = write_temp("# a full-line comment\n\nnthreads 2 # trailing comment\n");
    let mut mgr = ParameterManager::new();
    mgr.load_file(file.path()).expect("load");
    assert_eq!(mgr.get("nthreads"), Some("2"));
}

#[test]
fn empty_value_defaults_to_one() {
    let file = write_temp("verbose\n");
    let mut mgr = ParameterManager::new();
    mgr.load_file(file.path()).expect("load");
    assert_eq!(mgr.get("verbose"), Some("1"));
}

#[test]
fn keys_are_case_insensitive() {
    let file = write_temp("NThreads 8\n");
    let mut mgr = ParameterManager::new();
    mgr.load_file(file.path()).expect("load");
    assert_eq!(mgr.get("nthreads"), Some("8"));
    assert_eq!(mgr.get("NTHREADS"), Some("8"));
}

#[test]
fn override_beats_file_value() {
    let file = write_temp("nthreads 4\n");
    let mut mgr = ParameterManager::new();
    mgr.load_file(file.path()).expect("load");
    mgr.apply_override("nthreads=16").expect("override");
    assert_eq!(mgr.get("nthreads"), Some("16"));
}

#[test]
fn override_without_equals_is_an_error() {
    let mut mgr = ParameterManager::new();
    assert!(mgr.apply_override("nthreads").is_err());
}

#[test]
fn override_with_empty_value_defaults_to_one() {
    let mut mgr = ParameterManager::new();
    mgr.apply_override("verbose=").expect("override");
    assert_eq!(mgr.get("verbose"), Some("1"));
}

#[test]
fn get_parsed_converts_to_requested_type() {
    let mut mgr = ParameterManager::new();
    mgr.apply_override("nthreads=8").expect("override");
    assert_eq!(mgr.get_parsed::<u32>("nthreads"), Some(8));
    assert_eq!(mgr.get_parsed::<u32>("missing"), None);
}
