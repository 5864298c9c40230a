use clap::Parser;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use template_builder::cli::Args;

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("build-template")];
    res.extend(args.iter().map(OsString::from));
    res
}

#[test]
fn test_defaults() {
    let parsed = Args::try_parse_from(make_args(&[])).unwrap();

    assert_eq!(parsed.source_dir, PathBuf::from("."));
    assert!(parsed.config.is_none());
    assert!(parsed.template_dir.is_none());
    assert!(!parsed.check);
    assert!(!parsed.verbose);
}

#[test]
fn test_all_flags() {
    let args = make_args(&[
        "--source-dir",
        "./project",
        "--config",
        "keywords_map.yml",
        "--template-dir",
        "./out",
        "--check",
        "--verbose",
    ]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.source_dir, PathBuf::from("./project"));
    assert_eq!(parsed.config, Some(PathBuf::from("keywords_map.yml")));
    assert_eq!(parsed.template_dir, Some(PathBuf::from("./out")));
    assert!(parsed.check);
    assert!(parsed.verbose);
}

#[test]
fn test_short_flags() {
    let args = make_args(&["-s", "src-project", "-c", "m.yml", "-o", "tpl", "-v"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.source_dir, PathBuf::from("src-project"));
    assert_eq!(parsed.config, Some(PathBuf::from("m.yml")));
    assert_eq!(parsed.template_dir, Some(PathBuf::from("tpl")));
    assert!(parsed.verbose);
}

#[test]
fn test_missing_option_value() {
    assert!(Args::try_parse_from(make_args(&["--config"])).is_err());
}

#[test]
fn test_positional_args_rejected() {
    assert!(Args::try_parse_from(make_args(&["extra"])).is_err());
}

#[test]
fn test_template_dir_relative_to_working_directory() {
    let args = make_args(&["-s", "project", "-o", "out/template"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(
        parsed.template_dir_from(Path::new("/work")),
        Some(PathBuf::from("/work/out/template"))
    );
}

#[test]
fn test_absolute_template_dir_kept() {
    let cwd = std::env::temp_dir();
    let absolute = cwd.join("tpl");
    let parsed = Args::try_parse_from(vec![
        OsString::from("build-template"),
        OsString::from("--template-dir"),
        absolute.clone().into_os_string(),
    ])
    .unwrap();

    assert_eq!(parsed.template_dir_from(Path::new("/elsewhere")), Some(absolute));
    assert!(Args::try_parse_from(make_args(&[])).unwrap().template_dir_from(&cwd).is_none());
}
