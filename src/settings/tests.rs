//! Settings tests

use std::fs;
use std::path::PathBuf;

use tempfile::tempdir;

use super::*;
use crate::error::KilnError;

#[test]
fn test_load_minimal_settings() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("kiln.toml");
    fs::write(&file, "name = \"site\"\n").unwrap();

    let settings = BuildSettings::load(&file).unwrap();

    assert_eq!(settings.name, "site");
    assert!(settings.srcs.is_empty());
    assert!(!settings.release);
    assert_eq!(settings.base_dir, crate::paths::normalize(dir.path()));
    assert_eq!(settings.out_dir, settings.base_dir.join("build"));
}

#[test]
fn test_load_resolves_srcs_against_file_dir() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("kiln.toml");
    fs::write(
        &file,
        "name = \"site\"\nsrcs = [\"styles/main.scss\", \"styles/print.scss\"]\nout_dir = \"dist\"\n",
    )
    .unwrap();

    let settings = BuildSettings::load(&file).unwrap();

    let base = crate::paths::normalize(dir.path());
    assert_eq!(
        settings.srcs,
        vec![
            base.join("styles/main.scss"),
            base.join("styles/print.scss")
        ]
    );
    assert_eq!(settings.out_dir, base.join("dist"));
    assert_eq!(settings.output_path(), base.join("dist/site.css"));
}

#[test]
fn test_load_keeps_absolute_paths() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("kiln.toml");
    fs::write(
        &file,
        "name = \"site\"\nsrcs = [\"/srv/shared/theme.scss\"]\n",
    )
    .unwrap();

    let settings = BuildSettings::load(&file).unwrap();

    assert_eq!(settings.srcs, vec![PathBuf::from("/srv/shared/theme.scss")]);
}

#[test]
fn test_load_rejects_empty_name() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("kiln.toml");
    fs::write(&file, "name = \"  \"\n").unwrap();

    let err = BuildSettings::load(&file).unwrap_err();
    assert!(matches!(err, KilnError::InvalidSettings { .. }));
    assert!(err.to_string().contains("name must not be empty"));
}

#[test]
fn test_load_rejects_missing_name() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("kiln.toml");
    fs::write(&file, "srcs = []\n").unwrap();

    let err = BuildSettings::load(&file).unwrap_err();
    assert!(matches!(err, KilnError::InvalidSettings { .. }));
}

#[test]
fn test_load_rejects_malformed_toml() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("kiln.toml");
    fs::write(&file, "name = \n").unwrap();

    let err = BuildSettings::load(&file).unwrap_err();
    assert!(matches!(err, KilnError::InvalidSettings { .. }));
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = BuildSettings::load(&dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, KilnError::Io(_)));
}

#[test]
fn test_unknown_key_warns_with_suggestion() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("kiln.toml");
    fs::write(&file, "name = \"site\"\nsrc = [\"main.scss\"]\n").unwrap();

    let (settings, warnings) = BuildSettings::load_with_warnings(&file).unwrap();

    assert_eq!(settings.name, "site");
    assert!(settings.srcs.is_empty());
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].key, "src");
    assert_eq!(warnings[0].line, Some(2));
    assert_eq!(warnings[0].suggestion.as_deref(), Some("srcs"));
}

#[test]
fn test_unrelated_unknown_key_has_no_suggestion() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("kiln.toml");
    fs::write(&file, "name = \"site\"\ncompression_quality = 9\n").unwrap();

    let (_, warnings) = BuildSettings::load_with_warnings(&file).unwrap();

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].key, "compression_quality");
    assert!(warnings[0].suggestion.is_none());
}

#[test]
fn test_builder_resolves_against_base() {
    let settings = BuildSettings::new("site", "/srv/styles")
        .with_srcs(vec![PathBuf::from("main.scss")])
        .with_out_dir("dist")
        .with_release(true);

    assert_eq!(settings.srcs, vec![PathBuf::from("/srv/styles/main.scss")]);
    assert_eq!(settings.out_dir, PathBuf::from("/srv/styles/dist"));
    assert!(settings.release);
    assert_eq!(
        settings.output_path(),
        PathBuf::from("/srv/styles/dist/site.css")
    );
}
