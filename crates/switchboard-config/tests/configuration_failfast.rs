use std::ffi::OsString;
use std::fs;

use tempfile::TempDir;

use switchboard_config::{Config, OrthoConfig};

#[test]
fn unknown_log_format_fails_to_load() {
    let args = vec![
        OsString::from("switchboard"),
        OsString::from("--log-format"),
        OsString::from("pretty"),
    ];

    let error = Config::load_from_iter(args).expect_err("loading must fail");
    assert!(
        !error.to_string().is_empty(),
        "expected a descriptive configuration error"
    );
}

#[test]
fn malformed_configuration_file_fails_to_load() {
    let temp_dir = TempDir::new().expect("create temporary directory");
    let path = temp_dir.path().join("switchboard.toml");
    fs::write(&path, "required_fields = [\"font\", \"type\"\n").expect("write malformed config");

    let args = vec![
        OsString::from("switchboard"),
        OsString::from("--config-path"),
        path.into_os_string(),
    ];

    let error = Config::load_from_iter(args).expect_err("loading must fail");
    assert!(
        !error.to_string().is_empty(),
        "expected a descriptive configuration error"
    );
}
