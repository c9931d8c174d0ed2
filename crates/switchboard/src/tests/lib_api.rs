//! Tests for the crate-level wiring used by the binary.

use std::ffi::OsString;
use std::fs;
use std::io::Cursor;

use serde_json::{Value, json};
use switchboard_config::{Config, OrthoConfig};
use tempfile::TempDir;

use crate::builtin;
use crate::dispatch::Request;
use crate::{build_dispatcher, run_with};

fn replies(output: Vec<u8>) -> Vec<Value> {
    String::from_utf8(output)
        .expect("utf8 output")
        .lines()
        .map(|line| serde_json::from_str(line).expect("reply line is JSON"))
        .collect()
}

#[test]
fn build_dispatcher_applies_configured_fields() {
    let config = Config {
        required_fields: vec![
            String::from("type"),
            String::from("payload"),
            String::from("font"),
            String::from("type"),
        ],
        ..Config::default()
    };
    let dispatcher = build_dispatcher(&config, builtin::registry().expect("builtins"));
    assert_eq!(
        dispatcher.validator().required_fields().as_slice(),
        ["type", "payload", "font"]
    );
}

#[test]
fn configuration_file_order_drives_field_checks() {
    let temp_dir = TempDir::new().expect("create temporary directory");
    let path = temp_dir.path().join("switchboard.toml");
    fs::write(&path, "required_fields = [\"font\", \"type\", \"payload\"]\n")
        .expect("write config");
    let config = Config::load_from_iter([
        OsString::from("switchboard"),
        OsString::from("--config-path"),
        path.into_os_string(),
    ])
    .expect("load config");
    assert_eq!(config.required_fields(), ["font", "type", "payload"]);

    let dispatcher = build_dispatcher(&config, builtin::registry().expect("builtins"));
    let request = Request::from_value(json!({"payload": "x"})).expect("request");
    let reply = dispatcher.dispatch(&request);
    let error = reply.error().expect("error reply");
    assert_eq!(error.kind(), "MissingRequiredField");
    assert!(
        error.message().contains("'font'"),
        "expected font to be reported first, got {:?}",
        error.message()
    );
}

#[test]
fn run_with_serves_builtins() {
    let config = Config {
        log_filter: String::from("off"),
        ..Config::default()
    };
    let input = Cursor::new(
        b"{\"type\":\"echo\",\"payload\":[1,2]}\n{\"type\":\"text\",\"payload\":\"aGk=\"}\n".to_vec(),
    );
    let mut output = Vec::new();

    let summary = run_with(&config, input, &mut output).expect("run");
    assert_eq!(summary.handled, 1);
    assert_eq!(summary.failed, 1);

    let replies = replies(output);
    assert_eq!(replies[0], json!({"status": "ok", "payload": [1, 2]}));
    assert_eq!(replies[1]["payload"]["kind"], "UnrecognizedType");
}
