//! Entry point for the `switchboard` binary: serves JSONL requests from
//! stdin and writes one JSONL reply per request to stdout.

use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match switchboard::run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(io::stderr(), "switchboard: {error}");
            ExitCode::FAILURE
        }
    }
}
