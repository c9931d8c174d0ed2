//! Test suites for the switchboard crate.

mod lib_api;
