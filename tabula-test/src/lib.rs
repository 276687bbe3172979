//! Test support for tabula stores.
//!
//! [`suite::run_table_tests`] checks a connected client against the
//! behaviour every store must show; [`tracing`] captures log events so tests
//! can assert on them.

pub mod suite;
pub mod tracing;
