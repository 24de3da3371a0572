//! Crate-level test suites.
//!
//! Per-module unit tests live next to the code; this directory holds the
//! adversarial regression suite and property tests that exercise the decoder
//! end to end.

mod cve_regression;
mod properties;
