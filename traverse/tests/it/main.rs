//! Integration tests for the walk engine.
//!
//! Tests set up `pretty_env_logger`; use `RUST_LOG=debug` to see walk output.
