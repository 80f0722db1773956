//! Integration test crate for the Promora marketplace core.
//!
//! This crate has no library code — it only contains integration tests
//! that exercise end-to-end money flows across multiple workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p promora-integration-tests
//! ```
