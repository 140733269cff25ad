//! Integration tests for the usage logger
//!
//! These tests run loggers against a mock collector and cover:
//! - End-to-end logging of request/response pairs
//! - Rule bundles applied on the way out
//! - Compression, batching and submission counters

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;

#[cfg(test)]
mod e2e_tests;
#[cfg(test)]
mod submission_tests;
