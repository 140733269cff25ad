//! # Logger Core
//!
//! Core types shared by the usage logger crates.
//!
//! This crate provides:
//! - [`LogRecord`], the ordered key/value form of one logged HTTP transaction
//! - The adapter capability traits ([`HttpRequest`], [`HttpResponse`]) that
//!   framework integrations implement
//! - Plain owned adapters ([`HttpRequestImpl`], [`HttpResponseImpl`]) for
//!   embedding and tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod record;
pub mod request;
pub mod response;

// Re-export commonly used types
pub use record::LogRecord;
pub use request::{HttpRequest, HttpRequestImpl};
pub use response::{HttpResponse, HttpResponseImpl};
