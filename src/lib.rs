//! # Usage Logger
//!
//! Client-side usage logging for HTTP services.
//!
//! ## Features
//!
//! - Rule language to remove, mask, sample or stop records before they leave the process
//! - Non-blocking submission with a bounded queue and one background dispatcher per logger
//! - Batched, deflated newline-delimited JSON delivery
//! - Process-wide switch and environment defaults
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use usage_logger::{HttpLogger, HttpRequestImpl, HttpResponseImpl, LogOptions, LoggerConfig};
//! use std::time::Duration;
//!
//! fn main() -> Result<(), usage_logger::Error> {
//!     let logger = HttpLogger::new(
//!         LoggerConfig::from_env()
//!             .with_url("https://collector.example/message")
//!             .with_rules("include standard\n/request_header:authorization/ remove"),
//!     )?;
//!
//!     let request = HttpRequestImpl::new()
//!         .with_method("POST")
//!         .with_url("https://shop.example/checkout")
//!         .with_header("Authorization", "Bearer secret");
//!     let response = HttpResponseImpl::new().with_status(201);
//!
//!     logger.log(
//!         &request,
//!         &response,
//!         LogOptions::new().with_interval(Duration::from_millis(18)),
//!     );
//!     logger.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! Framework integrations implement [`HttpRequest`] and [`HttpResponse`] for
//! their own request and response types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logger;
pub mod message;
pub mod tracing_setup;
pub mod usage_loggers;

pub use config::LoggerConfig;
pub use error::{Error, Result};
pub use logger::{HttpLogger, AGENT, VERSION};
pub use message::{LogOptions, MessageBuilder};
pub use tracing_setup::{init_tracing, TracingConfig, TracingError};
pub use usage_loggers::UsageLoggers;

pub use logger_core::{HttpRequest, HttpRequestImpl, HttpResponse, HttpResponseImpl, LogRecord};
pub use logger_rules::{
    default_rules, set_default_rules, HttpRules, Rule, RuleError, Verb, DEBUG_RULES,
    STANDARD_RULES, STRICT_RULES,
};
pub use logger_submit::{MessageQueue, SubmitConfig, SubmitError};
