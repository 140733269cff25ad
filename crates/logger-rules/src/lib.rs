//! # Logger Rules
//!
//! Rule language for usage log records.
//!
//! Rules are written one per line and decide which details of an HTTP
//! transaction leave the process:
//!
//! ```text
//! include standard
//! /request_header:authorization/ remove
//! /response_body/ replace /"token":"[^"]*"/, /"token":"****"/
//! sample 25
//! ```
//!
//! [`HttpRules`] parses rule text once and applies it to each record with
//! [`HttpRules::apply`]. The named bundles `debug`, `standard` and `strict` can be
//! included by name, and `include default` refers to the process-wide
//! [`default_rules`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bundles;
pub mod error;
pub mod parser;
pub mod rule;
pub mod rules;

pub use bundles::{
    default_rules, expand_bundles, set_default_rules, DEBUG_RULES, STANDARD_RULES, STRICT_RULES,
};
pub use error::{Result, RuleError};
pub use parser::{parse_rule, SEPARATORS};
pub use rule::{expand_template, MatchMode, Rule, RuleParam, RulePattern, Verb};
pub use rules::HttpRules;
