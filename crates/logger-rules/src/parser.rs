//! Line parser for the rule language.
//!
//! A rule line has the shape
//! `[<scope>] <verb> [<param1>[, <param2>]] [# comment]`, where each
//! expression is bounded by one of the delimiters `~ ! % | /`. A delimiter
//! inside an expression must be escaped with a backslash.

use crate::error::{Result, RuleError};
use crate::rule::{Rule, RuleParam, RulePattern, Verb};
use once_cell::sync::Lazy;
use regex::Regex;

/// Expression delimiters, in the order they are tried.
pub const SEPARATORS: [char; 5] = ['~', '!', '%', '|', '/'];

static BLANK_OR_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*([#].*)*$").unwrap());

static ALLOW_HTTP_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*allow_http_url\s*(#.*)?$").unwrap());

static COPY_SESSION_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*copy_session_field\s+([~!%|/].+[~!%|/])\s*(#.*)?$").unwrap()
});

static REMOVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([~!%|/].+[~!%|/])\s*remove\s*(#.*)?$").unwrap());

static REMOVE_IF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([~!%|/].+[~!%|/])\s*remove_if\s+([~!%|/].+[~!%|/])\s*(#.*)?$").unwrap()
});

static REMOVE_IF_FOUND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([~!%|/].+[~!%|/])\s*remove_if_found\s+([~!%|/].+[~!%|/])\s*(#.*)?$")
        .unwrap()
});

static REMOVE_UNLESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([~!%|/].+[~!%|/])\s*remove_unless\s+([~!%|/].+[~!%|/])\s*(#.*)?$")
        .unwrap()
});

static REMOVE_UNLESS_FOUND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([~!%|/].+[~!%|/])\s*remove_unless_found\s+([~!%|/].+[~!%|/])\s*(#.*)?$")
        .unwrap()
});

static REPLACE: Lazy<Regex> = Lazy::new(|| {
    // third expression may be empty, e.g. `!!`
    Regex::new(
        r"^\s*([~!%|/].+[~!%|/])\s*replace[\s]+([~!%|/].+[~!%|/]),[\s]+([~!%|/].*[~!%|/])\s*(#.*)?$",
    )
    .unwrap()
});

static SAMPLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*sample\s+(\d+)\s*(#.*)?$").unwrap());

static SKIP_COMPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*skip_compression\s*(#.*)?$").unwrap());

static SKIP_SUBMISSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*skip_submission\s*(#.*)?$").unwrap());

static STOP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([~!%|/].+[~!%|/])\s*stop\s*(#.*)?$").unwrap());

static STOP_IF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([~!%|/].+[~!%|/])\s*stop_if\s+([~!%|/].+[~!%|/])\s*(#.*)?$").unwrap()
});

static STOP_IF_FOUND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([~!%|/].+[~!%|/])\s*stop_if_found\s+([~!%|/].+[~!%|/])\s*(#.*)?$")
        .unwrap()
});

static STOP_UNLESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([~!%|/].+[~!%|/])\s*stop_unless\s+([~!%|/].+[~!%|/])\s*(#.*)?$").unwrap()
});

static STOP_UNLESS_FOUND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([~!%|/].+[~!%|/])\s*stop_unless_found\s+([~!%|/].+[~!%|/])\s*(#.*)?$")
        .unwrap()
});

/// Scoped verbs taking a pattern parameter, and whether that pattern searches.
static REMOVE_CONDITIONS: [(&Lazy<Regex>, Verb, bool); 4] = [
    (&REMOVE_IF, Verb::RemoveIf, false),
    (&REMOVE_IF_FOUND, Verb::RemoveIfFound, true),
    (&REMOVE_UNLESS, Verb::RemoveUnless, false),
    (&REMOVE_UNLESS_FOUND, Verb::RemoveUnlessFound, true),
];

static STOP_CONDITIONS: [(&Lazy<Regex>, Verb, bool); 4] = [
    (&STOP_IF, Verb::StopIf, false),
    (&STOP_IF_FOUND, Verb::StopIfFound, true),
    (&STOP_UNLESS, Verb::StopUnless, false),
    (&STOP_UNLESS_FOUND, Verb::StopUnlessFound, true),
];

/// Parse a single rule line.
///
/// Blank and comment lines yield `Ok(None)`.
pub fn parse_rule(rule: &str) -> Result<Option<Rule>> {
    if BLANK_OR_COMMENT.is_match(rule) {
        return Ok(None);
    }
    if ALLOW_HTTP_URL.is_match(rule) {
        return Ok(Some(Rule::new(Verb::AllowHttpUrl, None, None, None)));
    }
    if let Some(c) = COPY_SESSION_FIELD.captures(rule) {
        let pattern = parse_regex(rule, &c[1])?;
        return Ok(Some(Rule::new(
            Verb::CopySessionField,
            None,
            Some(RuleParam::Pattern(pattern)),
            None,
        )));
    }
    if let Some(c) = REMOVE.captures(rule) {
        let scope = parse_regex(rule, &c[1])?;
        return Ok(Some(Rule::new(Verb::Remove, Some(scope), None, None)));
    }
    for (grammar, verb, search) in &REMOVE_CONDITIONS {
        if let Some(parsed) = parse_scoped(rule, grammar, *verb, *search)? {
            return Ok(Some(parsed));
        }
    }
    if let Some(c) = REPLACE.captures(rule) {
        let scope = parse_regex(rule, &c[1])?;
        let pattern = parse_regex_find(rule, &c[2])?;
        let template = parse_string(rule, &c[3])?;
        return Ok(Some(Rule::new(
            Verb::Replace,
            Some(scope),
            Some(RuleParam::Pattern(pattern)),
            Some(RuleParam::Text(template)),
        )));
    }
    if let Some(c) = SAMPLE.captures(rule) {
        let digits = &c[1];
        let percent = digits
            .parse::<u8>()
            .ok()
            .filter(|p| (1..=99).contains(p))
            .ok_or_else(|| RuleError::syntax(format!("Invalid sample percent: {digits}")))?;
        return Ok(Some(Rule::new(
            Verb::Sample,
            None,
            Some(RuleParam::Percent(percent)),
            None,
        )));
    }
    if SKIP_COMPRESSION.is_match(rule) {
        return Ok(Some(Rule::new(Verb::SkipCompression, None, None, None)));
    }
    if SKIP_SUBMISSION.is_match(rule) {
        return Ok(Some(Rule::new(Verb::SkipSubmission, None, None, None)));
    }
    if let Some(c) = STOP.captures(rule) {
        let scope = parse_regex(rule, &c[1])?;
        return Ok(Some(Rule::new(Verb::Stop, Some(scope), None, None)));
    }
    for (grammar, verb, search) in &STOP_CONDITIONS {
        if let Some(parsed) = parse_scoped(rule, grammar, *verb, *search)? {
            return Ok(Some(parsed));
        }
    }
    Err(RuleError::syntax(format!("Invalid rule: {rule}")))
}

fn parse_scoped(rule: &str, grammar: &Regex, verb: Verb, search: bool) -> Result<Option<Rule>> {
    let Some(c) = grammar.captures(rule) else {
        return Ok(None);
    };
    let scope = parse_regex(rule, &c[1])?;
    let pattern = if search {
        parse_regex_find(rule, &c[2])?
    } else {
        parse_regex(rule, &c[2])?
    };
    Ok(Some(Rule::new(
        verb,
        Some(scope),
        Some(RuleParam::Pattern(pattern)),
        None,
    )))
}

/// Parse a delimited expression into an anchored match pattern.
pub fn parse_regex(rule: &str, expr: &str) -> Result<RulePattern> {
    let mut s = parse_string(rule, expr)?;
    if !s.starts_with('^') {
        s.insert(0, '^');
    }
    if !s.ends_with('$') {
        s.push('$');
    }
    RulePattern::matching(s)
        .map_err(|_| RuleError::syntax(format!("Invalid regex ({expr}) in rule: {rule}")))
}

/// Parse a delimited expression into an unanchored search pattern.
pub fn parse_regex_find(rule: &str, expr: &str) -> Result<RulePattern> {
    RulePattern::searching(parse_string(rule, expr)?)
        .map_err(|_| RuleError::syntax(format!("Invalid regex ({expr}) in rule: {rule}")))
}

/// Strip the delimiters from an expression and unescape interior delimiters.
pub fn parse_string(rule: &str, expr: &str) -> Result<String> {
    for sep in SEPARATORS {
        let Some(inner) = expr.strip_prefix(sep).and_then(|s| s.strip_suffix(sep)) else {
            continue;
        };
        if has_unescaped(inner, sep) {
            return Err(RuleError::syntax(format!(
                "Unescaped separator ({sep}) in rule: {rule}"
            )));
        }
        return Ok(inner.replace(&format!("\\{sep}"), &sep.to_string()));
    }
    Err(RuleError::syntax(format!(
        "Invalid expression ({expr}) in rule: {rule}"
    )))
}

fn has_unescaped(inner: &str, sep: char) -> bool {
    inner.starts_with(sep)
        || inner
            .chars()
            .zip(inner.chars().skip(1))
            .any(|(prev, c)| c == sep && prev != '\\')
}
