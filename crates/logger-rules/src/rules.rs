//! Parsed rule sets and record transformation.

use crate::bundles::{default_rules, expand_bundles, INCLUDE_DEFAULT};
use crate::error::{Result, RuleError};
use crate::parser::parse_rule;
use crate::rule::{Rule, Verb};
use logger_core::LogRecord;
use rand::Rng;
use regex::NoExpand;
use tracing::debug;

const FILE_PREFIX: &str = "file://";

/// An immutable set of rules, grouped by verb.
///
/// Built once per logger and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct HttpRules {
    text: String,
    rules: Vec<Rule>,
    allow_http_url: bool,
    skip_compression: bool,
    skip_submission: bool,
    copy_session_field: Vec<Rule>,
    remove: Vec<Rule>,
    remove_if: Vec<Rule>,
    remove_if_found: Vec<Rule>,
    remove_unless: Vec<Rule>,
    remove_unless_found: Vec<Rule>,
    replace: Vec<Rule>,
    sample: Vec<Rule>,
    stop: Vec<Rule>,
    stop_if: Vec<Rule>,
    stop_if_found: Vec<Rule>,
    stop_unless: Vec<Rule>,
    stop_unless_found: Vec<Rule>,
}

impl HttpRules {
    /// Build a rule set from rule text.
    ///
    /// `None` or blank text selects the current default rules. Text starting
    /// with `file://` is read from the named file. `include default` lines are
    /// replaced by the default rules before parsing.
    pub fn new(rules: Option<&str>) -> Result<Self> {
        let defaults = default_rules();
        let text = match rules {
            None => defaults,
            Some(rules) => {
                let rules = match rules.strip_prefix(FILE_PREFIX) {
                    Some(path) => {
                        let path = path.trim();
                        std::fs::read_to_string(path)
                            .map_err(|_| RuleError::file_not_found(path))?
                    }
                    None => rules.to_string(),
                };
                let rules = INCLUDE_DEFAULT
                    .replace_all(&rules, NoExpand(&defaults))
                    .into_owned();
                if rules.trim().is_empty() {
                    defaults
                } else {
                    rules
                }
            }
        };
        let parsed = Self::parse(&text)?;
        let set = Self::from_rules(text, parsed)?;
        debug!(rule_count = set.len(), "Loaded rules");
        Ok(set)
    }

    /// Parse every line of `rules` after expanding bundles.
    pub fn parse(rules: &str) -> Result<Vec<Rule>> {
        expand_bundles(rules)
            .split('\n')
            .filter_map(|line| parse_rule(line).transpose())
            .collect()
    }

    fn from_rules(text: String, rules: Vec<Rule>) -> Result<Self> {
        let by_verb = |verb: Verb| -> Vec<Rule> {
            rules.iter().filter(|r| r.verb() == verb).cloned().collect()
        };
        let has_verb = |verb: Verb| rules.iter().any(|r| r.verb() == verb);

        let sample = by_verb(Verb::Sample);
        if sample.len() > 1 {
            return Err(RuleError::syntax("Multiple sample rules"));
        }

        Ok(Self {
            allow_http_url: has_verb(Verb::AllowHttpUrl),
            skip_compression: has_verb(Verb::SkipCompression),
            skip_submission: has_verb(Verb::SkipSubmission),
            copy_session_field: by_verb(Verb::CopySessionField),
            remove: by_verb(Verb::Remove),
            remove_if: by_verb(Verb::RemoveIf),
            remove_if_found: by_verb(Verb::RemoveIfFound),
            remove_unless: by_verb(Verb::RemoveUnless),
            remove_unless_found: by_verb(Verb::RemoveUnlessFound),
            replace: by_verb(Verb::Replace),
            sample,
            stop: by_verb(Verb::Stop),
            stop_if: by_verb(Verb::StopIf),
            stop_if_found: by_verb(Verb::StopIfFound),
            stop_unless: by_verb(Verb::StopUnless),
            stop_unless_found: by_verb(Verb::StopUnlessFound),
            text,
            rules,
        })
    }

    /// Normalized rule text, before bundle expansion.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of parsed rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules were parsed.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules in source order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Whether plain `http:` destinations are allowed.
    pub fn allow_http_url(&self) -> bool {
        self.allow_http_url
    }

    /// Whether batches should be sent uncompressed.
    pub fn skip_compression(&self) -> bool {
        self.skip_compression
    }

    /// Whether records should be built but not submitted.
    pub fn skip_submission(&self) -> bool {
        self.skip_submission
    }

    /// `copy_session_field` rules.
    pub fn copy_session_field(&self) -> &[Rule] {
        &self.copy_session_field
    }

    /// `remove` rules.
    pub fn remove(&self) -> &[Rule] {
        &self.remove
    }

    /// `remove_if` rules.
    pub fn remove_if(&self) -> &[Rule] {
        &self.remove_if
    }

    /// `remove_if_found` rules.
    pub fn remove_if_found(&self) -> &[Rule] {
        &self.remove_if_found
    }

    /// `remove_unless` rules.
    pub fn remove_unless(&self) -> &[Rule] {
        &self.remove_unless
    }

    /// `remove_unless_found` rules.
    pub fn remove_unless_found(&self) -> &[Rule] {
        &self.remove_unless_found
    }

    /// `replace` rules.
    pub fn replace(&self) -> &[Rule] {
        &self.replace
    }

    /// The `sample` rule, if any.
    pub fn sample(&self) -> Option<&Rule> {
        self.sample.first()
    }

    /// `stop` rules.
    pub fn stop(&self) -> &[Rule] {
        &self.stop
    }

    /// `stop_if` rules.
    pub fn stop_if(&self) -> &[Rule] {
        &self.stop_if
    }

    /// `stop_if_found` rules.
    pub fn stop_if_found(&self) -> &[Rule] {
        &self.stop_if_found
    }

    /// `stop_unless` rules.
    pub fn stop_unless(&self) -> &[Rule] {
        &self.stop_unless
    }

    /// `stop_unless_found` rules.
    pub fn stop_unless_found(&self) -> &[Rule] {
        &self.stop_unless_found
    }

    /// Apply the rules to a record, returning `None` when it should be dropped.
    pub fn apply(&self, record: LogRecord) -> Option<LogRecord> {
        self.apply_with(record, &mut rand::thread_rng())
    }

    /// Apply the rules using `rng` for sampling decisions.
    pub fn apply_with<R: Rng + ?Sized>(&self, mut record: LogRecord, rng: &mut R) -> Option<LogRecord> {
        if self.stops(&record) {
            return None;
        }

        if let Some(percent) = self.sample().and_then(Rule::percent) {
            if rng.gen_range(0..100) >= percent {
                return None;
            }
        }

        blank_where(&mut record, &self.remove, |_, _| true);
        blank_where(&mut record, &self.remove_unless_found, misses);
        blank_where(&mut record, &self.remove_if_found, hits);
        blank_where(&mut record, &self.remove_unless, misses);
        blank_where(&mut record, &self.remove_if, hits);

        record.prune_empty();
        if record.is_empty() {
            return None;
        }

        for rule in &self.replace {
            let (Some(pattern), Some(template)) = (rule.pattern(), rule.template()) else {
                continue;
            };
            for (key, value) in record.iter_mut() {
                if rule.applies_to(key) {
                    let replaced = pattern.replace_all(value.as_str(), template).into_owned();
                    *value = replaced;
                }
            }
        }

        record.prune_empty();
        if record.is_empty() {
            None
        } else {
            Some(record)
        }
    }

    fn stops(&self, record: &LogRecord) -> bool {
        let any_entry = |rule: &Rule, test: fn(&Rule, &str) -> bool| {
            record
                .iter()
                .any(|(key, value)| rule.applies_to(key) && test(rule, value))
        };

        self.stop.iter().any(|rule| any_entry(rule, |_, _| true))
            || self.stop_if_found.iter().any(|rule| any_entry(rule, hits))
            || self.stop_if.iter().any(|rule| any_entry(rule, hits))
            || !self.stop_unless_found.iter().all(|rule| any_entry(rule, hits))
            || !self.stop_unless.iter().all(|rule| any_entry(rule, hits))
    }
}

/// Whether the rule's pattern accepts `value`, in the pattern's own match mode.
fn hits(rule: &Rule, value: &str) -> bool {
    rule.pattern().is_some_and(|p| p.is_match(value))
}

fn misses(rule: &Rule, value: &str) -> bool {
    !hits(rule, value)
}

fn blank_where(record: &mut LogRecord, rules: &[Rule], test: fn(&Rule, &str) -> bool) {
    for rule in rules {
        for (key, value) in record.iter_mut() {
            if rule.applies_to(key) && test(rule, value.as_str()) {
                value.clear();
            }
        }
    }
}
