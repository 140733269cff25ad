//! Parsed rule representation.

use fancy_regex::Regex;
use std::borrow::Cow;
use std::fmt;
use tracing::warn;

/// Rule verbs, in the order the parser tries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// Permit plain `http:` destinations.
    AllowHttpUrl,
    /// Copy matching session attributes into the record.
    CopySessionField,
    /// Blank every entry whose key matches the scope.
    Remove,
    /// Blank entries whose value fully matches the pattern.
    RemoveIf,
    /// Blank entries whose value contains the pattern.
    RemoveIfFound,
    /// Blank entries whose value does not fully match the pattern.
    RemoveUnless,
    /// Blank entries whose value does not contain the pattern.
    RemoveUnlessFound,
    /// Rewrite matches of the pattern with a template.
    Replace,
    /// Keep only a percentage of records.
    Sample,
    /// Send batches uncompressed.
    SkipCompression,
    /// Build records but never submit them.
    SkipSubmission,
    /// Drop records containing a key matching the scope.
    Stop,
    /// Drop records whose scoped value fully matches the pattern.
    StopIf,
    /// Drop records whose scoped value contains the pattern.
    StopIfFound,
    /// Drop records unless some scoped value fully matches the pattern.
    StopUnless,
    /// Drop records unless some scoped value contains the pattern.
    StopUnlessFound,
}

impl Verb {
    /// Keyword used in rule text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllowHttpUrl => "allow_http_url",
            Self::CopySessionField => "copy_session_field",
            Self::Remove => "remove",
            Self::RemoveIf => "remove_if",
            Self::RemoveIfFound => "remove_if_found",
            Self::RemoveUnless => "remove_unless",
            Self::RemoveUnlessFound => "remove_unless_found",
            Self::Replace => "replace",
            Self::Sample => "sample",
            Self::SkipCompression => "skip_compression",
            Self::SkipSubmission => "skip_submission",
            Self::Stop => "stop",
            Self::StopIf => "stop_if",
            Self::StopIfFound => "stop_if_found",
            Self::StopUnless => "stop_unless",
            Self::StopUnlessFound => "stop_unless_found",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a pattern is tested against text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Must match starting at the first character.
    Match,
    /// May match anywhere.
    Search,
}

/// A compiled rule pattern that remembers its source text.
#[derive(Clone)]
pub struct RulePattern {
    source: String,
    mode: MatchMode,
    regex: Regex,
}

impl RulePattern {
    /// Compile a pattern that must match from the start of the text.
    pub fn matching(source: impl Into<String>) -> Result<Self, fancy_regex::Error> {
        let source = source.into();
        let regex = Regex::new(&format!("^(?:{source})"))?;
        Ok(Self {
            source,
            mode: MatchMode::Match,
            regex,
        })
    }

    /// Compile a pattern that may match anywhere in the text.
    pub fn searching(source: impl Into<String>) -> Result<Self, fancy_regex::Error> {
        let source = source.into();
        let regex = Regex::new(&source)?;
        Ok(Self {
            source,
            mode: MatchMode::Search,
            regex,
        })
    }

    /// Pattern source as written after unescaping and anchoring.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Matching mode.
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Test the pattern against `text`.
    ///
    /// Backtracking limits exceeded at runtime count as no match.
    pub fn is_match(&self, text: &str) -> bool {
        match self.regex.is_match(text) {
            Ok(matched) => matched,
            Err(e) => {
                warn!(pattern = %self.source, error = %e, "Rule pattern failed at runtime");
                false
            }
        }
    }

    /// Replace every non-overlapping match with an expanded `${n}` template.
    ///
    /// On a runtime matching failure the text is returned unchanged.
    pub fn replace_all<'t>(&self, text: &'t str, template: &str) -> Cow<'t, str> {
        match self.regex.try_replacen(text, 0, template) {
            Ok(replaced) => replaced,
            Err(e) => {
                warn!(pattern = %self.source, error = %e, "Rule replacement failed at runtime");
                Cow::Borrowed(text)
            }
        }
    }
}

impl fmt::Debug for RulePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RulePattern")
            .field("source", &self.source)
            .field("mode", &self.mode)
            .finish()
    }
}

impl PartialEq for RulePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.mode == other.mode
    }
}

/// A rule parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleParam {
    /// A compiled pattern.
    Pattern(RulePattern),
    /// Literal text, used for replacement templates.
    Text(String),
    /// A sampling percentage.
    Percent(u8),
}

/// One parsed rule. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    verb: Verb,
    scope: Option<RulePattern>,
    param1: Option<RuleParam>,
    param2: Option<RuleParam>,
    template: Option<String>,
}

impl Rule {
    pub(crate) fn new(
        verb: Verb,
        scope: Option<RulePattern>,
        param1: Option<RuleParam>,
        param2: Option<RuleParam>,
    ) -> Self {
        let template = match &param2 {
            Some(RuleParam::Text(text)) if verb == Verb::Replace => Some(expand_template(text)),
            _ => None,
        };
        Self {
            verb,
            scope,
            param1,
            param2,
            template,
        }
    }

    /// Rule verb.
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// Key scope, always anchored.
    pub fn scope(&self) -> Option<&RulePattern> {
        self.scope.as_ref()
    }

    /// First parameter.
    pub fn param1(&self) -> Option<&RuleParam> {
        self.param1.as_ref()
    }

    /// Second parameter.
    pub fn param2(&self) -> Option<&RuleParam> {
        self.param2.as_ref()
    }

    /// First parameter when it is a pattern.
    pub fn pattern(&self) -> Option<&RulePattern> {
        match &self.param1 {
            Some(RuleParam::Pattern(p)) => Some(p),
            _ => None,
        }
    }

    /// Sampling percentage of a `sample` rule.
    pub fn percent(&self) -> Option<u8> {
        match self.param1 {
            Some(RuleParam::Percent(p)) => Some(p),
            _ => None,
        }
    }

    /// Replacement template of a `replace` rule, in `${n}` form.
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// Whether the scope matches a record key. Rules without scope never match.
    pub fn applies_to(&self, key: &str) -> bool {
        self.scope.as_ref().is_some_and(|s| s.is_match(key))
    }
}

/// Convert a backslash-style replacement template into `${n}` expansion form.
///
/// `\1` and `\g<name>` become group references, `\\`, `\n`, `\r` and `\t`
/// become their literal characters and `$` is escaped. `\0` starts an octal
/// escape of up to two more digits, so `\0` alone is NUL; the whole match is
/// written `\g<0>`. Any other backslash sequence is kept as written.
pub fn expand_template(template: &str) -> String {
    let mut out = String::with_capacity(template.len() + 8);
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '$' => out.push_str("$$"),
            '\\' => match chars.peek().copied() {
                Some('0') => {
                    chars.next();
                    let mut code = 0u8;
                    for _ in 0..2 {
                        match chars.peek().and_then(|d| d.to_digit(8)) {
                            Some(d) => {
                                code = code * 8 + d as u8;
                                chars.next();
                            }
                            None => break,
                        }
                    }
                    out.push(char::from(code));
                }
                Some(d) if d.is_ascii_digit() => {
                    let mut group = String::new();
                    while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                        if group.len() == 2 {
                            break;
                        }
                        group.push(d);
                        chars.next();
                    }
                    out.push_str("${");
                    out.push_str(&group);
                    out.push('}');
                }
                Some('g') => {
                    let mut lookahead = chars.clone();
                    lookahead.next();
                    if lookahead.next() == Some('<') {
                        let name: String = lookahead.clone().take_while(|c| *c != '>').collect();
                        if lookahead.nth(name.chars().count()) == Some('>') && !name.is_empty() {
                            out.push_str("${");
                            out.push_str(&name);
                            out.push('}');
                            chars = lookahead;
                            continue;
                        }
                    }
                    out.push('\\');
                }
                Some('\\') => {
                    chars.next();
                    out.push('\\');
                }
                Some('n') => {
                    chars.next();
                    out.push('\n');
                }
                Some('r') => {
                    chars.next();
                    out.push('\r');
                }
                Some('t') => {
                    chars.next();
                    out.push('\t');
                }
                _ => out.push('\\'),
            },
            c => out.push(c),
        }
    }
    out
}
