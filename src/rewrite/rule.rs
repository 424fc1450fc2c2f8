//! Ordered regex rewrite rules.

use regex::Regex;
use std::borrow::Cow;

/// One `(pattern, replacement)` pair. The replacement uses `regex`
/// expansion syntax (`${1}`).
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pattern: Regex,
    replacement: String,
}

impl RewriteRule {
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: replacement.into(),
        })
    }

    /// Apply to `input`, borrowing through when nothing matches.
    pub fn apply<'a>(&self, input: Cow<'a, str>) -> Cow<'a, str> {
        let changed = match self.pattern.replace_all(&input, self.replacement.as_str()) {
            Cow::Owned(changed) => Some(changed),
            Cow::Borrowed(_) => None,
        };
        changed.map_or(input, Cow::Owned)
    }
}

/// Rules applied strictly in insertion order. Later rules see the output of
/// earlier ones, so order is part of the contract.
#[derive(Debug, Clone, Default)]
pub struct RulePipeline {
    rules: Vec<RewriteRule>,
}

impl RulePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, pattern: &str, replacement: impl Into<String>) -> Result<Self, regex::Error> {
        self.rules.push(RewriteRule::new(pattern, replacement)?);
        Ok(self)
    }

    /// Append every rule of `other` after this pipeline's rules.
    pub fn then(mut self, other: &RulePipeline) -> Self {
        self.rules.extend(other.rules.iter().cloned());
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn apply<'a>(&self, content: &'a str) -> Cow<'a, str> {
        self.rules
            .iter()
            .fold(Cow::Borrowed(content), |acc, rule| rule.apply(acc))
    }
}

/// Escape text spliced into a replacement template.
pub fn literal(text: &str) -> String {
    text.replace('$', "$$")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_apply_in_order() {
        let pipeline = RulePipeline::new()
            .rule("a", "b")
            .unwrap()
            .rule("b", "c")
            .unwrap();
        assert_eq!(pipeline.apply("a"), "c");

        let reversed = RulePipeline::new()
            .rule("b", "c")
            .unwrap()
            .rule("a", "b")
            .unwrap();
        assert_eq!(reversed.apply("a"), "b");
    }

    #[test]
    fn test_unchanged_input_is_borrowed() {
        let pipeline = RulePipeline::new().rule("x", "y").unwrap();
        assert!(matches!(pipeline.apply("abc"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_then_concatenates() {
        let first = RulePipeline::new().rule("1", "2").unwrap();
        let second = RulePipeline::new().rule("2", "3").unwrap();
        let combined = first.then(&second);
        assert_eq!(combined.len(), 2);
        assert_eq!(combined.apply("1"), "3");
    }

    #[test]
    fn test_literal_escapes_dollar() {
        let rule = RewriteRule::new("x", literal("$1")).unwrap();
        assert_eq!(rule.apply(Cow::Borrowed("x")), "$1");
    }
}
