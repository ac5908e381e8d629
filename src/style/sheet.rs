//! Style tag registry.
//!
//! A [`StyleSheet`] maps logical style tags (`"button"`, `"button-active"`)
//! to the ordered list of concrete class names each one stands for. It can
//! be built in code or parsed from a line-oriented text form:
//!
//! ```text
//! # comment
//! button: btn btn-bordered
//! button-active: btn-active
//! ```

use std::collections::HashMap;
use std::str::FromStr;

/// Errors from style sheet parsing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: expected `tag: class ...`")]
    MissingColon { line: usize },
    #[error("line {line}: empty tag name")]
    EmptyTag { line: usize },
    #[error("line {line}: tag `{tag}` is defined twice")]
    DuplicateTag { line: usize, tag: String },
}

/// Registry of style tags and the classes they resolve to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    tags: HashMap<String, Vec<String>>,
}

impl StyleSheet {
    /// Create an empty sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a tag (builder). Redefining a tag replaces it.
    pub fn define(mut self, tag: impl Into<String>, classes: &[&str]) -> Self {
        self.insert(tag, classes);
        self
    }

    /// Define or replace a tag. Duplicate class names are dropped, order is
    /// kept.
    pub fn insert(&mut self, tag: impl Into<String>, classes: &[&str]) {
        let mut resolved: Vec<String> = Vec::with_capacity(classes.len());
        for class in classes {
            if !resolved.iter().any(|c| c == class) {
                resolved.push((*class).to_owned());
            }
        }
        self.tags.insert(tag.into(), resolved);
    }

    /// Parse the `tag: class class` text form.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let mut sheet = Self::new();
        for (index, raw) in input.lines().enumerate() {
            let line = index + 1;
            let text = raw.split('#').next().unwrap_or_default().trim();
            if text.is_empty() {
                continue;
            }
            let (tag, classes) = text
                .split_once(':')
                .ok_or(ParseError::MissingColon { line })?;
            let tag = tag.trim();
            if tag.is_empty() {
                return Err(ParseError::EmptyTag { line });
            }
            if sheet.contains(tag) {
                return Err(ParseError::DuplicateTag {
                    line,
                    tag: tag.to_owned(),
                });
            }
            let classes: Vec<&str> = classes.split_whitespace().collect();
            sheet.insert(tag, &classes);
        }
        Ok(sheet)
    }

    /// The classes `tag` resolves to. Unknown tags resolve to nothing.
    pub fn resolve(&self, tag: &str) -> &[String] {
        match self.tags.get(tag) {
            Some(classes) => classes,
            None => {
                tracing::debug!(tag, "unknown style tag");
                &[]
            }
        }
    }

    /// Whether `tag` is defined.
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    /// Number of defined tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether no tag is defined.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl FromStr for StyleSheet {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn define_and_resolve() {
        let sheet = StyleSheet::new()
            .define("button", &["btn", "btn-bordered", "btn"])
            .define("active", &["is-active"]);
        assert_eq!(sheet.resolve("button"), &["btn", "btn-bordered"]);
        assert_eq!(sheet.resolve("active"), &["is-active"]);
        assert_eq!(sheet.len(), 2);
    }

    #[test]
    fn unknown_tag_resolves_to_nothing() {
        let sheet = StyleSheet::new();
        assert!(sheet.resolve("nope").is_empty());
        assert!(sheet.is_empty());
    }

    #[test]
    fn parse_text_form() {
        let sheet: StyleSheet = "
            # buttons
            button: btn btn-bordered
            button-active: btn-active   # trailing comment
            spacer:
        "
        .parse()
        .unwrap();
        assert_eq!(sheet.resolve("button"), &["btn", "btn-bordered"]);
        assert_eq!(sheet.resolve("button-active"), &["btn-active"]);
        assert!(sheet.contains("spacer"));
        assert!(sheet.resolve("spacer").is_empty());
    }

    #[test]
    fn parse_errors_carry_line() {
        assert_eq!(
            StyleSheet::parse("a: x\nbroken"),
            Err(ParseError::MissingColon { line: 2 })
        );
        assert_eq!(
            StyleSheet::parse(" : x"),
            Err(ParseError::EmptyTag { line: 1 })
        );
        assert_eq!(
            StyleSheet::parse("a: x\na: y"),
            Err(ParseError::DuplicateTag {
                line: 2,
                tag: "a".into()
            })
        );
    }
}
