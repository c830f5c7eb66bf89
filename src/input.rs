use crate::mcp::errors;
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::LazyLock;

static CLOZE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{c\d+::.+?\}\}").expect("valid cloze regex"));

pub fn has_cloze_marker(text: &str) -> bool {
    CLOZE_MARKER.is_match(text)
}

#[derive(Debug, Clone)]
pub struct InputError {
    pub kind: &'static str,
    pub message: String,
}

impl InputError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            kind: errors::INVALID_INPUT,
            message: message.into(),
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for InputError {}

/// Reads tool arguments field by field, collecting every violation so the
/// caller can report them all at once.
pub struct Arguments<'a> {
    obj: Option<&'a Map<String, Value>>,
    violations: Vec<String>,
}

impl<'a> Arguments<'a> {
    pub fn new(args: &'a Value) -> Self {
        let obj = args.as_object();
        let violations = if obj.is_none() {
            vec!["arguments must be an object".to_string()]
        } else {
            Vec::new()
        };
        Self { obj, violations }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.obj
            .and_then(|obj| obj.get(key))
            .filter(|value| !value.is_null())
    }

    fn violation(&mut self, message: String) {
        self.violations.push(message);
    }

    pub fn required_string(&mut self, key: &str) -> Option<String> {
        if self.obj.is_none() {
            return None;
        }
        match self.get(key) {
            None => {
                self.violation(format!("{key} is required"));
                None
            }
            Some(_) => self.optional_string(key),
        }
    }

    /// A present string must not be blank; surrounding whitespace is trimmed.
    pub fn optional_string(&mut self, key: &str) -> Option<String> {
        let value = self.get(key)?;
        let Some(text) = value.as_str() else {
            self.violation(format!("{key} must be a string"));
            return None;
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.violation(format!("{key} must not be empty"));
            return None;
        }
        Some(trimmed.to_string())
    }

    /// Like [`Arguments::optional_string`] but keeps an empty string, which
    /// is how a caller clears a field.
    pub fn optional_text(&mut self, key: &str) -> Option<String> {
        let value = self.get(key)?;
        match value.as_str() {
            Some(text) => Some(text.to_string()),
            None => {
                self.violation(format!("{key} must be a string"));
                None
            }
        }
    }

    /// Cloze text must contain at least one `{{cN::...}}` deletion.
    pub fn cloze_text(&mut self, key: &str, required: bool) -> Option<String> {
        let text = if required {
            self.required_string(key)?
        } else {
            self.optional_string(key)?
        };
        if !has_cloze_marker(&text) {
            self.violation(format!(
                "{key} must contain at least one cloze deletion such as {{{{c1::answer}}}}"
            ));
            return None;
        }
        Some(text)
    }

    /// Accepts an integer or a string of digits.
    pub fn required_id(&mut self, key: &str) -> Option<i64> {
        if self.obj.is_none() {
            return None;
        }
        let Some(value) = self.get(key) else {
            self.violation(format!("{key} is required"));
            return None;
        };
        let parsed = match value {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse::<i64>().ok(),
            _ => None,
        };
        match parsed {
            Some(id) if id > 0 => Some(id),
            _ => {
                self.violation(format!("{key} must be a positive integer"));
                None
            }
        }
    }

    /// Accepts a list of strings, or one string of tags separated by
    /// whitespace or commas. Blank entries are dropped.
    pub fn optional_tags(&mut self, key: &str) -> Option<Vec<String>> {
        let value = self.get(key)?;
        match value {
            Value::Array(items) => {
                let mut tags = Vec::with_capacity(items.len());
                for item in items {
                    match item.as_str() {
                        Some(tag) if !tag.trim().is_empty() => tags.push(tag.trim().to_string()),
                        Some(_) => {}
                        None => {
                            self.violation(format!("{key} must contain only strings"));
                            return None;
                        }
                    }
                }
                Some(tags)
            }
            Value::String(text) => Some(
                text.split(|c: char| c.is_whitespace() || c == ',')
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            _ => {
                self.violation(format!("{key} must be a list of strings"));
                None
            }
        }
    }

    /// Fails with every collected violation, joined in the order found.
    pub fn finish(self) -> Result<(), InputError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(InputError::invalid_input(self.violations.join("; ")))
        }
    }
}
