//! Declarative input validation.
//!
//! Inputs implement [`Validate`] by chaining rules on a [`Rules`] builder.
//! The first rule that fails wins and becomes the [`Violation`] reported to
//! the client. Validation is pure: no I/O, no mutation of the input.
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub reason: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

impl std::error::Error for Violation {}

pub trait Validate {
    fn validate(&self) -> Result<(), Violation>;
}

/// Accumulates the first failing rule.
#[derive(Debug, Default)]
#[must_use = "call finish() to obtain the validation result"]
pub struct Rules {
    violation: Option<Violation>,
}

/// Values a rule can inspect. Optional values pass every rule except
/// [`Rules::required`] when absent.
pub trait FieldValue {
    fn as_text(&self) -> Option<&str>;
    fn is_present(&self) -> bool;
}

impl FieldValue for String {
    fn as_text(&self) -> Option<&str> {
        Some(self)
    }

    fn is_present(&self) -> bool {
        !self.trim().is_empty()
    }
}

impl FieldValue for Option<String> {
    fn as_text(&self) -> Option<&str> {
        self.as_deref()
    }

    fn is_present(&self) -> bool {
        self.as_deref().is_some_and(|value| !value.trim().is_empty())
    }
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(mut self, field: &str, ok: impl FnOnce() -> bool, reason: impl FnOnce() -> String) -> Self {
        if self.violation.is_none() && !ok() {
            self.violation = Some(Violation::new(field, reason()));
        }
        self
    }

    pub fn required<V: FieldValue>(self, field: &str, value: &V) -> Self {
        self.check(field, || value.is_present(), || "cannot be blank".to_string())
    }

    pub fn length<V: FieldValue>(self, field: &str, value: &V, min: usize, max: usize) -> Self {
        self.check(
            field,
            || {
                value
                    .as_text()
                    .is_none_or(|text| (min..=max).contains(&text.chars().count()))
            },
            || format!("the length must be between {min} and {max}"),
        )
    }

    pub fn one_of<V: FieldValue>(self, field: &str, value: &V, allowed: &[&str]) -> Self {
        self.check(
            field,
            || value.as_text().is_none_or(|text| allowed.contains(&text)),
            || format!("must be one of: {}", allowed.join(", ")),
        )
    }

    pub fn identifier<V: FieldValue>(self, field: &str, value: &V) -> Self {
        self.check(
            field,
            || {
                value
                    .as_text()
                    .is_none_or(|text| pantry_common::ids::check_id(text).is_ok())
            },
            || "must be a valid identifier".to_string(),
        )
    }

    pub fn url<V: FieldValue>(self, field: &str, value: &V) -> Self {
        self.check(
            field,
            || {
                value.as_text().is_none_or(|text| {
                    let rest = text
                        .strip_prefix("https://")
                        .or_else(|| text.strip_prefix("http://"));
                    rest.is_some_and(|host| !host.is_empty() && !host.contains(char::is_whitespace))
                })
            },
            || "must be an http(s) URL".to_string(),
        )
    }

    pub fn range<N>(self, field: &str, value: Option<N>, min: N, max: N) -> Self
    where
        N: PartialOrd + fmt::Display + Copy,
    {
        self.check(
            field,
            || value.is_none_or(|number| number >= min && number <= max),
            || format!("must be between {min} and {max}"),
        )
    }

    pub fn not_empty<T>(self, field: &str, items: &[T]) -> Self {
        self.check(field, || !items.is_empty(), || "cannot be empty".to_string())
    }

    /// Cross-field checks the named rules do not cover.
    pub fn ensure(self, field: &str, ok: bool, reason: &str) -> Self {
        self.check(field, || ok, || reason.to_string())
    }

    /// Fails unless at least one of `present` is true. Used by update
    /// inputs, which must change something.
    pub fn at_least_one(self, present: &[bool]) -> Self {
        self.check(
            "input",
            || present.iter().any(|flag| *flag),
            || "at least one field must be provided".to_string(),
        )
    }

    pub fn finish(self) -> Result<(), Violation> {
        match self.violation {
            Some(violation) => Err(violation),
            None => Ok(()),
        }
    }
}
