//! Field constraints.
//!
//! Constraints run on the submitted text of a field once the value is
//! present and has been coerced to the field's kind. Built-in checks are
//! [`Rule`]s; any `Fn(&str) -> Result<(), String>` is a validator too.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern compiles")
});

/// A check run against a submitted value.
pub trait Validator: Send + Sync {
    /// Returns the message to show when `value` is rejected.
    fn validate(&self, value: &str) -> Result<(), String>;
}

impl<F> Validator for F
where
    F: Fn(&str) -> Result<(), String> + Send + Sync,
{
    fn validate(&self, value: &str) -> Result<(), String> {
        self(value)
    }
}

/// What a [`Rule`] checks.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// At most this many characters.
    MaxLength(usize),
    /// At least this many characters.
    MinLength(usize),
    /// A plain `local@domain.tld` address.
    Email,
    /// An absolute http(s) URL with a host.
    Url,
    /// Text matched by the regex anywhere; anchor it to match the whole.
    Pattern(Regex),
    /// A number within the inclusive bounds.
    Range {
        /// Lower bound, if any.
        min: Option<f64>,
        /// Upper bound, if any.
        max: Option<f64>,
    },
}

impl Constraint {
    fn default_message(&self) -> String {
        match self {
            Self::MaxLength(max) => format!("Ensure this value has at most {max} characters."),
            Self::MinLength(min) => format!("Ensure this value has at least {min} characters."),
            Self::Email => "Enter a valid email address.".to_string(),
            Self::Url => "Enter a valid URL.".to_string(),
            Self::Pattern(_) => "Enter a valid value.".to_string(),
            Self::Range { min, max } => match (min, max) {
                (Some(min), Some(max)) => format!("Value must be between {min} and {max}."),
                (Some(min), None) => format!("Value must be at least {min}."),
                (None, Some(max)) => format!("Value must be at most {max}."),
                (None, None) => "Invalid value.".to_string(),
            },
        }
    }

    fn holds(&self, value: &str) -> Result<bool, String> {
        Ok(match self {
            Self::MaxLength(max) => value.chars().count() <= *max,
            Self::MinLength(min) => value.chars().count() >= *min,
            Self::Email => EMAIL_PATTERN.is_match(value.trim()),
            Self::Url => value
                .strip_prefix("https://")
                .or_else(|| value.strip_prefix("http://"))
                .is_some_and(|host| !host.is_empty() && !host.starts_with('/')),
            Self::Pattern(pattern) => pattern.is_match(value),
            Self::Range { min, max } => {
                let num: f64 = value
                    .trim()
                    .parse()
                    .map_err(|_| "Enter a valid number.".to_string())?;
                !(min.is_some_and(|min| num < min) || max.is_some_and(|max| num > max))
            }
        })
    }
}

/// A built-in constraint with the message shown when it fails.
#[derive(Clone)]
pub struct Rule {
    constraint: Constraint,
    message: String,
}

impl Rule {
    /// Creates a rule with the constraint's default message.
    pub fn new(constraint: Constraint) -> Self {
        let message = constraint.default_message();
        Self {
            constraint,
            message,
        }
    }

    /// Rejects text longer than `max` characters.
    pub fn max_length(max: usize) -> Self {
        Self::new(Constraint::MaxLength(max))
    }

    /// Rejects text shorter than `min` characters.
    pub fn min_length(min: usize) -> Self {
        Self::new(Constraint::MinLength(min))
    }

    /// Accepts an email address.
    pub fn email() -> Self {
        Self::new(Constraint::Email)
    }

    /// Accepts an absolute http or https URL.
    pub fn url() -> Self {
        Self::new(Constraint::Url)
    }

    /// Accepts a number within the inclusive bounds. Non-numeric text is
    /// rejected with `"Enter a valid number."`.
    ///
    /// ```rust
    /// use oxide_forms::validation::{Constraint, Rule, Validator};
    ///
    /// let adult = Rule::range(Some(18.0), None);
    /// assert!(matches!(adult.constraint(), Constraint::Range { min: Some(_), max: None }));
    /// assert_eq!(adult.validate("17").unwrap_err(), "Value must be at least 18.");
    /// assert!(adult.validate("18").is_ok());
    /// ```
    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Self::new(Constraint::Range { min, max })
    }

    /// Creates a rule matching `pattern`.
    ///
    /// # Errors
    ///
    /// Returns the regex error when `pattern` does not compile.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::new(Constraint::Pattern(Regex::new(pattern)?)))
    }

    /// Replaces the failure message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Returns what the rule checks.
    pub const fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    /// Returns the failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.constraint)
    }
}

impl Validator for Rule {
    fn validate(&self, value: &str) -> Result<(), String> {
        if self.constraint.holds(value)? {
            Ok(())
        } else {
            Err(self.message.clone())
        }
    }
}
