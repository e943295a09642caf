//! Form schemas: field definitions, kinds and constraints.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{FormError, Result};
use crate::path::insert_path;
use crate::result::ValidationResult;
use crate::validation::{Rule, Validator};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// The type a field's submitted text is coerced to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text.
    Text,
    /// An email address.
    Email,
    /// An absolute http(s) URL.
    Url,
    /// A signed 64-bit integer.
    Integer,
    /// A finite floating point number.
    Number,
    /// A checkbox; absent means `false`.
    Boolean,
    /// An ISO `YYYY-MM-DD` date.
    Date,
    /// One value out of a fixed set.
    Choice { options: Vec<String> },
    /// Any number of values out of a fixed set, submitted as repeated entries.
    MultipleChoice { options: Vec<String> },
}

impl FieldKind {
    /// The value an optional field takes when nothing was submitted.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Text | Self::Email | Self::Url => Value::String(String::new()),
            Self::Boolean => Value::Bool(false),
            Self::Integer | Self::Number | Self::Date | Self::Choice { .. } => Value::Null,
            Self::MultipleChoice { .. } => Value::Array(Vec::new()),
        }
    }

    /// The HTML input type used when rendering this kind.
    pub fn input_type(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Url => "url",
            Self::Integer | Self::Number => "number",
            Self::Boolean => "checkbox",
            Self::Date => "date",
            Self::Choice { .. } | Self::MultipleChoice { .. } => "select",
        }
    }

    /// Returns the allowed options for choice kinds.
    pub fn options(&self) -> Option<&[String]> {
        match self {
            Self::Choice { options } | Self::MultipleChoice { options } => Some(options),
            _ => None,
        }
    }

    /// Coerces a single non-blank submitted value.
    pub(crate) fn coerce(&self, raw: &str) -> std::result::Result<Value, String> {
        match self {
            Self::Text | Self::Email | Self::Url => Ok(Value::String(raw.to_string())),
            Self::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| "Enter a whole number.".to_string()),
            Self::Number => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| "Enter a number.".to_string()),
            Self::Boolean => parse_bool(raw)
                .map(Value::Bool)
                .ok_or_else(|| "Enter a valid boolean.".to_string()),
            Self::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
                .map_err(|_| "Enter a valid date.".to_string()),
            Self::Choice { options } | Self::MultipleChoice { options } => {
                if options.iter().any(|option| option == raw) {
                    Ok(Value::String(raw.to_string()))
                } else {
                    Err(format!(
                        "Select a valid choice. {raw} is not one of the available choices."
                    ))
                }
            }
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}

/// Definition of a schema field.
pub struct FieldDef {
    /// Field name; dots nest the value in the parsed data.
    pub name: String,
    /// Human readable label.
    pub label: String,
    /// Value kind.
    pub kind: FieldKind,
    /// Whether a value must be submitted.
    pub required: bool,
    /// Value used when an optional field is missing.
    pub default: Option<Value>,
    /// Help text.
    pub help_text: Option<String>,
    /// Constraint validators, run in order.
    pub validators: Vec<Box<dyn Validator>>,
}

impl std::fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("default", &self.default)
            .field("validators", &self.validators.len())
            .finish_non_exhaustive()
    }
}

impl FieldDef {
    /// Creates a new field definition.
    ///
    /// Email and URL kinds get their format validator attached.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        let mut validators: Vec<Box<dyn Validator>> = Vec::new();
        match kind {
            FieldKind::Email => validators.push(Box::new(Rule::email())),
            FieldKind::Url => validators.push(Box::new(Rule::url())),
            _ => {}
        }

        Self {
            label: label_from_name(&name),
            name,
            kind,
            required: false,
            default: None,
            help_text: None,
            validators,
        }
    }

    /// Creates a text field.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    /// Creates an email field.
    pub fn email(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Email)
    }

    /// Creates a URL field.
    pub fn url(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Url)
    }

    /// Creates an integer field.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    /// Creates a number field.
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Number)
    }

    /// Creates a checkbox field.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    /// Creates a date field.
    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Date)
    }

    /// Creates a single choice field.
    pub fn choice<S: Into<String>>(
        name: impl Into<String>,
        options: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(
            name,
            FieldKind::Choice {
                options: options.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// Creates a multiple choice field.
    pub fn multiple_choice<S: Into<String>>(
        name: impl Into<String>,
        options: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(
            name,
            FieldKind::MultipleChoice {
                options: options.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// Makes the field required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets help text.
    #[must_use]
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = Some(text.into());
        self
    }

    /// Adds a validator.
    #[must_use]
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Adds a minimum length constraint.
    #[must_use]
    pub fn min_length(self, min: usize) -> Self {
        self.validator(Rule::min_length(min))
    }

    /// Adds a maximum length constraint.
    #[must_use]
    pub fn max_length(self, max: usize) -> Self {
        self.validator(Rule::max_length(max))
    }

    /// Adds a numeric range constraint.
    #[must_use]
    pub fn range(self, min: Option<f64>, max: Option<f64>) -> Self {
        self.validator(Rule::range(min, max))
    }

    /// The value this field takes when nothing usable was submitted.
    pub fn initial_value(&self) -> Value {
        self.default
            .clone()
            .unwrap_or_else(|| self.kind.default_value())
    }
}

/// Turns `first_name` or `address.zip_code` into `First name` / `Zip code`.
fn label_from_name(name: &str) -> String {
    let last = name.rsplit('.').next().unwrap_or(name);
    let words = last.replace(['_', '-'], " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A declarative form schema.
#[derive(Debug, Default)]
pub struct Schema {
    id: Option<String>,
    fields: Vec<FieldDef>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an explicit form id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Adds a field, replacing any earlier field with the same name.
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.retain(|existing| existing.name != field.name);
        self.fields.push(field);
        self
    }

    /// Returns the field definitions in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Returns the form id.
    ///
    /// Without an explicit id this is the 64-bit FNV-1a hash of the field
    /// names, each followed by a NUL byte, in lowercase hex. The value does
    /// not depend on the toolchain that built the binary.
    pub fn id(&self) -> String {
        if let Some(id) = &self.id {
            return id.clone();
        }
        let hash = self
            .fields
            .iter()
            .flat_map(|field| field.name.bytes().chain(std::iter::once(0)))
            .fold(FNV_OFFSET, |hash, byte| {
                (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
            });
        format!("{hash:016x}")
    }

    /// Returns the default data object.
    pub fn defaults(&self) -> Map<String, Value> {
        let mut data = Map::new();
        for field in &self.fields {
            insert_path(&mut data, &field.name, field.initial_value());
        }
        data
    }

    /// Returns the result used to seed a form on initial page load.
    ///
    /// Nothing has been posted, so it is neither valid nor carries errors.
    pub fn initial(&self) -> ValidationResult {
        ValidationResult::initial(self.id(), self.defaults())
    }

    /// Parses a schema from its JSON description.
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: SchemaSpec = serde_json::from_str(json)?;
        Self::from_spec(spec)
    }

    /// Builds a schema from a deserialized description.
    pub fn from_spec(spec: SchemaSpec) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut schema = Self {
            id: spec.id,
            fields: Vec::with_capacity(spec.fields.len()),
        };

        for field in spec.fields {
            if field.name.is_empty() {
                return Err(FormError::InvalidSchema("field with empty name".into()));
            }
            if !seen.insert(field.name.clone()) {
                return Err(FormError::InvalidSchema(format!(
                    "duplicate field: {}",
                    field.name
                )));
            }
            schema.fields.push(field.into_def()?);
        }

        Ok(schema)
    }
}

/// JSON description of a schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaSpec {
    /// Explicit form id.
    #[serde(default)]
    pub id: Option<String>,
    /// Field descriptions.
    pub fields: Vec<FieldSpec>,
}

/// JSON description of a field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name.
    pub name: String,
    /// Field kind, flattened as `"type": ...`.
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub help_text: Option<String>,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    /// Regex the value must match.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Message shown when `pattern` does not match.
    #[serde(default)]
    pub pattern_message: Option<String>,
}

impl FieldSpec {
    fn into_def(self) -> Result<FieldDef> {
        let mut def = FieldDef::new(self.name, self.kind);
        def.required = self.required;
        def.default = self.default;
        def.help_text = self.help_text;
        if let Some(label) = self.label {
            def.label = label;
        }
        if let Some(min) = self.min_length {
            def = def.min_length(min);
        }
        if let Some(max) = self.max_length {
            def = def.max_length(max);
        }
        if self.min.is_some() || self.max.is_some() {
            def = def.range(self.min, self.max);
        }
        if let Some(pattern) = self.pattern {
            let message = self
                .pattern_message
                .unwrap_or_else(|| "Enter a value in the expected format.".to_string());
            let rule = Rule::pattern(&pattern).map_err(|source| FormError::InvalidPattern {
                field: def.name.clone(),
                source,
            })?;
            def = def.validator(rule.with_message(message));
        }
        Ok(def)
    }
}
