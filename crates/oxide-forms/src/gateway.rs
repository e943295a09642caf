//! The validation gateway: payload + schema -> [`ValidationResult`].

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ValidationErrors;
use crate::path::insert_path;
use crate::payload::{FormData, FormEntry};
use crate::result::ValidationResult;
use crate::schema::{FieldDef, FieldKind, Schema};

const REQUIRED: &str = "This field is required.";
const NOT_TEXT: &str = "Expected a text value.";

/// Validates a submitted payload against a schema.
///
/// Never fails: missing or malformed fields are reported in the result's
/// errors, keyed by field path. Entries that are not part of the schema,
/// uploaded files in particular, are ignored and stay available on
/// `payload` for the caller.
///
/// Fields that fail coercion echo the submitted text in the data so a
/// re-rendered form keeps what the user typed.
pub fn validate(payload: &FormData, schema: &Schema) -> ValidationResult {
    let mut data = Map::new();
    let mut errors = ValidationErrors::new();

    for field in schema.fields() {
        let value = match &field.kind {
            FieldKind::MultipleChoice { .. } => coerce_many(field, payload, &mut errors),
            _ => coerce_single(field, payload, &mut errors),
        };
        insert_path(&mut data, &field.name, value);
    }

    let id = payload
        .form_id()
        .map_or_else(|| schema.id(), str::to_string);

    debug!(
        form = %id,
        fields = schema.fields().len(),
        invalid = errors.len(),
        "validated form payload"
    );

    ValidationResult::posted(id, data, errors)
}

fn coerce_single(field: &FieldDef, payload: &FormData, errors: &mut ValidationErrors) -> Value {
    let raw = match payload.get(&field.name) {
        Some(FormEntry::Text(text)) => Some(text.as_str()),
        Some(FormEntry::File(_)) => {
            errors.add(&field.name, NOT_TEXT);
            return field.initial_value();
        }
        None => None,
    };

    if field.kind == FieldKind::Boolean {
        return coerce_checkbox(field, raw, errors);
    }

    let Some(raw) = raw.filter(|text| !text.trim().is_empty()) else {
        if field.required {
            errors.add(&field.name, REQUIRED);
            return field.initial_value();
        }
        return fill_default(field, errors);
    };

    check(field, &field.name, raw, errors)
}

/// Stands in the declared default for a missing optional field, held to
/// the same checks as a submitted value.
fn fill_default(field: &FieldDef, errors: &mut ValidationErrors) -> Value {
    let text = match &field.default {
        Some(Value::String(text)) if !text.trim().is_empty() => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(value) => return value.clone(),
        None => return field.kind.default_value(),
    };
    check(field, &field.name, &text, errors)
}

fn coerce_checkbox(field: &FieldDef, raw: Option<&str>, errors: &mut ValidationErrors) -> Value {
    match field.kind.coerce(raw.unwrap_or("")) {
        Ok(Value::Bool(false)) if field.required => {
            errors.add(&field.name, REQUIRED);
            Value::Bool(false)
        }
        Ok(value) => value,
        Err(message) => {
            errors.add(&field.name, message);
            Value::String(raw.unwrap_or_default().to_string())
        }
    }
}

fn coerce_many(field: &FieldDef, payload: &FormData, errors: &mut ValidationErrors) -> Value {
    let mut values = Vec::new();

    for (index, entry) in payload.get_all(&field.name).enumerate() {
        let path = format!("{}[{index}]", field.name);
        match entry {
            FormEntry::Text(text) if text.is_empty() => {}
            FormEntry::Text(text) => values.push(check(field, &path, text, errors)),
            FormEntry::File(_) => errors.add(&path, NOT_TEXT),
        }
    }

    if values.is_empty() {
        if field.required && !errors.contains(&field.name) {
            errors.add(&field.name, REQUIRED);
        }
        return field.initial_value();
    }

    Value::Array(values)
}

/// Coerces a present value and runs the field's validators on it.
fn check(field: &FieldDef, path: &str, raw: &str, errors: &mut ValidationErrors) -> Value {
    match field.kind.coerce(raw) {
        Ok(value) => {
            for validator in &field.validators {
                if let Err(message) = validator.validate(raw) {
                    errors.add(path, message);
                }
            }
            value
        }
        Err(message) => {
            errors.add(path, message);
            Value::String(raw.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{UploadedFile, FORM_ID_FIELD};
    use serde_json::json;

    fn contact_schema() -> Schema {
        Schema::new()
            .with_id("contact")
            .field(FieldDef::text("name").required().min_length(2))
            .field(FieldDef::email("email").required())
            .field(FieldDef::integer("age").range(Some(18.0), None))
            .field(FieldDef::boolean("subscribe"))
    }

    #[test]
    fn test_valid_payload() {
        let payload: FormData = [
            ("name", "Ada"),
            ("email", "ada@example.com"),
            ("age", "36"),
            ("subscribe", "on"),
        ]
        .into_iter()
        .collect();

        let result = validate(&payload, &contact_schema());
        assert!(result.is_valid());
        assert!(result.errors().is_empty());
        assert_eq!(
            Value::Object(result.data().clone()),
            json!({"name": "Ada", "email": "ada@example.com", "age": 36, "subscribe": true})
        );
    }

    #[test]
    fn test_missing_required_email() {
        let payload: FormData = [("name", "Ada")].into_iter().collect();
        let result = validate(&payload, &contact_schema());

        assert!(!result.is_valid());
        assert_eq!(result.errors_for("email"), [REQUIRED.to_string()]);
        assert_eq!(result.errors().fields().collect::<Vec<_>>(), vec!["email"]);
        assert_eq!(result.value("age"), Some(&Value::Null));
        assert_eq!(result.value("subscribe"), Some(&json!(false)));
    }

    #[test]
    fn test_errors_keyed_by_offending_fields_only() {
        let payload: FormData = [
            ("name", "A"),
            ("email", "not-an-email"),
            ("age", "twelve"),
        ]
        .into_iter()
        .collect();
        let result = validate(&payload, &contact_schema());

        assert_eq!(
            result.errors().fields().collect::<Vec<_>>(),
            vec!["age", "email", "name"]
        );
        assert_eq!(result.errors_for("age"), ["Enter a whole number.".to_string()]);
        assert_eq!(result.value("age"), Some(&json!("twelve")));
        assert_eq!(result.value("email"), Some(&json!("not-an-email")));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let payload: FormData = [("name", ""), ("age", "17")].into_iter().collect();
        let schema = contact_schema();
        assert_eq!(validate(&payload, &schema), validate(&payload, &schema));
    }

    #[test]
    fn test_files_are_left_to_the_caller() {
        let schema = Schema::new().field(FieldDef::text("title").required());
        let payload = FormData::new()
            .text_field("title", "Holiday")
            .file_field("photo", UploadedFile::new("beach.jpg", &b"jpeg"[..]));

        let result = validate(&payload, &schema);
        assert!(result.is_valid());
        assert!(result.value("photo").is_none());

        let photo = payload.file("photo").unwrap();
        assert_eq!(photo.file_name, "beach.jpg");
    }

    #[test]
    fn test_file_in_text_field_is_an_error() {
        let schema = Schema::new().field(FieldDef::text("title"));
        let payload =
            FormData::new().file_field("title", UploadedFile::new("x.txt", &b"x"[..]));

        let result = validate(&payload, &schema);
        assert_eq!(result.errors_for("title"), [NOT_TEXT.to_string()]);
    }

    #[test]
    fn test_required_checkbox_must_be_ticked() {
        let schema = Schema::new().field(FieldDef::boolean("terms").required());

        let unticked = validate(&FormData::new(), &schema);
        assert_eq!(unticked.errors_for("terms"), [REQUIRED.to_string()]);

        let ticked = validate(&[("terms", "on")].into_iter().collect(), &schema);
        assert!(ticked.is_valid());
    }

    #[test]
    fn test_multiple_choice_element_paths() {
        let schema = Schema::new().field(
            FieldDef::multiple_choice("tags", ["rust", "web", "cli"]).required(),
        );

        let payload: FormData = [("tags", "rust"), ("tags", "go")].into_iter().collect();
        let result = validate(&payload, &schema);
        assert!(result.errors_for("tags[0]").is_empty());
        assert_eq!(result.errors_for("tags[1]").len(), 1);
        assert_eq!(result.value("tags"), Some(&json!(["rust", "go"])));

        let empty = validate(&FormData::new(), &schema);
        assert_eq!(empty.errors_for("tags"), [REQUIRED.to_string()]);
    }

    #[test]
    fn test_nested_paths_and_optional_defaults() {
        let schema = Schema::new()
            .field(FieldDef::text("address.city").required())
            .field(FieldDef::date("address.since"))
            .field(FieldDef::choice("plan", ["free", "pro"]).default_value("free"));

        let payload: FormData = [("address.city", "Lyon")].into_iter().collect();
        let result = validate(&payload, &schema);

        assert!(result.is_valid());
        assert_eq!(
            Value::Object(result.data().clone()),
            json!({"address": {"city": "Lyon", "since": null}, "plan": "free"})
        );
    }

    #[test]
    fn test_missing_optional_number_stays_empty() {
        let payload: FormData = [("name", "Ada"), ("email", "ada@example.com")]
            .into_iter()
            .collect();
        let result = validate(&payload, &contact_schema());

        assert!(result.is_valid());
        assert_eq!(result.value("age"), Some(&Value::Null));
    }

    #[test]
    fn test_declared_default_is_checked() {
        let schema = Schema::new()
            .field(FieldDef::integer("seats").range(Some(1.0), Some(10.0)).default_value(2))
            .field(FieldDef::integer("floor").range(Some(1.0), None).default_value(0))
            .field(FieldDef::choice("plan", ["free", "pro"]).default_value("gold"));

        let result = validate(&FormData::new(), &schema);

        assert_eq!(result.value("seats"), Some(&json!(2)));
        assert!(result.errors_for("seats").is_empty());
        assert_eq!(
            result.errors_for("floor"),
            ["Value must be at least 1.".to_string()]
        );
        assert_eq!(result.errors_for("plan").len(), 1);
        assert!(!result.is_valid());
    }

    #[test]
    fn test_valid_data_meets_every_constraint() {
        let schema = Schema::new()
            .field(FieldDef::integer("age").range(Some(18.0), None))
            .field(FieldDef::number("score").range(Some(0.5), Some(1.0)))
            .field(FieldDef::text("nickname").min_length(3));
        let payloads: [FormData; 3] = [
            FormData::new(),
            [("age", "21")].into_iter().collect(),
            [("score", "0.75"), ("nickname", "ada")].into_iter().collect(),
        ];

        for payload in &payloads {
            let result = validate(payload, &schema);
            assert!(result.is_valid());
            for field in schema.fields() {
                let text = match result.value(&field.name) {
                    Some(Value::Number(number)) => number.to_string(),
                    Some(Value::String(text)) if !text.is_empty() => text.clone(),
                    _ => continue,
                };
                for validator in &field.validators {
                    assert!(validator.validate(&text).is_ok(), "{} = {text}", field.name);
                }
            }
        }
    }

    #[test]
    fn test_form_id_from_payload() {
        let schema = contact_schema();
        let payload: FormData = [(FORM_ID_FIELD, "newsletter")].into_iter().collect();
        assert_eq!(validate(&payload, &schema).id(), "newsletter");
        assert_eq!(validate(&FormData::new(), &schema).id(), "contact");
    }

    #[test]
    fn test_validators_run_in_declaration_order() {
        let schema = Schema::new().field(
            FieldDef::text("username")
                .min_length(5)
                .validator(|value: &str| {
                    if value.chars().all(|c| c.is_ascii_lowercase()) {
                        Ok(())
                    } else {
                        Err("Use lowercase letters only.".to_string())
                    }
                }),
        );

        let payload: FormData = [("username", "Ab")].into_iter().collect();
        let result = validate(&payload, &schema);
        assert_eq!(
            result.errors_for("username"),
            [
                "Ensure this value has at least 5 characters.".to_string(),
                "Use lowercase letters only.".to_string(),
            ]
        );
        assert_eq!(result.value("username"), Some(&json!("Ab")));
    }
}
