//! Bootstrap 5 rendering of a schema and its latest result.
//!
//! Used as the no-script fallback: the handler re-renders the page with the
//! submitted values preserved and the field errors shown inline.

use ironhtml::html;
use ironhtml::typed::Element;
use ironhtml_elements::{Div, Li, Ul};
use serde_json::Value;

use crate::error::ValidationErrors;
use crate::payload::FORM_ID_FIELD;
use crate::result::ValidationResult;
use crate::schema::{FieldDef, FieldKind, Schema};

/// Options for [`render_bootstrap_form`].
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Form action URL.
    pub action: String,
    /// Form method.
    pub method: String,
    /// Class added to the wrapper of every invalid field.
    pub error_class: Option<String>,
    /// Whether the form posts files.
    pub multipart: bool,
    /// Submit button label.
    pub submit_label: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            action: String::new(),
            method: "POST".to_string(),
            error_class: None,
            multipart: false,
            submit_label: "Submit".to_string(),
        }
    }
}

impl RenderOptions {
    /// Creates options posting to `action`.
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    /// Sets the wrapper error class.
    #[must_use]
    pub fn error_class(mut self, class: impl Into<String>) -> Self {
        self.error_class = Some(class.into());
        self
    }

    /// Marks the form as `multipart/form-data`.
    #[must_use]
    pub fn multipart(mut self) -> Self {
        self.multipart = true;
        self
    }
}

/// Escapes HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_selected(value: Option<&Value>, option: &str) -> bool {
    match value {
        Some(Value::String(s)) => s == option,
        Some(Value::Array(items)) => items.iter().any(|item| item.as_str() == Some(option)),
        _ => false,
    }
}

/// Renders the input element for a field.
pub fn render_input(field: &FieldDef, value: Option<&Value>, invalid: bool) -> String {
    let id = html_escape(&format!("id_{}", field.name));
    let name = html_escape(&field.name);
    let required = if field.required { " required" } else { "" };
    let invalid_class = if invalid { " is-invalid" } else { "" };

    match &field.kind {
        FieldKind::Boolean => {
            let checked = if value.and_then(Value::as_bool).unwrap_or(false) {
                " checked"
            } else {
                ""
            };
            format!(
                r#"<input type="checkbox" class="form-check-input{invalid_class}" id="{id}" name="{name}"{checked}{required}>"#
            )
        }
        FieldKind::Choice { options } | FieldKind::MultipleChoice { options } => {
            let multiple = matches!(field.kind, FieldKind::MultipleChoice { .. });
            let mut html = String::new();
            if !multiple {
                html.push_str(r#"<option value="">---------</option>"#);
            }
            for option in options {
                let selected = if is_selected(value, option) {
                    " selected"
                } else {
                    ""
                };
                let option = html_escape(option);
                html.push_str(&format!(
                    r#"<option value="{option}"{selected}>{option}</option>"#
                ));
            }
            let multiple_attr = if multiple { " multiple" } else { "" };
            format!(
                r#"<select class="form-select{invalid_class}" id="{id}" name="{name}"{multiple_attr}{required}>{html}</select>"#
            )
        }
        kind => {
            let value_attr = value
                .map(value_text)
                .filter(|v| !v.is_empty())
                .map(|v| format!(r#" value="{}""#, html_escape(&v)))
                .unwrap_or_default();
            let step = if *kind == FieldKind::Number {
                r#" step="any""#
            } else {
                ""
            };
            format!(
                r#"<input type="{}" class="form-control{invalid_class}" id="{id}" name="{name}"{value_attr}{step}{required}>"#,
                kind.input_type()
            )
        }
    }
}

/// Renders a form field with Bootstrap 5 styling.
pub fn render_bootstrap_field(
    field: &FieldDef,
    value: Option<&Value>,
    errors: &[String],
    error_class: Option<&str>,
) -> String {
    let id = format!("id_{}", field.name);
    let has_errors = !errors.is_empty();

    let required_marker = if field.required { " *" } else { "" };
    let label_text = format!("{}{}", field.label, required_marker);
    let label_class = if field.kind == FieldKind::Boolean {
        "form-check-label"
    } else {
        "form-label"
    };

    let mut wrapper_class = if field.kind == FieldKind::Boolean {
        "mb-3 form-check".to_string()
    } else {
        "mb-3".to_string()
    };
    if let Some(class) = error_class.filter(|_| has_errors) {
        wrapper_class = format!("{wrapper_class} {class}");
    }

    let input_html = render_input(field, value, has_errors);
    let label_el = html! {
        label.for_(#id).class(#label_class) { #label_text }
    };

    let help_text = field.help_text.clone();

    let wrapper = html! { div.class(#wrapper_class) };
    let wrapper = if field.kind == FieldKind::Boolean {
        wrapper.raw(&input_html).raw(label_el.render())
    } else {
        wrapper.raw(label_el.render()).raw(&input_html)
    };

    wrapper
        .children(errors, |error, div: Element<Div>| {
            div.class("invalid-feedback").text(error)
        })
        .when(help_text.is_some(), |d| {
            d.child::<Div, _>(|h| h.class("form-text").text(help_text.as_deref().unwrap_or("")))
        })
        .render()
}

/// Errors for a field, including the `name[i]` entries of a multiple choice.
fn field_errors(field: &FieldDef, result: &ValidationResult) -> Vec<String> {
    let element_prefix = format!("{}[", field.name);
    result
        .errors()
        .iter()
        .filter(|(path, _)| *path == field.name || path.starts_with(&element_prefix))
        .flat_map(|(_, messages)| messages.iter().cloned())
        .collect()
}

/// Renders a complete form for `schema` populated from `result`.
pub fn render_bootstrap_form(
    schema: &Schema,
    result: &ValidationResult,
    options: &RenderOptions,
) -> String {
    let action = options.action.as_str();
    let method = options.method.as_str();
    let mut form = html! {
        form.action(#action).method(#method)
    };
    if options.multipart {
        form = form.attr("enctype", "multipart/form-data");
    }

    let form_id = format!(
        r#"<input type="hidden" name="{FORM_ID_FIELD}" value="{}">"#,
        html_escape(result.id())
    );
    form = form.child::<Div, _>(|d| d.raw(&form_id));

    if let Some(form_errors) = result.errors().get(ValidationErrors::NON_FIELD) {
        form = form.child::<Div, _>(|d| {
            d.class("alert alert-danger")
                .attr("role", "alert")
                .child::<Ul, _>(|ul| {
                    ul.class("mb-0")
                        .children(form_errors.iter(), |e, li: Element<Li>| li.text(e))
                })
        });
    }

    for field in schema.fields() {
        let field_html = render_bootstrap_field(
            field,
            result.value(&field.name),
            &field_errors(field, result),
            options.error_class.as_deref(),
        );
        form = form.child::<Div, _>(|d| d.raw(&field_html));
    }

    let label = options.submit_label.as_str();
    form = form.child::<Div, _>(|d| {
        let btn = html! {
            button.type_("submit").class("btn btn-primary") {
                #label
            }
        };
        d.raw(btn.render())
    });

    form.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::validate;
    use crate::payload::FormData;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new()
            .with_id("signup")
            .field(
                FieldDef::email("email")
                    .required()
                    .help_text("We will never share your email"),
            )
            .field(FieldDef::choice("plan", ["free", "pro"]))
            .field(FieldDef::boolean("terms").required())
    }

    #[test]
    fn test_render_field_no_errors() {
        let field = FieldDef::email("email")
            .required()
            .help_text("We will never share your email");

        let html = render_bootstrap_field(&field, Some(&json!("a@b.io")), &[], Some("has-error"));
        assert!(html.contains("form-label"));
        assert!(html.contains("Email *"));
        assert!(html.contains(r#"value="a@b.io""#));
        assert!(html.contains("We will never share your email"));
        assert!(!html.contains("is-invalid"));
        assert!(!html.contains("has-error"));
    }

    #[test]
    fn test_render_field_with_errors() {
        let field = FieldDef::email("email");
        let errors = ["Enter a valid email address.".to_string()];

        let html = render_bootstrap_field(&field, Some(&json!("<x>")), &errors, Some("has-error"));
        assert!(html.contains("is-invalid"));
        assert!(html.contains("has-error"));
        assert!(html.contains("Enter a valid email address."));
        assert!(html.contains("&lt;x&gt;"));
    }

    #[test]
    fn test_render_select_and_checkbox() {
        let plan = FieldDef::choice("plan", ["free", "pro"]);
        let html = render_input(&plan, Some(&json!("pro")), false);
        assert!(html.contains(r#"<option value="pro" selected>"#));
        assert!(!html.contains(r#"<option value="free" selected>"#));

        let terms = FieldDef::boolean("terms");
        assert!(render_input(&terms, Some(&json!(true)), false).contains("checked"));
        assert!(!render_input(&terms, Some(&json!(false)), false).contains("checked"));
    }

    #[test]
    fn test_render_form_preserves_submission() {
        let schema = schema();
        let payload: FormData = [("email", "bad"), ("plan", "pro")].into_iter().collect();
        let result = validate(&payload, &schema);

        let html = render_bootstrap_form(
            &schema,
            &result,
            &RenderOptions::new("/signup").error_class("has-error").multipart(),
        );
        assert!(html.contains(r#"action="/signup""#));
        assert!(html.contains("multipart/form-data"));
        assert!(html.contains(r#"name="__form_id" value="signup""#));
        assert!(html.contains(r#"value="bad""#));
        assert!(html.contains("Enter a valid email address."));
        assert!(html.contains("This field is required."));
        assert!(html.contains("btn btn-primary"));
    }

    #[test]
    fn test_render_form_shows_rejected_selections() {
        let schema = Schema::new()
            .with_id("tags")
            .field(FieldDef::multiple_choice("tags", ["rust", "web"]));
        let payload: FormData = [("tags", "rust"), ("tags", "cobol")].into_iter().collect();
        let result = validate(&payload, &schema);
        assert_eq!(result.errors_for("tags[1]").len(), 1);

        let html = render_bootstrap_form(&schema, &result, &RenderOptions::new("/tags"));
        assert!(html.contains("is-invalid"));
        assert!(html.contains(&result.errors_for("tags[1]")[0]));
    }

    #[test]
    fn test_render_input_escapes_id() {
        let field = FieldDef::text(r#"a"b"#);
        let html = render_input(&field, None, false);
        assert!(html.contains(r#"id="id_a&quot;b""#));
        assert!(html.contains(r#"name="a&quot;b""#));
        assert!(!html.contains(r#"id_a"b"#));
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("\"test\""), "&quot;test&quot;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
    }
}
