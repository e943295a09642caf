//! HTTP request type.

use std::collections::HashMap;

use oxide_forms::{validate, FormData, Schema, ValidationResult};

use crate::body::{self, FORM_URLENCODED, MULTIPART_FORM_DATA};
use crate::error::{ActionError, Result};

const MULTIPART_BOUNDARY: &str = "----oxide-form-boundary";

/// HTTP request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method
    Get,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// PATCH method
    Patch,
    /// DELETE method
    Delete,
}

impl Method {
    /// Parses a method from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Returns the method as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An HTTP request.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Request path.
    pub path: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Vec<u8>,
}

impl Request {
    /// Creates a new request.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Creates a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Creates a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Creates a POST request carrying a form.
    ///
    /// Payloads with files are sent as multipart, others form-encoded.
    pub fn post_form(path: impl Into<String>, data: &FormData) -> Result<Self> {
        let request = Self::post(path);
        if data.files().next().is_some() {
            Ok(request
                .header(
                    "Content-Type",
                    format!("{MULTIPART_FORM_DATA}; boundary={MULTIPART_BOUNDARY}"),
                )
                .body(body::encode_multipart(data, MULTIPART_BOUNDARY)))
        } else {
            Ok(request
                .header("Content-Type", FORM_URLENCODED)
                .body(body::encode_urlencoded(data)?))
        }
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Gets a header value.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        // Case-insensitive header lookup
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the `Content-Type` header.
    pub fn content_type(&self) -> Option<&str> {
        self.get_header("Content-Type")
    }

    /// Parses the body as a form payload.
    pub async fn form_data(&self) -> Result<FormData> {
        let content_type = self.content_type().ok_or(ActionError::MissingContentType)?;
        body::parse_form_data(content_type, &self.body).await
    }

    /// Parses the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Extracts the form body of `request` and validates it against `schema`.
///
/// The payload is returned alongside the result so the handler can pull
/// uploaded files out of it afterwards. Only body extraction can fail.
pub async fn validate_request(
    request: &Request,
    schema: &Schema,
) -> Result<(ValidationResult, FormData)> {
    let data = request.form_data().await?;
    let result = validate(&data, schema);
    Ok((result, data))
}
