//! Request body codecs for form submissions.

use bytes::Bytes;
use futures::future::ready;
use futures::stream::once;
use oxide_forms::{FormData, FormEntry, UploadedFile};
use tracing::debug;

use crate::error::{ActionError, Result};

/// `application/x-www-form-urlencoded`
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
/// `multipart/form-data`
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Returns the lower-cased media type without parameters.
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Parses a form body according to its content type.
pub async fn parse_form_data(content_type: &str, body: &[u8]) -> Result<FormData> {
    match media_type(content_type).as_str() {
        FORM_URLENCODED => parse_urlencoded(body),
        MULTIPART_FORM_DATA => parse_multipart(content_type, body.to_vec()).await,
        other => Err(ActionError::UnsupportedContentType(other.to_string())),
    }
}

/// Parses a form-encoded body, keeping repeated names in order.
pub fn parse_urlencoded(body: &[u8]) -> Result<FormData> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
        .map_err(|e| ActionError::MalformedBody(e.to_string()))?;
    Ok(pairs.into_iter().collect())
}

/// Parses a multipart body. Parts with a file name become file entries.
///
/// An empty file input (no file name, no content) is dropped so the
/// handler sees the field as absent.
pub async fn parse_multipart(content_type: &str, body: Vec<u8>) -> Result<FormData> {
    let boundary = multer::parse_boundary(content_type)?;
    let stream = once(ready(Ok::<_, std::io::Error>(Bytes::from(body))));
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut data = FormData::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().map(ToString::to_string);
                let bytes = field.bytes().await?;
                if file_name.is_empty() && bytes.is_empty() {
                    debug!(field = %name, "skipping empty file input");
                    continue;
                }
                data.append_file(
                    name,
                    UploadedFile {
                        file_name,
                        content_type,
                        data: bytes,
                    },
                );
            }
            None => {
                let text = field.text().await?;
                data.append_text(name, text);
            }
        }
    }

    Ok(data)
}

/// Encodes the text entries of a payload as a form-encoded body.
pub fn encode_urlencoded(data: &FormData) -> Result<String> {
    let pairs: Vec<(&str, &str)> = data
        .iter()
        .filter_map(|(name, entry)| entry.as_text().map(|text| (name, text)))
        .collect();
    serde_urlencoded::to_string(pairs).map_err(|e| ActionError::MalformedBody(e.to_string()))
}

/// Encodes a payload, files included, as a multipart body.
pub fn encode_multipart(data: &FormData, boundary: &str) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, entry) in data.iter() {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        match entry {
            FormEntry::Text(text) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(text.as_bytes());
            }
            FormEntry::File(file) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{}\"\r\n",
                        file.file_name
                    )
                    .as_bytes(),
                );
                let content_type = file
                    .content_type
                    .as_deref()
                    .unwrap_or("application/octet-stream");
                body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
                body.extend_from_slice(&file.data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}
