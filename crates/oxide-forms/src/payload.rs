//! Submitted form payloads.
//!
//! [`FormData`] is the structured request body handed to the gateway: an
//! ordered multimap of field names to text values or uploaded files.
//! Files never take part in validation; handlers pull them out by name
//! after calling [`crate::validate`].

use bytes::Bytes;

use crate::error::{FormError, Result};

/// Hidden field carrying the id of the form that was submitted.
pub const FORM_ID_FIELD: &str = "__form_id";

/// An uploaded file from a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Client-supplied file name.
    pub file_name: String,
    /// Declared content type, if any.
    pub content_type: Option<String>,
    /// Raw file contents.
    pub data: Bytes,
}

impl UploadedFile {
    /// Creates a new uploaded file.
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    /// Sets the content type.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Returns the file size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// A single payload entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEntry {
    /// A plain text value.
    Text(String),
    /// An uploaded file.
    File(UploadedFile),
}

impl FormEntry {
    /// Returns the text value, if this entry is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::File(_) => None,
        }
    }

    /// Returns the file, if this entry is a file.
    pub fn as_file(&self) -> Option<&UploadedFile> {
        match self {
            Self::File(file) => Some(file),
            Self::Text(_) => None,
        }
    }
}

/// A submitted form body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, FormEntry)>,
}

impl FormData {
    /// Creates an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a text entry.
    pub fn append_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries
            .push((name.into(), FormEntry::Text(value.into())));
    }

    /// Appends a file entry.
    pub fn append_file(&mut self, name: impl Into<String>, file: UploadedFile) {
        self.entries.push((name.into(), FormEntry::File(file)));
    }

    /// Builder method to append a text entry.
    #[must_use]
    pub fn text_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append_text(name, value);
        self
    }

    /// Builder method to append a file entry.
    #[must_use]
    pub fn file_field(mut self, name: impl Into<String>, file: UploadedFile) -> Self {
        self.append_file(name, file);
        self
    }

    /// Returns the first entry under `name`.
    pub fn get(&self, name: &str) -> Option<&FormEntry> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, entry)| entry)
    }

    /// Returns every entry under `name`, in submission order.
    pub fn get_all<'a, 'b>(
        &'a self,
        name: &'b str,
    ) -> impl Iterator<Item = &'a FormEntry> + use<'a, 'b> {
        self.entries
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, entry)| entry)
    }

    /// Returns the first text value under `name`.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FormEntry::as_text)
    }

    /// Returns the uploaded file under `name`.
    ///
    /// Fails with [`FormError::NotAFile`] when the entry is text, so a
    /// handler cannot mistake a plain field for an attachment.
    pub fn file(&self, name: &str) -> Result<&UploadedFile> {
        match self.get(name) {
            Some(FormEntry::File(file)) => Ok(file),
            Some(FormEntry::Text(_)) => Err(FormError::NotAFile(name.to_string())),
            None => Err(FormError::MissingField(name.to_string())),
        }
    }

    /// Iterates over every uploaded file with its field name.
    pub fn files(&self) -> impl Iterator<Item = (&str, &UploadedFile)> {
        self.entries
            .iter()
            .filter_map(|(name, entry)| entry.as_file().map(|file| (name.as_str(), file)))
    }

    /// Returns the submitted form id, if the body carries one.
    pub fn form_id(&self) -> Option<&str> {
        self.text(FORM_ID_FIELD)
    }

    /// Returns whether an entry exists under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all entries in submission order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }
}

impl<K, V> FromIterator<(K, V)> for FormData
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = Self::new();
        for (name, value) in iter {
            data.append_text(name, value);
        }
        data
    }
}
