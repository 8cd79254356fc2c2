//! Writer document identifiers.

// std
use std::ops::Deref;
// self
use crate::_prelude::*;

/// Longest document identifier accepted, in bytes.
pub const DOCUMENT_ID_MAX_LEN: usize = 128;

/// Reasons a document identifier is rejected.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum DocumentIdError {
	/// Empty identifier.
	#[error("Document identifier cannot be empty.")]
	Empty,
	/// Identifier contains whitespace, which cannot travel in a URL path segment.
	#[error("Document identifier contains whitespace.")]
	ContainsWhitespace,
	/// Identifier is longer than [`DOCUMENT_ID_MAX_LEN`].
	#[error("Document identifier exceeds {DOCUMENT_ID_MAX_LEN} bytes.")]
	TooLong,
}

/// Identifier of a Writer document or merge template, e.g. `ywzp4c0f1e2d`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);
impl DocumentId {
	/// Validates and wraps an identifier.
	pub fn new(value: impl Into<String>) -> Result<Self, DocumentIdError> {
		let value = value.into();

		if value.is_empty() {
			return Err(DocumentIdError::Empty);
		}
		if value.chars().any(char::is_whitespace) {
			return Err(DocumentIdError::ContainsWhitespace);
		}
		if value.len() > DOCUMENT_ID_MAX_LEN {
			return Err(DocumentIdError::TooLong);
		}

		Ok(Self(value))
	}
}
impl Deref for DocumentId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for DocumentId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl TryFrom<String> for DocumentId {
	type Error = DocumentIdError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl From<DocumentId> for String {
	fn from(value: DocumentId) -> Self {
		value.0
	}
}
impl Debug for DocumentId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Document({})", self.0)
	}
}
impl Display for DocumentId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
