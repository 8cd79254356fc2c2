//! Thread-safe in-memory [`SessionStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::TokenRecord,
	session::{SessionError, SessionFuture, SessionStore, decode_fields, encode_fields},
};

type FieldMap = Arc<RwLock<HashMap<String, Value>>>;

/// In-process session bag; clones share the same fields.
///
/// Besides the token fields it can carry arbitrary application fields, mirroring a
/// web framework's cookie session.
#[derive(Clone, Default)]
pub struct MemorySession(FieldMap);
impl MemorySession {
	/// Creates an empty session.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a copy of a single field.
	pub fn field(&self, name: &str) -> Option<Value> {
		self.0.read().get(name).cloned()
	}

	/// Sets a single field.
	pub fn set_field(&self, name: impl Into<String>, value: Value) {
		self.0.write().insert(name.into(), value);
	}

	/// Returns a copy of every field.
	pub fn snapshot(&self) -> HashMap<String, Value> {
		self.0.read().clone()
	}

	fn load_now(map: &FieldMap) -> TokenRecord {
		let guard = map.read();

		decode_fields(|name| guard.get(name).cloned())
	}

	fn save_now(map: &FieldMap, record: &TokenRecord) -> Result<(), SessionError> {
		let mut guard = map.write();

		for (name, value) in encode_fields(record) {
			guard.insert(name.to_owned(), value);
		}

		Ok(())
	}
}
impl Debug for MemorySession {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let guard = self.0.read();
		let mut names = guard.keys().collect::<Vec<_>>();

		names.sort();

		f.debug_struct("MemorySession").field("fields", &names).finish()
	}
}
impl SessionStore for MemorySession {
	fn load(&self) -> SessionFuture<'_, TokenRecord> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::load_now(&map)) })
	}

	fn save(&self, record: TokenRecord) -> SessionFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::save_now(&map, &record) })
	}
}
