//! Zoho Writer document calls.

// self
use crate::{
	_prelude::*,
	auth::{DocumentId, TokenSecret},
	error::ConfigError,
	flows::Broker,
	http::{ApiHttpClient, ApiRequest},
	oauth::TransportErrorMapper,
	obs::{self, Operation},
};

/// Payload for a merge-and-sign submission.
///
/// `merge_data` and `signer_data` are sent as JSON text inside the form body; every other
/// field is sent as-is when it is a string and as JSON text otherwise.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeSignRequest {
	/// Values for the template's merge fields.
	pub merge_data: Value,
	/// Signer list and signing order.
	pub signer_data: Value,
	/// Additional form fields such as `filename` or `message`.
	#[serde(flatten)]
	pub fields: BTreeMap<String, Value>,
}
impl MergeSignRequest {
	/// Creates a request with the two mandatory JSON documents.
	pub fn new(merge_data: Value, signer_data: Value) -> Self {
		Self { merge_data, signer_data, fields: BTreeMap::new() }
	}

	/// Adds an extra form field.
	pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.fields.insert(name.into(), value.into());

		self
	}

	/// Encodes the request as ordered form pairs.
	pub fn form_pairs(&self) -> Result<Vec<(String, String)>, ConfigError> {
		let mut pairs = vec![
			("merge_data".to_owned(), json_text("merge_data", &self.merge_data)?),
			("signer_data".to_owned(), json_text("signer_data", &self.signer_data)?),
		];

		for (name, value) in &self.fields {
			let text = match value {
				Value::String(text) => text.clone(),
				Value::Null => String::new(),
				other => json_text(name, other)?,
			};

			pairs.push((name.clone(), text));
		}

		Ok(pairs)
	}
}

fn json_text(field: &str, value: &Value) -> Result<String, ConfigError> {
	serde_json::to_string(value)
		.map_err(|source| ConfigError::FormField { field: field.to_owned(), source })
}

impl<C, M> Broker<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Lists the merge fields defined in a Writer document.
	pub async fn document_fields(
		&self,
		access_token: &TokenSecret,
		document_id: &DocumentId,
	) -> Result<Value> {
		const OPERATION: Operation = Operation::DocumentFields;

		obs::observe(OPERATION, "document_fields", async move {
			let url = self.document_url(document_id, &["fields"])?;
			let request = ApiRequest::get(url)
				.authorized(&self.descriptor.quirks.authorization_scheme, access_token.expose());
			let response =
				self.facade().send_accepted(OPERATION, self.strategy.as_ref(), &request).await?;

			Ok(response.body)
		})
		.await
	}

	/// Merges data into a Writer template and sends the result out for signatures.
	pub async fn merge_and_sign(
		&self,
		access_token: &TokenSecret,
		document_id: &DocumentId,
		payload: &MergeSignRequest,
	) -> Result<Value> {
		const OPERATION: Operation = Operation::MergeAndSign;

		obs::observe(OPERATION, "merge_and_sign", async move {
			let url = self.document_url(document_id, &["merge", "sign"])?;
			let request = ApiRequest::post(url)
				.authorized(&self.descriptor.quirks.authorization_scheme, access_token.expose())
				.form(payload.form_pairs()?);
			let response =
				self.facade().send_accepted(OPERATION, self.strategy.as_ref(), &request).await?;

			Ok(response.body)
		})
		.await
	}

	fn document_url(&self, document_id: &DocumentId, tail: &[&str]) -> Result<Url> {
		let base = &self.descriptor.endpoints.documents;
		let mut url = base.clone();

		url.path_segments_mut()
			.map_err(|_| ConfigError::CannotBeABase { url: base.to_string() })?
			.pop_if_empty()
			.push(document_id)
			.extend(tail);

		Ok(url)
	}
}
