#![cfg(all(feature = "reqwest", feature = "test"))]

// self
use zoho_writer_broker::{
	_preludet::*,
	provider::{
		DefaultProviderStrategy, GrantType, ProviderDescriptor, ProviderDescriptorBuilder,
		ProviderDescriptorError, ProviderQuirks, ProviderStrategy,
	},
};

fn url(value: &str) -> Url {
	Url::parse(value).expect("Failed to parse mock provider URL.")
}

fn complete_builder() -> ProviderDescriptorBuilder {
	ProviderDescriptor::builder()
		.authorization_endpoint(url("https://accounts.example.com/oauth/v2/auth"))
		.token_endpoint(url("https://accounts.example.com/oauth/v2/token"))
		.revocation_endpoint(url("https://accounts.example.com/oauth/v2/token/revoke"))
		.user_info_endpoint(url("https://accounts.example.com/oauth/user/info"))
		.documents_endpoint(url("https://apis.example.com/writer/api/v1/documents"))
}

#[test]
fn descriptor_rejects_insecure_and_missing_endpoints() {
	let err = complete_builder()
		.token_endpoint(url("http://accounts.example.com/oauth/v2/token"))
		.build()
		.expect_err("Descriptor builder should reject plain HTTP endpoints.");

	assert!(matches!(err, ProviderDescriptorError::InsecureEndpoint { endpoint: "token", .. }));

	let err = ProviderDescriptor::builder()
		.authorization_endpoint(url("https://accounts.example.com/oauth/v2/auth"))
		.token_endpoint(url("https://accounts.example.com/oauth/v2/token"))
		.build()
		.expect_err("Descriptor builder should require every endpoint.");

	assert_eq!(err, ProviderDescriptorError::MissingEndpoint { endpoint: "revocation" });
}

#[test]
fn descriptor_quirks_default_to_zoho_conventions() {
	let descriptor = complete_builder().build().expect("Complete descriptor should build.");

	assert_eq!(descriptor.quirks.scope_delimiter, ',');
	assert_eq!(descriptor.quirks.authorization_scheme, "Zoho-oauthtoken");

	let err = complete_builder()
		.quirks(ProviderQuirks {
			authorization_scheme: "Bearer token".into(),
			..Default::default()
		})
		.build()
		.expect_err("Schemes with whitespace must be rejected.");

	assert!(matches!(err, ProviderDescriptorError::InvalidAuthorizationScheme { .. }));

	let err = complete_builder()
		.quirks(ProviderQuirks { scope_delimiter: '\n', ..Default::default() })
		.build()
		.expect_err("Control characters cannot delimit scopes.");

	assert!(matches!(err, ProviderDescriptorError::InvalidScopeDelimiter { delimiter: '\n' }));
}

#[test]
fn test_descriptor_points_at_the_mock_base() {
	let descriptor = test_descriptor("https://127.0.0.1:9443");

	assert_eq!(descriptor.endpoints.token.as_str(), "https://127.0.0.1:9443/oauth/v2/token");
	assert_eq!(
		descriptor.endpoints.documents.as_str(),
		"https://127.0.0.1:9443/writer/api/v1/documents"
	);
}

#[test]
fn custom_strategy_can_augment_token_requests() {
	struct DataCenterStrategy;
	impl ProviderStrategy for DataCenterStrategy {
		fn error_message(&self, body: &Value) -> Option<String> {
			DefaultProviderStrategy.error_message(body)
		}

		fn augment_token_request(&self, grant: GrantType, params: &mut BTreeMap<String, String>) {
			params.insert("scope_hint".into(), format!("for:{grant}"));
		}
	}

	let strategy = DataCenterStrategy;
	let mut params = BTreeMap::new();

	params.insert("grant_type".into(), "refresh_token".into());
	strategy.augment_token_request(GrantType::RefreshToken, &mut params);

	assert_eq!(params.get("scope_hint").map(String::as_str), Some("for:refresh_token"));
	assert!(strategy.revocation_accepted(400, &Value::Null));
}
