#![cfg(all(feature = "reqwest", feature = "test"))]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
use time::macros;
// self
use zoho_writer_broker::{
	_preludet::*,
	auth::{TokenRecord, TokenSecret, TokenStatus},
	error::Error,
	flows::RefreshCounts,
	session::{ACCESS_TOKEN_FIELD, EXPIRY_FIELD, MemorySession, REFRESH_TOKEN_FIELD, SessionStore},
};

const REFRESH_BODY: &str =
	"{\"access_token\":\"A2\",\"expires_in\":3600,\"token_type\":\"Bearer\"}";

fn t0() -> OffsetDateTime {
	macros::datetime!(2025-01-01 00:00 UTC)
}

async fn seeded_session(access: &str, issued_at: OffsetDateTime) -> MemorySession {
	let session = MemorySession::new();
	let record = TokenRecord::issued(
		Some(TokenSecret::new("R1")),
		Some(TokenSecret::new(access)),
		Duration::seconds(3600),
		issued_at,
	);

	session.save(record).await.expect("Memory sessions always save.");

	session
}

#[tokio::test]
async fn service_token_is_cached_until_expiry() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(test_descriptor(&server.base_url()));
	let refresh_token = TokenSecret::new("R-service");
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/v2/token")
				.query_param("grant_type", "refresh_token")
				.query_param("refresh_token", "R-service")
				.query_param("client_id", TEST_CLIENT_ID)
				.query_param("client_secret", TEST_CLIENT_SECRET);
			then.status(200).header("content-type", "application/json").body(REFRESH_BODY);
		})
		.await;
	let first = broker
		.service_token_at(&refresh_token, t0())
		.await
		.expect("First service token request should refresh.");
	let second = broker
		.service_token_at(&refresh_token, t0() + Duration::seconds(10))
		.await
		.expect("Second service token request should hit the cache.");

	assert_eq!(first.as_ref().map(TokenSecret::expose), Some("A2"));
	assert_eq!(first, second);
	mock.assert_calls_async(1).await;
	assert_eq!(
		broker.refresh_metrics.snapshot(),
		RefreshCounts { attempts: 1, successes: 1, failures: 0 }
	);

	let record = broker.service_record().await;

	assert_eq!(record.expires_at, Some(t0() + Duration::milliseconds(3_599_000)));
	assert_eq!(record.status_at(t0()), TokenStatus::Active);

	broker
		.service_token_at(&refresh_token, t0() + Duration::seconds(3599))
		.await
		.expect("Expired service token should refresh again.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn concurrent_service_callers_share_one_refresh() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(test_descriptor(&server.base_url()));
	let refresh_token = TokenSecret::new("R-service");
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v2/token");
			then.status(200).header("content-type", "application/json").body(REFRESH_BODY);
		})
		.await;
	let (first, second) = tokio::join!(
		broker.service_token_at(&refresh_token, t0()),
		broker.service_token_at(&refresh_token, t0()),
	);

	let first = first.expect("First caller should succeed.");
	let second = second.expect("Second caller should succeed.");

	assert_eq!(first, second);
	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn session_without_refresh_token_requires_authentication() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(test_descriptor(&server.base_url()));
	let session = MemorySession::new();
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v2/token");
			then.status(200).header("content-type", "application/json").body(REFRESH_BODY);
		})
		.await;
	let token = broker.session_token(&session).await.expect("Missing tokens are not an error.");

	assert!(token.is_none());
	mock.assert_calls_async(0).await;
	assert_eq!(broker.refresh_metrics.attempts(), 0);
}

#[tokio::test]
async fn valid_session_token_is_reused_without_network() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(test_descriptor(&server.base_url()));
	let session = seeded_session("A1", t0()).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v2/token");
			then.status(200).header("content-type", "application/json").body(REFRESH_BODY);
		})
		.await;
	let token = broker
		.session_token_at(&session, t0() + Duration::minutes(30))
		.await
		.expect("Valid session token should be returned.");

	assert_eq!(token.as_ref().map(TokenSecret::expose), Some("A1"));
	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn expired_session_token_is_refreshed_and_written_back() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(test_descriptor(&server.base_url()));
	let session = seeded_session("A1", t0()).await;
	let now = t0() + Duration::hours(2);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/v2/token")
				.query_param("grant_type", "refresh_token")
				.query_param("refresh_token", "R1");
			then.status(200).header("content-type", "application/json").body(REFRESH_BODY);
		})
		.await;
	let token = broker
		.session_token_at(&session, now)
		.await
		.expect("Expired session token should refresh.");

	mock.assert_async().await;

	assert_eq!(token.as_ref().map(TokenSecret::expose), Some("A2"));
	assert_eq!(session.field(REFRESH_TOKEN_FIELD), Some(json!("R1")));
	assert_eq!(session.field(ACCESS_TOKEN_FIELD), Some(json!("A2")));
	assert_eq!(
		session.field(EXPIRY_FIELD),
		Some(json!(1_735_689_600_000_i64 + 7_200_000 + 3_599_000))
	);
}

#[tokio::test]
async fn session_with_unreadable_expiry_is_refreshed() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(test_descriptor(&server.base_url()));
	let session = seeded_session("A1", t0()).await;

	session.set_field(EXPIRY_FIELD, json!("not-a-timestamp"));

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v2/token");
			then.status(200).header("content-type", "application/json").body(REFRESH_BODY);
		})
		.await;
	let token = broker.session_token_at(&session, t0()).await.expect("Refresh should succeed.");

	assert_eq!(token.as_ref().map(TokenSecret::expose), Some("A2"));
	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn rejected_refresh_surfaces_provider_message_and_keeps_session() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(test_descriptor(&server.base_url()));
	let session = seeded_session("A1", t0()).await;
	let before = session.snapshot();
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v2/token");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"message\":\"Invalid client secret\"}");
		})
		.await;
	let err = broker
		.session_token_at(&session, t0() + Duration::hours(2))
		.await
		.expect_err("A 401 refresh must fail.");

	match &err {
		Error::UnexpectedResponse(diagnostic) => {
			assert_eq!(diagnostic.status, 401);
			assert!(!diagnostic.path.contains(TEST_CLIENT_SECRET));
			assert!(!diagnostic.path.contains("R1"));
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	assert_eq!(err.to_string(), "The refresh call failed: Invalid client secret");
	assert_eq!(session.snapshot(), before);
	assert_eq!(
		broker.refresh_metrics.snapshot(),
		RefreshCounts { attempts: 1, successes: 0, failures: 1 }
	);
}

#[tokio::test]
async fn non_positive_lifetime_is_rejected() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(test_descriptor(&server.base_url()));
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v2/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"A2\",\"expires_in\":0}");
		})
		.await;
	let err = broker
		.refresh(&TokenSecret::new("R1"))
		.await
		.expect_err("A zero lifetime must be rejected.");

	assert!(matches!(err, Error::UnexpectedResponse(_)));
}

#[tokio::test]
async fn exchange_then_session_token_round_trip() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(test_descriptor(&server.base_url()));
	let session = MemorySession::new();
	let exchange = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/v2/token")
				.query_param("grant_type", "authorization_code");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"A1\",\"refresh_token\":\"R1\",\"expires_in\":3600}");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v2/token").query_param("grant_type", "refresh_token");
			then.status(200).header("content-type", "application/json").body(REFRESH_BODY);
		})
		.await;

	broker.exchange_code_at(&session, "C1", t0()).await.expect("Exchange should succeed.");

	let cached = broker
		.session_token_at(&session, t0() + Duration::seconds(60))
		.await
		.expect("Fresh session token should be reused.");
	let renewed = broker
		.session_token_at(&session, t0() + Duration::seconds(3599))
		.await
		.expect("Session token at the expiry boundary should refresh.");

	assert_eq!(cached.as_ref().map(TokenSecret::expose), Some("A1"));
	assert_eq!(renewed.as_ref().map(TokenSecret::expose), Some("A2"));
	exchange.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;
}

#[tokio::test]
async fn service_token_is_not_shared_across_refresh_tokens() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(test_descriptor(&server.base_url()));
	let first_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v2/token").query_param("refresh_token", "R-one");
			then.status(200).header("content-type", "application/json").body(REFRESH_BODY);
		})
		.await;
	let second_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v2/token").query_param("refresh_token", "R-two");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"B1\",\"expires_in\":3600}");
		})
		.await;
	let first = broker
		.service_token_at(&TokenSecret::new("R-one"), t0())
		.await
		.expect("First refresh token should mint a token.");
	let second = broker
		.service_token_at(&TokenSecret::new("R-two"), t0() + Duration::seconds(10))
		.await
		.expect("Second refresh token should mint its own token.");

	assert_eq!(first.as_ref().map(TokenSecret::expose), Some("A2"));
	assert_eq!(second.as_ref().map(TokenSecret::expose), Some("B1"));
	first_mock.assert_calls_async(1).await;
	second_mock.assert_calls_async(1).await;
	assert_eq!(
		broker.service_record().await.refresh_token.as_ref().map(TokenSecret::expose),
		Some("R-two")
	);
}
