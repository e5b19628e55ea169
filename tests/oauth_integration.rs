use vkwall::config::{AppConfig, ClientCredentials};
use vkwall::oauth::{derive_challenge, OAuthClient, PendingAuthorization, Rotation, TokenLifetime};
use vkwall::VkwallError;
use wiremock::matchers::body_string_contains;
use wiremock::{MockServer, ResponseTemplate};

mod common;

use common::http_mock::{token_endpoint, token_url};

fn app() -> AppConfig {
    AppConfig {
        client_id: "51234567".into(),
        redirect_uri: "https://oauth.vk.com/blank.html".into(),
        scope: "wall,photos,groups".into(),
        state: "state-1".into(),
    }
}

fn client_credentials() -> ClientCredentials {
    ClientCredentials {
        client_id: "51234567".into(),
        client_secret: Some("s3cret".into()),
        device_id: Some("dev-1".into()),
    }
}

const REDIRECT: &str = "https://oauth.vk.com/blank.html?code=auth-code-1&state=state-1&device_id=dev-1&type=code_v2";

#[tokio::test]
async fn code_exchange_sends_matching_verifier() {
    let server = MockServer::start().await;
    token_endpoint()
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=auth-code-1"))
        .and(body_string_contains("device_id=dev-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "vk1.a.user",
            "refresh_token": "vk1.r.refresh",
            "expires_in": 0,
            "user_id": 1001,
            "state": "state-1",
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let endpoints = common::mock_endpoints(&server);
    let pending = PendingAuthorization::begin(&endpoints, app(), 64).unwrap();
    let authorize_url = url::Url::parse(pending.authorize_url()).unwrap();
    let challenge = authorize_url
        .query_pairs()
        .find(|(k, _)| k == "code_challenge")
        .map(|(_, v)| v.into_owned())
        .unwrap();

    let client = OAuthClient::new(token_url(&server)).unwrap();
    let (grant, tokens) = pending.complete(&client, REDIRECT).await.unwrap();

    assert_eq!(grant.code, "auth-code-1");
    assert_eq!(grant.device_id, "dev-1");
    assert_eq!(tokens.access_token, "vk1.a.user");
    assert_eq!(tokens.refresh_token.as_deref(), Some("vk1.r.refresh"));
    assert_eq!(tokens.lifetime, Some(TokenLifetime::NonExpiring));
    assert_eq!(tokens.user_id, Some(1001));

    let requests = server.received_requests().await.unwrap();
    let body = &requests[0].body;
    let verifier = common::form_value(body, "code_verifier").unwrap();
    assert_eq!(verifier.len(), 64);
    assert_eq!(derive_challenge(&verifier), challenge);
    assert_eq!(common::form_value(body, "client_id").as_deref(), Some("51234567"));
    assert_eq!(common::form_value(body, "state").as_deref(), Some("state-1"));
    assert_eq!(
        common::form_value(body, "redirect_uri").as_deref(),
        Some("https://oauth.vk.com/blank.html")
    );
}

#[tokio::test]
async fn invalid_grant_is_remote_auth_error() {
    let server = MockServer::start().await;
    token_endpoint()
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "code is expired"
        })))
        .mount(&server)
        .await;

    let endpoints = common::mock_endpoints(&server);
    let pending = PendingAuthorization::begin(&endpoints, app(), 43).unwrap();
    let client = OAuthClient::new(token_url(&server)).unwrap();
    let err = pending.complete(&client, REDIRECT).await.unwrap_err();

    match &err {
        VkwallError::RemoteAuthError { code, description } => {
            assert_eq!(code, "invalid_grant");
            assert_eq!(description.as_deref(), Some("code is expired"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.to_json()["error"]["remote_code"], "invalid_grant");
}

#[tokio::test]
async fn missing_device_id_makes_no_request() {
    let server = MockServer::start().await;
    token_endpoint()
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let endpoints = common::mock_endpoints(&server);
    let pending = PendingAuthorization::begin(&endpoints, app(), 64).unwrap();
    let client = OAuthClient::new(token_url(&server)).unwrap();
    let err = pending
        .complete(&client, "https://oauth.vk.com/blank.html?code=abc&state=state-1")
        .await
        .unwrap_err();
    assert_eq!(err.code(), "parse_error");
    assert!(err.to_string().contains("device_id"));
}

#[tokio::test]
async fn success_without_access_token_is_rejected() {
    let server = MockServer::start().await;
    token_endpoint()
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "refresh_token": "r", "expires_in": 3600 })),
        )
        .mount(&server)
        .await;

    let client = OAuthClient::new(token_url(&server)).unwrap();
    let err = client
        .refresh(&client_credentials(), "vk1.r.old")
        .await
        .unwrap_err();
    match err {
        VkwallError::RemoteAuthError { code, .. } => assert_eq!(code, "missing_access_token"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn server_error_without_json_is_transport_error() {
    let server = MockServer::start().await;
    token_endpoint()
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let client = OAuthClient::new(token_url(&server)).unwrap();
    let err = client
        .refresh(&client_credentials(), "vk1.r.old")
        .await
        .unwrap_err();
    assert_eq!(err.code(), "transport_error");
    assert!(err.to_string().contains("502"));
}

#[tokio::test]
async fn refresh_sends_client_settings_and_detects_rotation() {
    let server = MockServer::start().await;
    token_endpoint()
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=vk1.r.old"))
        .and(body_string_contains("client_secret=s3cret"))
        .and(body_string_contains("device_id=dev-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "vk1.a.fresh",
            "refresh_token": "vk1.r.new",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OAuthClient::new(token_url(&server)).unwrap();
    let outcome = client
        .refresh(&client_credentials(), "vk1.r.old")
        .await
        .unwrap();

    assert_eq!(outcome.tokens.access_token, "vk1.a.fresh");
    assert_eq!(outcome.tokens.lifetime, Some(TokenLifetime::Seconds(3600)));
    assert_eq!(
        outcome.rotation,
        Rotation::Rotated {
            previous: "vk1.r.old".into(),
            current: "vk1.r.new".into()
        }
    );
    assert_eq!(outcome.rotation.new_refresh_token(), Some("vk1.r.new"));
}

#[tokio::test]
async fn refresh_with_same_or_absent_token_is_unchanged() {
    let server = MockServer::start().await;
    token_endpoint()
        .and(body_string_contains("refresh_token=same"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "a1",
            "refresh_token": "same"
        })))
        .mount(&server)
        .await;
    token_endpoint()
        .and(body_string_contains("refresh_token=solo"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "access_token": "a2" })),
        )
        .mount(&server)
        .await;

    let client = OAuthClient::new(token_url(&server)).unwrap();
    let creds = ClientCredentials {
        client_id: "1".into(),
        client_secret: None,
        device_id: None,
    };
    let same = client.refresh(&creds, "same").await.unwrap();
    assert_eq!(same.rotation, Rotation::Unchanged);
    let solo = client.refresh(&creds, "solo").await.unwrap();
    assert_eq!(solo.rotation, Rotation::Unchanged);
    assert_eq!(solo.tokens.lifetime, None);

    // Optional settings are left out of the form entirely.
    let requests = server.received_requests().await.unwrap();
    assert!(common::form_value(&requests[0].body, "client_secret").is_none());
    assert!(common::form_value(&requests[0].body, "device_id").is_none());
}
