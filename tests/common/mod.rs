pub mod http_mock;

use vkwall::config::Endpoints;
use wiremock::MockServer;

/// Endpoints with every URL pointed at the mock server.
#[allow(dead_code)]
pub fn mock_endpoints(server: &MockServer) -> Endpoints {
    Endpoints {
        authorize_url: format!("{}/authorize", server.uri()),
        token_url: http_mock::token_url(server),
        api_base_url: http_mock::api_base_url(server),
        ..Endpoints::default()
    }
}

/// Write an image file into a temp dir and return its path.
#[allow(dead_code)]
pub fn write_image(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Decode an `application/x-www-form-urlencoded` request body.
#[allow(dead_code)]
pub fn form_value(body: &[u8], key: &str) -> Option<String> {
    url::form_urlencoded::parse(body)
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
