use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN_PATH: &str = "/oauth2/auth";
pub const UPLOAD_PATH: &str = "/upload";

/// Token endpoint URL on the mock server.
#[allow(dead_code)]
pub fn token_url(server: &MockServer) -> String {
    format!("{}{TOKEN_PATH}", server.uri())
}

/// API base URL on the mock server; methods live under `/method/<name>`.
#[allow(dead_code)]
pub fn api_base_url(server: &MockServer) -> String {
    format!("{}/method", server.uri())
}

#[allow(dead_code)]
pub fn upload_url(server: &MockServer) -> String {
    format!("{}{UPLOAD_PATH}", server.uri())
}

/// Match a POST to one VK API method.
#[allow(dead_code)]
pub fn api_method(name: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST")).and(path(format!("/method/{name}")))
}

#[allow(dead_code)]
pub fn api_ok(response: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "response": response }))
}

#[allow(dead_code)]
pub fn api_error(code: i64, msg: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "error": { "error_code": code, "error_msg": msg, "request_params": [] }
    }))
}

/// Match a grant request on the token endpoint.
#[allow(dead_code)]
pub fn token_endpoint() -> wiremock::MockBuilder {
    Mock::given(method("POST")).and(path(TOKEN_PATH))
}

/// `photos.getWallUploadServer` answering with the mock upload URL.
#[allow(dead_code)]
pub async fn mount_upload_server(server: &MockServer) {
    api_method("photos.getWallUploadServer")
        .respond_with(api_ok(serde_json::json!({
            "upload_url": upload_url(server),
            "album_id": -14,
            "user_id": 0
        })))
        .mount(server)
        .await;
}

/// Upload server reply served as text/html, the way VK's upload hosts do.
#[allow(dead_code)]
pub fn upload_reply(photo: &str, server_id: u64, hash: &str) -> ResponseTemplate {
    let body = serde_json::json!({ "server": server_id, "photo": photo, "hash": hash }).to_string();
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}
