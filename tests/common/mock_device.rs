//! Mock e-paper device for upload tests.

use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, Request, ResponseTemplate,
};

/// Path the mock device accepts uploads on.
pub const UPLOAD_PATH: &str = "/image";

/// Wrapper around wiremock MockServer with convenience methods
pub struct MockDevice {
    pub server: MockServer,
}

impl MockDevice {
    /// Start a new mock device
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Get the base URL of the mock device
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Get URL for a specific path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.server.uri(), path)
    }

    /// Upload URL of the device
    pub fn upload_url(&self) -> String {
        self.url_for(UPLOAD_PATH)
    }

    /// Accept any octet-stream POST on the upload path
    pub async fn accept_uploads(&self) {
        Mock::given(method("POST"))
            .and(path(UPLOAD_PATH))
            .and(header("content-type", "application/octet-stream"))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
            .mount(&self.server)
            .await;
    }

    /// Reject every upload with the given status and message
    pub async fn reject_uploads(&self, status: u16, message: &str) {
        Mock::given(method("POST"))
            .and(path(UPLOAD_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string(message))
            .mount(&self.server)
            .await;
    }

    /// Answer after a delay, for timeout tests
    pub async fn accept_uploads_slowly(&self, delay: std::time::Duration) {
        Mock::given(method("POST"))
            .and(path(UPLOAD_PATH))
            .respond_with(ResponseTemplate::new(200).set_delay(delay))
            .mount(&self.server)
            .await;
    }

    /// Bodies of every request received so far
    pub async fn received_bodies(&self) -> Vec<Vec<u8>> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|request: Request| request.body)
            .collect()
    }
}
