//! # Transport
//!
//! One multipart `POST` per submission, no timeout, no retry. The response
//! body is returned untouched; interpreting it is the controller's job.

use std::future::Future;

use crate::errors::{DiagError, DiagResult};
use crate::file::SelectedFile;
use crate::protocol::{FILE_FIELD, PREDICT_PATH};

/// `Send` on native targets, nothing on WASM where futures are single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSend: Send {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send> MaybeSend for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSend {}
#[cfg(target_arch = "wasm32")]
impl<T> MaybeSend for T {}

/// Something that can deliver an image to the classifier.
///
/// The returned future owns everything it needs so front ends can run it as
/// a detached task.
pub trait PredictTransport {
    /// Send `file` and return the raw response body.
    ///
    /// `Err` means the request itself failed; a response with an error
    /// payload is still `Ok`.
    fn predict(&self, file: SelectedFile) -> impl Future<Output = DiagResult<Vec<u8>>> + MaybeSend + 'static;
}

/// Build the endpoint URL from a server base URL
pub fn predict_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), PREDICT_PATH)
}

/// HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    /// Create a transport for the server at `base_url`.
    pub fn new(base_url: &str) -> DiagResult<Self> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.user_agent(format!("Lesionscope/{}", env!("CARGO_PKG_VERSION")));

        let client = builder
            .build()
            .map_err(|e| DiagError::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(HttpTransport {
            client,
            url: predict_url(base_url),
        })
    }

    /// The full `/predict` URL requests go to
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl PredictTransport for HttpTransport {
    fn predict(&self, file: SelectedFile) -> impl Future<Output = DiagResult<Vec<u8>>> + MaybeSend + 'static {
        let client = self.client.clone();
        let url = self.url.clone();
        async move { post_image(&client, &url, file).await }
    }
}

async fn post_image(client: &reqwest::Client, url: &str, file: SelectedFile) -> DiagResult<Vec<u8>> {
    tracing::debug!(url, file = %file.name, bytes = file.len(), "posting image");

    let part = reqwest::multipart::Part::bytes(file.bytes)
        .file_name(file.name)
        .mime_str(file.mime)?;
    let form = reqwest::multipart::Form::new().part(FILE_FIELD, part);

    let response = client.post(url).multipart(form).send().await?;
    // Error payloads arrive with 500; the body still decides the outcome
    tracing::debug!(status = %response.status(), "prediction response received");

    let body = response.bytes().await?;
    Ok(body.to_vec())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_url_joins_fixed_path() {
        assert_eq!(predict_url("http://127.0.0.1:5000"), "http://127.0.0.1:5000/predict");
        assert_eq!(predict_url("https://scan.example.org/"), "https://scan.example.org/predict");
    }

    #[test]
    fn test_http_transport_url() {
        let transport = HttpTransport::new("http://localhost:8080/").unwrap();
        assert_eq!(transport.url(), "http://localhost:8080/predict");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        // Port 9 (discard) on loopback is not expected to accept HTTP
        let transport = HttpTransport::new("http://127.0.0.1:9").unwrap();
        let file = SelectedFile::from_bytes("lesion.png", vec![0x89, b'P', b'N', b'G']);
        let err = transport.predict(file).await.unwrap_err();
        assert_eq!(err.error_code(), "TRANSPORT_ERROR");
    }
}
