use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::domain::SelectedFile;
use tracing::debug;
use url::Url;

use crate::error::TransportError;

/// Multipart field the validation service reads the upload from.
pub const FILE_FIELD: &str = "file";
const CSV_MIME: &str = "text/csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues exactly one upload per call. Status codes and bodies are returned
/// as-is; only a missing response is an error.
#[async_trait]
pub trait ValidationTransport: Send + Sync {
    async fn post_file(&self, url: &Url, file: &SelectedFile)
        -> Result<RawResponse, TransportError>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ValidationTransport for HttpTransport {
    async fn post_file(
        &self,
        url: &Url,
        file: &SelectedFile,
    ) -> Result<RawResponse, TransportError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.filename.clone())
            .mime_str(CSV_MIME)?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self.http.post(url.clone()).multipart(form).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        debug!(%url, status, body_len = body.len(), "validation response received");

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
