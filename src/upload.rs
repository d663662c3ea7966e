use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::multipart;
use serde::Deserialize;

use crate::config::Config;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One captured image on its way to the upload endpoint. Consumed by a
/// single `Uploader::upload` call.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub bytes: Vec<u8>,
    pub source: Source,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(String),
    Clipboard,
}

impl UploadRequest {
    pub fn from_file(bytes: Vec<u8>, filename: &str) -> Self {
        Self {
            bytes,
            source: Source::File(filename.to_string()),
        }
    }

    pub fn from_clipboard(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            source: Source::Clipboard,
        }
    }

    fn file_name(&self) -> String {
        match &self.source {
            Source::File(name) => name.clone(),
            Source::Clipboard => "clipboard.png".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// The endpoint answered with a non-200 status.
    Status(u16),
    /// The request never completed: timeout, DNS failure, refused
    /// connection, or a response body that was not the expected JSON.
    Network,
}

impl Display for UploadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Status(status) => {
                write!(f, "Error uploading image: HTTP {}", status)
            }
            UploadError::Network => write!(
                f,
                "Network error: Unable to connect to Imgur. Check your internet connection."
            ),
        }
    }
}

impl std::error::Error for UploadError {}

#[derive(Deserialize)]
struct UploadResponse {
    data: UploadData,
}

#[derive(Deserialize)]
struct UploadData {
    link: String,
}

pub struct Uploader {
    client: reqwest::blocking::Client,
    upload_url: String,
    client_id: String,
}

impl Uploader {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            upload_url: config.upload_url.clone(),
            client_id: config.client_id.clone(),
        })
    }

    /// Posts the image as the multipart `image` field and returns the
    /// markdown link for it. Callers only see the error category, never
    /// the underlying cause.
    pub fn upload(&self, request: &UploadRequest) -> std::result::Result<String, UploadError> {
        let mut part = multipart::Part::bytes(request.bytes.clone()).file_name(request.file_name());
        if request.source == Source::Clipboard {
            part = part.mime_str("image/png").map_err(|_| UploadError::Network)?;
        }
        let form = multipart::Form::new().part("image", part);

        let response = self
            .client
            .post(&self.upload_url)
            .header("Authorization", format!("Client-ID {}", self.client_id))
            .multipart(form)
            .send()
            .map_err(|_| UploadError::Network)?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(UploadError::Status(status));
        }

        let body: UploadResponse = response.json().map_err(|_| UploadError::Network)?;

        Ok(format!("[]({})", body.data.link))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn test_uploader(base_url: &str) -> Uploader {
        let config = Config {
            client_id: "test_client".to_string(),
            upload_url: format!("{}/3/upload", base_url),
            ..Config::default()
        };

        Uploader::new(&config).unwrap()
    }

    #[test]
    fn success_formats_markdown_link() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/3/upload")
                .header("Authorization", "Client-ID test_client");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({"data": {"link": "http://x/y.png"}}));
        });

        let uploader = test_uploader(&server.base_url());
        let result = uploader
            .upload(&UploadRequest::from_clipboard(b"fakepng".to_vec()))
            .unwrap();

        assert_eq!(result, "[](http://x/y.png)");
        mock.assert();
    }

    #[test]
    fn clipboard_source_is_sent_as_clipboard_png() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/3/upload")
                .body_contains("name=\"image\"")
                .body_contains("filename=\"clipboard.png\"");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({"data": {"link": "http://x/y.png"}}));
        });

        let uploader = test_uploader(&server.base_url());
        uploader
            .upload(&UploadRequest::from_clipboard(b"fakepng".to_vec()))
            .unwrap();

        mock.assert();
    }

    #[test]
    fn file_source_keeps_its_filename() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/3/upload")
                .body_contains("filename=\"shot.jpg\"");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({"data": {"link": "http://x/y.png"}}));
        });

        let uploader = test_uploader(&server.base_url());
        uploader
            .upload(&UploadRequest::from_file(b"fakejpg".to_vec(), "shot.jpg"))
            .unwrap();

        mock.assert();
    }

    #[test]
    fn non_200_reports_the_status_code() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/3/upload");
            then.status(403);
        });

        let uploader = test_uploader(&server.base_url());
        let err = uploader
            .upload(&UploadRequest::from_clipboard(b"fakepng".to_vec()))
            .unwrap_err();

        assert_eq!(err, UploadError::Status(403));
        assert_eq!(err.to_string(), "Error uploading image: HTTP 403");
        mock.assert();
    }

    #[test]
    fn refused_connection_is_a_network_error() {
        // Grab a port nothing listens on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let config = Config {
            upload_url: format!("http://127.0.0.1:{}/3/upload", port),
            ..Config::default()
        };
        let uploader = Uploader::new(&config).unwrap();

        let err = uploader
            .upload(&UploadRequest::from_clipboard(b"fakepng".to_vec()))
            .unwrap_err();

        assert_eq!(err, UploadError::Network);
        assert_eq!(
            err.to_string(),
            "Network error: Unable to connect to Imgur. Check your internet connection."
        );
    }

    #[test]
    fn unparseable_success_body_is_a_network_error() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/3/upload");
            then.status(200)
                .header("content-type", "application/json")
                .body("not json");
        });

        let uploader = test_uploader(&server.base_url());
        let err = uploader
            .upload(&UploadRequest::from_clipboard(b"fakepng".to_vec()))
            .unwrap_err();

        assert_eq!(err, UploadError::Network);
        mock.assert();
    }
}
