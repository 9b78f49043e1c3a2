//! Product image uploads to Cloudinary.
//!
//! Uploads are signed server-side: the signature is the SHA-256 hex digest of
//! the sorted `key=value` parameters joined by `&`, followed by the API
//! secret. `file`, `api_key` and `signature_algorithm` are sent but not signed.

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::CloudinaryConfig;

/// Errors from the image host.
#[derive(Debug, Error)]
pub enum ImageUploadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upload rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("uploaded file is empty")]
    EmptyFile,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

/// Client for the Cloudinary upload API.
#[derive(Clone, Debug)]
pub struct ImageUploader {
    inner: Arc<ImageUploaderInner>,
}

#[derive(Debug)]
struct ImageUploaderInner {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    api_secret: SecretString,
    upload_preset: Option<String>,
}

impl ImageUploader {
    #[must_use]
    pub fn new(config: &CloudinaryConfig) -> Self {
        Self {
            inner: Arc::new(ImageUploaderInner {
                client: reqwest::Client::new(),
                endpoint: format!(
                    "https://api.cloudinary.com/v1_1/{}/image/upload",
                    config.cloud_name
                ),
                api_key: config.api_key.clone(),
                api_secret: config.api_secret.clone(),
                upload_preset: config.upload_preset.clone(),
            }),
        }
    }

    /// Upload an image and return its HTTPS delivery URL.
    ///
    /// # Errors
    ///
    /// Returns `ImageUploadError::EmptyFile` for a zero-length upload and
    /// `ImageUploadError::Rejected` when the host refuses the file.
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ImageUploadError> {
        if bytes.is_empty() {
            return Err(ImageUploadError::EmptyFile);
        }

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let mut signed = BTreeMap::new();
        signed.insert("timestamp", timestamp.as_str());
        if let Some(preset) = &self.inner.upload_preset {
            signed.insert("upload_preset", preset.as_str());
        }
        let signature = sign(&signed, &self.inner.api_secret);

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;

        let mut form = Form::new()
            .part("file", part)
            .text("api_key", self.inner.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (key, value) in signed {
            form = form.text(key, value.to_string());
        }

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|e| e.error.message)
                .unwrap_or_else(|_| status.to_string());
            return Err(ImageUploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response.json().await?;
        tracing::info!(url = %body.secure_url, "Image uploaded");
        Ok(body.secure_url)
    }
}

/// Signature over the sorted parameters.
fn sign(params: &BTreeMap<&str, &str>, api_secret: &SecretString) -> String {
    let to_sign = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    hex::encode(Sha256::digest(format!(
        "{to_sign}{}",
        api_secret.expose_secret()
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_sorts_params_and_appends_secret() {
        let mut params = BTreeMap::new();
        params.insert("upload_preset", "products");
        params.insert("timestamp", "1700000000");

        let expected = hex::encode(Sha256::digest(
            "timestamp=1700000000&upload_preset=productsabcd",
        ));
        assert_eq!(sign(&params, &SecretString::from("abcd")), expected);
        assert_eq!(expected.len(), 64);
    }

    #[tokio::test]
    async fn test_empty_file_is_rejected_before_network() {
        let uploader = ImageUploader::new(&CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: secrecy::SecretString::from("unused"),
            upload_preset: None,
        });
        let err = uploader
            .upload("rose.png", "image/png", Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ImageUploadError::EmptyFile));
    }

    #[test]
    fn test_debug_output_redacts_api_secret() {
        let uploader = ImageUploader::new(&CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: SecretString::from("s3cr3t-value"),
            upload_preset: Some("products".to_string()),
        });
        let debug = format!("{uploader:?}");
        assert!(debug.contains("products"));
        assert!(!debug.contains("s3cr3t-value"));
    }
}
