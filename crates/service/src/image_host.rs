//! Pass-through upload of banner images to an external image host.
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use configs::UploadConfig;

use crate::errors::ServiceError;

/// Raw file received from a multipart request.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
}

#[derive(Clone)]
pub struct ImageHost {
    client: reqwest::Client,
    endpoint: Option<String>,
    api_key: Option<String>,
    folder: String,
}

impl ImageHost {
    pub fn new(cfg: &UploadConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: cfg.endpoint.clone(),
            api_key: cfg.api_key.clone(),
            folder: cfg.folder.clone(),
        }
    }

    pub fn is_configured(&self) -> bool { self.endpoint.is_some() }

    /// Upload and return the hosted URL.
    #[instrument(skip(self, file), fields(file_name = %file.file_name, size = file.bytes.len()))]
    pub async fn upload(&self, file: ImageFile) -> Result<String, ServiceError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| ServiceError::Unavailable("Image upload is not configured".into()))?;
        if file.bytes.is_empty() {
            return Err(ServiceError::Validation("Uploaded image is empty".into()));
        }

        let mut part = Part::bytes(file.bytes).file_name(file.file_name.clone());
        if let Some(ct) = &file.content_type {
            part = part
                .mime_str(ct)
                .map_err(|e| ServiceError::Validation(format!("Invalid image content type: {e}")))?;
        }
        let mut form = Form::new().part("file", part).text("folder", self.folder.clone());
        if let Some(key) = &self.api_key {
            form = form.text("api_key", key.clone());
        }

        let resp = self
            .client
            .post(endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ServiceError::Upstream(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            warn!(%status, "image_upload_rejected");
            return Err(ServiceError::Upstream(format!("image host responded with {status}")));
        }
        let body: UploadResponse = resp.json().await.map_err(|e| ServiceError::Upstream(e.to_string()))?;
        let url = body
            .secure_url
            .or(body.url)
            .ok_or_else(|| ServiceError::Upstream("image host response missing url".into()))?;
        info!(event = "image_uploaded", %url);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_host_is_unavailable() {
        let host = ImageHost::new(&UploadConfig::default());
        assert!(!host.is_configured());
        let err = host
            .upload(ImageFile { file_name: "a.png".into(), content_type: None, bytes: vec![1, 2, 3] })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
    }
}
