use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::config::CloudinaryConfig;

/// A file part received in a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field_name: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upload rejected: {0}")]
    Rejected(String),
}

/// Object storage: turns an uploaded file into a retrievable URL.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    async fn upload(&self, file: &UploadedFile) -> Result<String, UploadError>;
}

pub struct CloudinaryUploader {
    client: Client,
    endpoint: String,
    api_key: String,
    upload_preset: String,
    folder: Option<String>,
}

impl CloudinaryUploader {
    pub fn new(config: &CloudinaryConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!(
                "https://api.cloudinary.com/v1_1/{}/image/upload",
                config.cloud_name
            ),
            api_key: config.api_key.clone(),
            upload_preset: config.upload_preset.clone(),
            folder: config.folder.clone(),
        }
    }
}

#[async_trait]
impl ImageUploader for CloudinaryUploader {
    async fn upload(&self, file: &UploadedFile) -> Result<String, UploadError> {
        let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type)?;
        }

        let mut form = Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone())
            .text("api_key", self.api_key.clone());
        if let Some(folder) = &self.folder {
            form = form.text("folder", folder.clone());
        }

        let response_body: Value = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?
            .json()
            .await?;

        match response_body["secure_url"].as_str() {
            Some(url) => {
                log::info!("uploaded {} ({}) to {url}", file.file_name, file.field_name);
                Ok(url.to_string())
            }
            None => Err(UploadError::Rejected(response_body.to_string())),
        }
    }
}
