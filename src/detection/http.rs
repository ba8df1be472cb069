use std::time::Duration;

use async_trait::async_trait;
use docdetect_wire::{field, DetectionRequest, IMAGE_CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use super::client::{DetectionOutcome, DetectionService, ImageUpload};
use super::error::TransportError;
use crate::settings::types::ServiceSettings;

/// Detection service client speaking multipart over HTTP.
pub struct HttpDetectionClient {
    http: reqwest::Client,
    endpoint: String,
    request: DetectionRequest,
}

impl HttpDetectionClient {
    pub fn new(settings: &ServiceSettings) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: settings.api_url.clone(),
            request: DetectionRequest::new(settings.license_id.clone()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn form(&self, image: ImageUpload) -> Result<Form, TransportError> {
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(IMAGE_CONTENT_TYPE)
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let form = self
            .request
            .text_fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));
        Ok(form.part(field::IMAGE, part))
    }

    async fn post(&self, image: ImageUpload) -> Result<Option<Vec<u8>>, TransportError> {
        let form = self.form(image)?;

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(docdetect_wire::parse_response(&body)?)
    }
}

#[async_trait]
impl DetectionService for HttpDetectionClient {
    async fn submit(&self, image: ImageUpload) -> DetectionOutcome {
        let file_name = image.file_name.clone();
        let bytes = image.bytes.len();
        debug!(endpoint = %self.endpoint, %file_name, bytes, "Submitting image");

        let outcome = DetectionOutcome::from(self.post(image).await);
        match &outcome {
            DetectionOutcome::Detected(crop) => {
                debug!(%file_name, crop_bytes = crop.len(), "Document detected");
            }
            DetectionOutcome::NotDetected => debug!(%file_name, "No document detected"),
            DetectionOutcome::TransportError(e) => {
                warn!(%file_name, "Detection request failed: {e}");
            }
        }
        outcome
    }
}
