use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::{
    DocumentRecord, GenerateDocumentRequest, GeneratedDocument, InvoiceConfirmation, InvoiceRequest,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const FALLBACK_DOCUMENT_NAME: &str = "pad-document.pdf";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Check your internet connection and try again.")]
    Connection,
    #[error("{0}")]
    Backend(String),
    #[error("{0}")]
    File(String),
    #[error("Unexpected response from the server: {0}")]
    InvalidResponse(String),
    #[error("Could not initialize HTTP client: {0}")]
    Client(String),
}

/// Backend coordinates, read once at startup and handed to the client at
/// construction time. Nothing below this layer touches the environment.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub api_token: String,
    pub account_id: String,
}

impl BackendConfig {
    /// `None` when any of the three variables is missing or blank; the app
    /// still starts and reports not_configured.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("PAD_API_BASE_URL").ok()?;
        let api_token = std::env::var("PAD_API_TOKEN").ok()?;
        let account_id = std::env::var("PAD_ACCOUNT_ID").ok()?;
        if base_url.trim().is_empty() || api_token.trim().is_empty() || account_id.trim().is_empty()
        {
            return None;
        }
        Some(Self {
            base_url: base_url.trim().to_string(),
            api_token: api_token.trim().to_string(),
            account_id: account_id.trim().to_string(),
        })
    }
}

/// Blocking HTTP client for the pad backend. Every request carries the bearer
/// token and the account identifier; this layer never interprets either.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    config: BackendConfig,
}

impl ApiClient {
    pub fn new(config: BackendConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;
        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.config.api_token)
            .query(&[("account", self.config.account_id.as_str())])
    }

    /// Fetch the pad history for the configured account.
    pub fn fetch_history(&self) -> Result<Vec<DocumentRecord>, ApiError> {
        let url = self.url("pads/history");
        debug!(%url, "fetching pad history");
        let response = self
            .authorize(self.http.get(&url))
            .send()
            .map_err(send_error)?;
        let response = check_status(response)?;
        response
            .json::<Vec<DocumentRecord>>()
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// Upload the pad PDF plus optional metadata; the backend responds with
    /// the generated document bytes and suggests a filename via
    /// Content-Disposition.
    pub fn generate_document(
        &self,
        file_path: &Path,
        request: &GenerateDocumentRequest,
    ) -> Result<GeneratedDocument, ApiError> {
        let bytes = read_file(file_path)?;
        let upload_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("pad.pdf")
            .to_string();

        let mut form = Form::new().part("file", Part::bytes(bytes).file_name(upload_name));
        if !request.authorizers.is_empty() {
            let authorizers = serde_json::to_string(&request.authorizers)
                .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
            form = form.text("authorizers", authorizers);
        }
        if let Some(contact) = &request.contact {
            if let Some(email) = contact.email.as_deref().filter(|s| !s.trim().is_empty()) {
                form = form.text("contactEmail", email.to_string());
            }
            if let Some(phone) = contact.phone.as_deref().filter(|s| !s.trim().is_empty()) {
                form = form.text("contactPhone", phone.to_string());
            }
        }
        if let Some(address) = request.address.as_deref().filter(|s| !s.trim().is_empty()) {
            form = form.text("address", address.to_string());
        }

        let url = self.url("pads/generate");
        debug!(%url, "submitting pad document generation");
        let response = self
            .authorize(self.http.post(&url))
            .multipart(form)
            .send()
            .map_err(send_error)?;
        let response = check_status(response)?;

        let file_name = response
            .headers()
            .get("Content-Disposition")
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_content_disposition)
            .unwrap_or_else(|| FALLBACK_DOCUMENT_NAME.to_string());
        let bytes = response
            .bytes()
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        Ok(GeneratedDocument {
            file_name,
            bytes: bytes.to_vec(),
        })
    }

    /// Submit the invoice; line items arrive at the backend in display order.
    pub fn send_invoice(&self, request: &InvoiceRequest) -> Result<InvoiceConfirmation, ApiError> {
        let url = self.url("invoices/send");
        debug!(%url, items = request.items.len(), "sending invoice");
        let response = self
            .authorize(self.http.post(&url))
            .json(request)
            .send()
            .map_err(send_error)?;
        let response = check_status(response)?;
        response
            .json::<InvoiceConfirmation>()
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, ApiError> {
    fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ApiError::File("File not found.".to_string())
        } else {
            ApiError::File(format!("Could not read file: {}", e))
        }
    })
}

fn send_error(e: reqwest::Error) -> ApiError {
    if e.is_connect() || e.is_timeout() {
        ApiError::Connection
    } else {
        ApiError::Backend("Network error.".to_string())
    }
}

fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    let message = backend_message(status, &body);
    warn!(%status, "backend request failed");
    Err(ApiError::Backend(message))
}

/// Prefer the backend's own error payload ({"message": ...} or
/// {"error": ...}); fall back to a generic message.
fn backend_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(message) = value.get(key).and_then(|m| m.as_str()) {
                let message = message.trim();
                if !message.is_empty() {
                    return message.to_string();
                }
            }
        }
    }
    format!("Request failed ({}).", status)
}

fn filename_from_content_disposition(value: &str) -> Option<String> {
    let marker = "filename=";
    let idx = value.find(marker)?;
    let raw = value[idx + marker.len()..]
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches('"')
        .trim();
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}
