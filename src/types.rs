use serde::{Deserialize, Serialize};

/// Named role attached to a generated document (e.g. approver), rendered as "name (role)".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Authorizer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// One historical generated-document entry, exactly as the backend returns it.
/// Fetched and displayed only; never mutated locally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub receiver_email: String,
    #[serde(default)]
    pub authorizers: Vec<Authorizer>,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub sent: bool,
    #[serde(default)]
    pub sent_at: Option<String>,
    #[serde(default)]
    pub downloaded_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Optional metadata sent along with the pad file on document generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDocumentRequest {
    #[serde(default)]
    pub authorizers: Vec<Authorizer>,
    #[serde(default)]
    pub contact: Option<ContactInfo>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Binary document payload returned by the backend, plus the suggested filename.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    pub receiver_email: String,
    pub subject: String,
    /// Line items in display order; the backend receives them in this order.
    pub items: Vec<crate::invoice::LineItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authorizers: Vec<Authorizer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Confirmation payload from a successful invoice submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceConfirmation {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub issue_date: Option<String>,
    #[serde(default)]
    pub total: f64,
}
