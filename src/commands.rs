use crate::api::ApiClient;
use crate::export;
use crate::history;
use crate::invoice::{InvoiceDraft, InvoiceTotals, ItemField, LineItem};
use crate::types::{
    Authorizer, ContactInfo, DocumentRecord, GenerateDocumentRequest, InvoiceConfirmation,
    InvoiceRequest,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tauri::{AppHandle, Manager, State};
use tracing::{debug, info};

#[derive(Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn rejected(message: &str) -> Self {
        Self {
            valid: false,
            error: Some(message.to_string()),
        }
    }
}

pub struct AppState {
    pub api: Mutex<Option<ApiClient>>,
    pub history: Mutex<Vec<DocumentRecord>>,
    pub draft: Mutex<InvoiceDraft>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemPayload {
    pub index: usize,
    pub field: ItemField,
    pub value: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportHistoryPayload {
    pub query: Option<String>,
    pub path: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDocumentPayload {
    pub file_path: String,
    pub output_dir: String,
    #[serde(default)]
    pub request: GenerateDocumentRequest,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendInvoicePayload {
    pub receiver_email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub authorizers: Vec<Authorizer>,
    #[serde(default)]
    pub contact: Option<ContactInfo>,
    #[serde(default)]
    pub address: Option<String>,
}

fn backend_client(state: &State<AppState>) -> Result<ApiClient, String> {
    let api = state.api.lock().map_err(|e| e.to_string())?;
    api.clone()
        .ok_or_else(|| "Backend not configured. Add PAD_API_* credentials to .env.".to_string())
}

#[tauri::command]
pub fn get_app_version(app: AppHandle) -> String {
    app.package_info().version.to_string()
}

#[tauri::command]
pub fn get_backend_status(state: State<AppState>) -> Result<String, String> {
    let api = state.api.lock().map_err(|e| e.to_string())?;
    Ok(if api.is_some() {
        "configured".to_string()
    } else {
        "not_configured".to_string()
    })
}

#[tauri::command]
pub fn open_app_data_folder(app: AppHandle) -> Result<(), String> {
    let path = app.path().app_data_dir().map_err(|e| e.to_string())?;
    opener::open(&path).map_err(|e| e.to_string())
}

/// Show an exported or generated file in the system file manager.
#[tauri::command]
pub fn reveal_in_folder(path: String) -> Result<(), String> {
    opener::reveal(Path::new(&path)).map_err(|e| e.to_string())
}

/// Refresh the history list from the backend. On failure the previously
/// fetched list is left untouched; the user retries manually.
#[tauri::command]
pub async fn fetch_pad_history(state: State<'_, AppState>) -> Result<Vec<DocumentRecord>, String> {
    let client = backend_client(&state)?;
    let records = tauri::async_runtime::spawn_blocking(move || client.fetch_history())
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())?;
    debug!(count = records.len(), "pad history refreshed");
    let mut history = state.history.lock().map_err(|e| e.to_string())?;
    *history = records.clone();
    Ok(records)
}

/// Derived view over the cached history list; recomputed on every call.
#[tauri::command]
pub fn filter_pad_history(
    state: State<AppState>,
    query: Option<String>,
) -> Result<Vec<DocumentRecord>, String> {
    let records = state.history.lock().map_err(|e| e.to_string())?;
    Ok(history::filter_records(
        &records,
        query.as_deref().unwrap_or(""),
    ))
}

/// Export the currently filtered view to CSV. Returns the written path, or
/// `None` when the view is empty and no file was produced.
#[tauri::command]
pub async fn export_pad_history_csv(
    state: State<'_, AppState>,
    payload: ExportHistoryPayload,
) -> Result<Option<String>, String> {
    let filtered = {
        let records = state.history.lock().map_err(|e| e.to_string())?;
        history::filter_records(&records, payload.query.as_deref().unwrap_or(""))
    };
    let count = filtered.len();
    let written = tauri::async_runtime::spawn_blocking(move || {
        export::write_history_csv(Path::new(&payload.path), &filtered)
    })
    .await
    .map_err(|e| e.to_string())??;
    if written.is_some() {
        info!(rows = count, "pad history exported to CSV");
    }
    Ok(written.map(|p| p.to_string_lossy().to_string()))
}

/// Pre-submission check of the selected pad file: it must exist, stay under
/// the upload size cap and carry the PDF magic.
#[tauri::command]
pub fn validate_pad_file(path: String) -> Result<ValidationResult, String> {
    const MAX_PAD_FILE_BYTES: u64 = 20 * 1024 * 1024;
    let path = Path::new(&path);
    if !path.exists() {
        return Ok(ValidationResult::rejected("File not found."));
    }
    let metadata = fs::metadata(path).map_err(|e| e.to_string())?;
    if metadata.len() > MAX_PAD_FILE_BYTES {
        return Ok(ValidationResult::rejected("File too large (max 20MB)."));
    }
    let mut f = fs::File::open(path).map_err(|e| format!("Could not open: {}", e))?;
    let mut header = [0u8; 8];
    use std::io::Read;
    if f.read(&mut header).unwrap_or(0) < 5 {
        return Ok(ValidationResult::rejected(
            "Not a valid PDF (could not read header).",
        ));
    }
    if !header.starts_with(b"%PDF-") {
        return Ok(ValidationResult::rejected("Not a valid PDF file."));
    }
    Ok(ValidationResult::ok())
}

/// Read the selected pad file for preview in the webview.
#[tauri::command]
pub fn read_pad_file_base64(path: String) -> Result<String, String> {
    match fs::read(Path::new(&path)) {
        Ok(bytes) => Ok(BASE64.encode(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err("File not found.".to_string()),
        Err(e) => Err(format!("Could not read file: {}", e)),
    }
}

/// Upload the pad file plus metadata, save the returned document under the
/// backend's suggested filename, and return the written path.
#[tauri::command]
pub async fn generate_pad_document(
    state: State<'_, AppState>,
    payload: GenerateDocumentPayload,
) -> Result<String, String> {
    if payload.file_path.trim().is_empty() {
        return Err("Select a pad PDF file first.".to_string());
    }
    let client = backend_client(&state)?;
    tauri::async_runtime::spawn_blocking(move || {
        let document = client
            .generate_document(Path::new(&payload.file_path), &payload.request)
            .map_err(|e| e.to_string())?;
        // The suggested name comes from an HTTP header; strip any path part.
        let file_name = Path::new(&document.file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("pad-document.pdf")
            .to_string();
        let output_dir = Path::new(&payload.output_dir);
        fs::create_dir_all(output_dir).map_err(|e| format!("Could not create folder: {}", e))?;
        let target = output_dir.join(file_name);
        fs::write(&target, &document.bytes)
            .map_err(|e| format!("Could not write document: {}", e))?;
        Ok(target.to_string_lossy().to_string())
    })
    .await
    .map_err(|e| e.to_string())?
}

#[tauri::command]
pub fn invoice_items(state: State<AppState>) -> Result<Vec<LineItem>, String> {
    let draft = state.draft.lock().map_err(|e| e.to_string())?;
    Ok(draft.items.clone())
}

#[tauri::command]
pub fn invoice_add_item(state: State<AppState>) -> Result<Vec<LineItem>, String> {
    let mut draft = state.draft.lock().map_err(|e| e.to_string())?;
    draft.add_item();
    Ok(draft.items.clone())
}

#[tauri::command]
pub fn invoice_remove_item(state: State<AppState>, index: usize) -> Result<Vec<LineItem>, String> {
    let mut draft = state.draft.lock().map_err(|e| e.to_string())?;
    draft.remove_item(index)?;
    Ok(draft.items.clone())
}

#[tauri::command]
pub fn invoice_update_item(
    state: State<AppState>,
    payload: UpdateItemPayload,
) -> Result<InvoiceTotals, String> {
    let mut draft = state.draft.lock().map_err(|e| e.to_string())?;
    draft.update_item(payload.index, payload.field, &payload.value)?;
    Ok(draft.totals())
}

#[tauri::command]
pub fn invoice_totals(state: State<AppState>) -> Result<InvoiceTotals, String> {
    let draft = state.draft.lock().map_err(|e| e.to_string())?;
    Ok(draft.totals())
}

/// Validate and submit the invoice draft. The draft resets only after the
/// backend confirms.
#[tauri::command]
pub async fn send_invoice(
    state: State<'_, AppState>,
    payload: SendInvoicePayload,
) -> Result<InvoiceConfirmation, String> {
    if payload.receiver_email.trim().is_empty() {
        return Err("Receiver email is required.".to_string());
    }
    let items = {
        let draft = state.draft.lock().map_err(|e| e.to_string())?;
        draft.validate()?;
        draft.items.clone()
    };
    let client = backend_client(&state)?;
    let request = InvoiceRequest {
        receiver_email: payload.receiver_email.trim().to_string(),
        subject: payload.subject.trim().to_string(),
        items,
        authorizers: payload.authorizers,
        contact: payload.contact,
        address: payload.address,
    };
    let confirmation = tauri::async_runtime::spawn_blocking(move || client.send_invoice(&request))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())?;
    info!(serial = %confirmation.serial, "invoice sent");
    let mut draft = state.draft.lock().map_err(|e| e.to_string())?;
    *draft = InvoiceDraft::default();
    Ok(confirmation)
}
