mod api;
mod commands;
mod export;
mod history;
mod invoice;
mod types;

use api::{ApiClient, BackendConfig};
use commands::AppState;
use invoice::InvoiceDraft;
use std::sync::Mutex;
use tauri::Manager;
use tracing_subscriber::EnvFilter;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let app_data_dir = app.path().app_data_dir().map_err(|e| e.to_string())?;
            // Packaged builds are configured by dropping a .env into the app
            // data folder; dev builds fall back to the working directory.
            let env_path = app_data_dir.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
            }
            let _ = dotenvy::dotenv();
            let api = match BackendConfig::from_env() {
                Some(config) => Some(ApiClient::new(config).map_err(|e| e.to_string())?),
                None => {
                    tracing::warn!("PAD_API_* credentials not set; backend calls disabled");
                    None
                }
            };
            app.manage(AppState {
                api: Mutex::new(api),
                history: Mutex::new(Vec::new()),
                draft: Mutex::new(InvoiceDraft::default()),
            });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::get_app_version,
            commands::get_backend_status,
            commands::open_app_data_folder,
            commands::reveal_in_folder,
            commands::fetch_pad_history,
            commands::filter_pad_history,
            commands::export_pad_history_csv,
            commands::validate_pad_file,
            commands::read_pad_file_base64,
            commands::generate_pad_document,
            commands::invoice_items,
            commands::invoice_add_item,
            commands::invoice_remove_item,
            commands::invoice_update_item,
            commands::invoice_totals,
            commands::send_invoice,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
