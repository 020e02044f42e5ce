use std::fs;
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, WriterBuilder};

use crate::history::format_timestamp;
use crate::types::DocumentRecord;

const HISTORY_COLUMNS: [&str; 12] = [
    "Serial",
    "Subject",
    "Receiver Email",
    "Authorizers",
    "Contact Email",
    "Contact Phone",
    "Address",
    "Sent",
    "SentAt",
    "DownloadedAt",
    "CreatedAt",
    "UpdatedAt",
];

/// Serialize records to CSV text: header row, one row per record, every field
/// quoted, embedded quotes doubled, `\n` row terminator with a trailing
/// newline. An empty list yields `None` so callers produce no file.
pub fn records_to_csv(records: &[DocumentRecord]) -> Result<Option<String>, String> {
    if records.is_empty() {
        return Ok(None);
    }
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());
    writer
        .write_record(HISTORY_COLUMNS)
        .map_err(|e| format!("Could not build CSV: {}", e))?;
    for record in records {
        writer
            .write_record(record_row(record))
            .map_err(|e| format!("Could not build CSV: {}", e))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| format!("Could not build CSV: {}", e))?;
    let text = String::from_utf8(bytes).map_err(|e| format!("Could not build CSV: {}", e))?;
    Ok(Some(text))
}

fn record_row(record: &DocumentRecord) -> Vec<String> {
    let authorizers = record
        .authorizers
        .iter()
        .map(|a| format!("{} ({})", a.name, a.role))
        .collect::<Vec<_>>()
        .join("; ");
    vec![
        record.serial.clone(),
        record.subject.clone(),
        record.receiver_email.clone(),
        authorizers,
        record.contact_email.clone(),
        record.contact_phone.clone(),
        record.address.clone(),
        if record.sent { "Yes" } else { "No" }.to_string(),
        format_timestamp(record.sent_at.as_deref()),
        format_timestamp(record.downloaded_at.as_deref()),
        format_timestamp(record.created_at.as_deref()),
        format_timestamp(record.updated_at.as_deref()),
    ]
}

/// Write the CSV to `path`. Returns the written path, or `None` when the
/// record list is empty and no file was produced.
pub fn write_history_csv(path: &Path, records: &[DocumentRecord]) -> Result<Option<PathBuf>, String> {
    let Some(text) = records_to_csv(records)? else {
        return Ok(None);
    };
    fs::write(path, text).map_err(|e| format!("Could not write CSV file: {}", e))?;
    Ok(Some(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Authorizer;

    fn record() -> DocumentRecord {
        DocumentRecord {
            serial: "PAD-0042".to_string(),
            subject: "Quarterly statement".to_string(),
            receiver_email: "finance@corp.example".to_string(),
            authorizers: vec![
                Authorizer {
                    name: "Amina Rahman".to_string(),
                    role: "Director".to_string(),
                },
                Authorizer {
                    name: "Karim Uddin".to_string(),
                    role: "Accountant".to_string(),
                },
            ],
            contact_email: "office@corp.example".to_string(),
            contact_phone: "+880123456789".to_string(),
            address: "12 Lake Road, Dhaka".to_string(),
            sent: true,
            sent_at: Some("2026-08-07T14:30:00Z".to_string()),
            downloaded_at: None,
            created_at: Some("2026-08-01T08:00:00Z".to_string()),
            updated_at: Some("2026-08-07T14:30:00Z".to_string()),
        }
    }

    #[test]
    fn empty_list_produces_no_output() {
        assert_eq!(records_to_csv(&[]).unwrap(), None);
    }

    #[test]
    fn empty_list_writes_no_file() {
        let path = std::env::temp_dir().join("pad_admin_export_empty_test.csv");
        let _ = fs::remove_file(&path);
        let written = write_history_csv(&path, &[]).unwrap();
        assert_eq!(written, None);
        assert!(!path.exists());
    }

    #[test]
    fn header_row_comes_first_and_rows_end_with_newline() {
        let text = records_to_csv(&[record()]).unwrap().unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "\"Serial\",\"Subject\",\"Receiver Email\",\"Authorizers\",\"Contact Email\",\"Contact Phone\",\"Address\",\"Sent\",\"SentAt\",\"DownloadedAt\",\"CreatedAt\",\"UpdatedAt\""
        );
        assert!(text.ends_with('\n'));
        assert!(!text.contains("\r\n"));
    }

    #[test]
    fn every_field_is_quoted_and_authorizers_are_joined() {
        let text = records_to_csv(&[record()]).unwrap().unwrap();
        let row = text.lines().nth(1).unwrap();
        assert!(row.starts_with("\"PAD-0042\""));
        assert!(row.contains("\"Amina Rahman (Director); Karim Uddin (Accountant)\""));
        assert!(row.contains("\"Yes\""));
        assert!(row.contains("\"07 Aug 2026 14:30\""));
        // downloaded_at is absent -> placeholder dash
        assert!(row.contains("\"-\""));
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        let mut r = record();
        r.subject = "He said \"pay now\"".to_string();
        let text = records_to_csv(&[r]).unwrap().unwrap();
        assert!(text.contains("\"He said \"\"pay now\"\"\""));
    }

    #[test]
    fn unsent_record_renders_no_and_placeholder() {
        let mut r = record();
        r.sent = false;
        r.sent_at = None;
        let text = records_to_csv(&[r]).unwrap().unwrap();
        let row = text.lines().nth(1).unwrap();
        assert!(row.contains("\"No\",\"-\""));
    }

    #[test]
    fn missing_fields_render_as_empty_strings() {
        let text = records_to_csv(&[DocumentRecord::default()]).unwrap().unwrap();
        let row = text.lines().nth(1).unwrap();
        assert!(row.starts_with("\"\",\"\",\"\",\"\""));
    }

    #[test]
    fn one_row_per_record() {
        let text = records_to_csv(&[record(), DocumentRecord::default()])
            .unwrap()
            .unwrap();
        assert_eq!(text.lines().count(), 3);
    }
}
