//! CSV rendering of the admin user export.

use chrono::{DateTime, Utc};
use domains::{DomainError, Result, UserExportRow};

const HEADER: [&str; 8] = [
    "ID",
    "Username",
    "Email",
    "Role",
    "Status",
    "Artworks Count",
    "Created At",
    "Updated At",
];

const TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

/// A rendered export, ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct UsersCsv {
    pub file_name: String,
    pub body: Vec<u8>,
}

impl UsersCsv {
    pub fn render(rows: &[UserExportRow], generated_at: DateTime<Utc>) -> Result<Self> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(HEADER).map_err(DomainError::internal)?;
        for row in rows {
            let updated_at = row
                .updated_at
                .map(|t| t.format(TIMESTAMP).to_string())
                .unwrap_or_default();
            writer
                .write_record([
                    row.id.to_string(),
                    row.username.clone(),
                    row.email.clone(),
                    row.role.to_string(),
                    row.status.to_string(),
                    row.artworks_count.to_string(),
                    row.created_at.format(TIMESTAMP).to_string(),
                    updated_at,
                ])
                .map_err(DomainError::internal)?;
        }
        let body = writer
            .into_inner()
            .map_err(|e| DomainError::internal(anyhow::anyhow!("flushing csv: {e}")))?;

        Ok(Self {
            file_name: format!("users_export_{}.csv", generated_at.format("%Y%m%d_%H%M%S")),
            body,
        })
    }
}
