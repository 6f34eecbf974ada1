//! Filesystem-backed store for care-staff documents (certificates and HKID
//! copies). Files live independently of the staff row, which only keeps
//! their URLs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

/// Uploads above this size are rejected.
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid file name: {0}")]
    InvalidFilename(String),
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("empty file")]
    EmptyFile,
    #[error("file too large (max {MAX_FILE_SIZE} bytes)")]
    TooLarge,
}

/// What an uploaded file is attached to on the staff record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DocumentKind {
    Certificate,
    IdCopy,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct StoredDocument {
    pub name: String,
    pub size: u64,
    pub url: String,
}

#[derive(Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

fn public_url(staff_id: Uuid, name: &str) -> String {
    format!("/api/care-staff/{staff_id}/documents/{name}")
}

/// Reject anything that could escape the staff directory.
fn checked_name(name: &str) -> Result<&str, DocumentError> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.starts_with('.')
    {
        return Err(DocumentError::InvalidFilename(name.to_string()));
    }
    Ok(name)
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn staff_dir(&self, staff_id: Uuid) -> PathBuf {
        self.root.join(staff_id.to_string())
    }

    /// Store an uploaded file under a fresh unique name and return its
    /// public URL.
    pub async fn save(
        &self,
        staff_id: Uuid,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredDocument, DocumentError> {
        if bytes.is_empty() {
            return Err(DocumentError::EmptyFile);
        }
        if bytes.len() > MAX_FILE_SIZE {
            return Err(DocumentError::TooLarge);
        }
        let original = checked_name(original_name)?;

        let dir = self.staff_dir(staff_id);
        tokio::fs::create_dir_all(&dir).await?;

        // Prefix with a short unique id so repeated uploads of the same
        // form never clobber each other.
        let name = format!("{}_{}", &Uuid::new_v4().simple().to_string()[..8], original);
        tokio::fs::write(dir.join(&name), bytes).await?;

        tracing::info!(%staff_id, name, size = bytes.len(), "stored staff document");

        Ok(StoredDocument {
            url: public_url(staff_id, &name),
            size: bytes.len() as u64,
            name,
        })
    }

    pub async fn list(&self, staff_id: Uuid) -> Result<Vec<StoredDocument>, DocumentError> {
        let dir = self.staff_dir(staff_id);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut documents = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            documents.push(StoredDocument {
                url: public_url(staff_id, &name),
                size: metadata.len(),
                name,
            });
        }
        documents.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(documents)
    }

    pub async fn read(&self, staff_id: Uuid, name: &str) -> Result<Vec<u8>, DocumentError> {
        let name = checked_name(name)?;
        let path = self.staff_dir(staff_id).join(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DocumentError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, staff_id: Uuid, name: &str) -> Result<(), DocumentError> {
        let name = checked_name(name)?;
        let path = self.staff_dir(staff_id).join(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DocumentError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
