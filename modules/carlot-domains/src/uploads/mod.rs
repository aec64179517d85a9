//! Local-disk storage for uploaded brand and car images.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

/// A file received from a client, not yet written to disk.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(original_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            original_name: original_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Writes uploads under one directory and renders their public URLs.
///
/// File names are `{unix_millis}-{8 hex}-{sanitized original name}`; the
/// stored name is what records keep, never a full path.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    public_url: String,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create upload dir {}", self.dir.display()))
    }

    pub async fn save(&self, upload: &UploadedFile) -> Result<String> {
        let file_name = stored_name(&upload.original_name);
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, &upload.bytes)
            .await
            .with_context(|| format!("Failed to write upload {}", path.display()))?;
        tracing::debug!(file = %file_name, bytes = upload.bytes.len(), "Stored upload");
        Ok(file_name)
    }

    /// Save every upload, or none: on failure the files already written
    /// are removed before the error is returned.
    pub async fn save_all(&self, uploads: &[UploadedFile]) -> Result<Vec<String>> {
        let mut saved = Vec::with_capacity(uploads.len());
        for upload in uploads {
            match self.save(upload).await {
                Ok(name) => saved.push(name),
                Err(e) => {
                    self.remove_best_effort(&saved).await;
                    return Err(e);
                }
            }
        }
        Ok(saved)
    }

    pub async fn remove(&self, file_name: &str) -> Result<()> {
        let path = self.path_for(file_name)?;
        tokio::fs::remove_file(&path)
            .await
            .with_context(|| format!("Failed to remove upload {}", path.display()))
    }

    /// Remove files, logging failures instead of returning them.
    pub async fn remove_best_effort(&self, file_names: &[String]) {
        for name in file_names {
            if let Err(e) = self.remove(name).await {
                tracing::warn!(file = %name, error = %e, "Image cleanup failed");
            }
        }
    }

    pub fn path_for(&self, file_name: &str) -> Result<PathBuf> {
        if file_name.is_empty()
            || file_name.contains('/')
            || file_name.contains('\\')
            || file_name == "."
            || file_name == ".."
        {
            bail!("invalid stored file name: {file_name:?}");
        }
        Ok(self.dir.join(file_name))
    }

    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}/uploads/{}", self.public_url, file_name)
    }
}

fn stored_name(original: &str) -> String {
    let base = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let mut clean: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if clean.trim_matches(|c| c == '.' || c == '_').is_empty() {
        clean = "image".to_string();
    }
    let tag = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", Utc::now().timestamp_millis(), &tag[..8], clean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_name_is_timestamped_and_sanitized() {
        let name = stored_name("../../etc/My Car (1).jpg");
        let parts: Vec<&str> = name.splitn(3, '-').collect();
        assert!(parts[0].parse::<i64>().is_ok());
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2], "My_Car__1_.jpg");
        assert!(!name.contains('/'));
    }

    #[test]
    fn empty_original_name_gets_placeholder() {
        assert!(stored_name("").ends_with("-image"));
        assert!(stored_name("..").ends_with("-image"));
    }

    #[test]
    fn path_traversal_is_rejected() {
        let store = ImageStore::new("/tmp/uploads", "http://localhost:5000/");
        assert!(store.path_for("../secret").is_err());
        assert!(store.path_for("..").is_err());
        assert_eq!(
            store.url_for("1-abc-car.jpg"),
            "http://localhost:5000/uploads/1-abc-car.jpg"
        );
    }

    #[tokio::test]
    async fn save_then_remove_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), "http://localhost:5000");
        let name = store
            .save(&UploadedFile::new("front.png", vec![1u8, 2, 3]))
            .await
            .unwrap();
        let path = store.path_for(&name).unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), vec![1u8, 2, 3]);

        store.remove(&name).await.unwrap();
        assert!(!path.exists());
        // Second removal fails but best-effort cleanup swallows it.
        assert!(store.remove(&name).await.is_err());
        store.remove_best_effort(&[name]).await;
    }
}
