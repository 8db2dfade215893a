use std::{
    io::{Cursor, Read},
    path::{Path, PathBuf},
};

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use zip::ZipArchive;

use crate::{Error, Res, utils};

use super::LetterboxdSession;

const EXPORT_PATH: &str = "/data/export";

impl LetterboxdSession {
    /// Downloads the account export and extracts it into `dest`.
    ///
    /// Every entry is decompressed and checksummed in memory before the
    /// first file is written, so nothing under `dest` changes unless the whole
    /// archive is intact.
    ///
    /// # Arguments
    ///
    /// * `dest` - Export folder, created when missing
    ///
    /// # Returns
    ///
    /// The archive's file name as announced in `Content-Disposition`.
    ///
    /// # Errors
    ///
    /// - [`Error::Auth`] when the session is not logged in
    /// - [`Error::UnexpectedResponse`] when the answer is not a ZIP archive
    /// - [`Error::Archive`] / [`Error::InvalidExport`] when an entry is corrupt,
    ///   unsafe or the archive is empty
    pub async fn download_export(&self, dest: &Path) -> Res<String> {
        if !self.logged_in() {
            return Err(Error::Auth(
                "log in before requesting the export".to_string(),
            ));
        }

        let url = self.url(EXPORT_PATH)?;
        tracing::debug!(%url, "requesting export");
        let response = self.http.get(url.clone()).send().await?.error_for_status()?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.contains("application/zip") {
            return Err(Error::UnexpectedResponse {
                url: url.to_string(),
                reason: format!("expected a ZIP archive, got '{}'", content_type),
            });
        }

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(utils::filename_from_content_disposition)
            .unwrap_or_else(|| "letterboxd-export.zip".to_string());

        let bytes = response.bytes().await?;
        tracing::info!(%filename, size = bytes.len(), "export downloaded");

        let entries = read_archive(bytes.to_vec())?;
        async_fs::create_dir_all(dest).await?;
        for entry in &entries {
            let path = dest.join(&entry.path);
            match &entry.content {
                None => async_fs::create_dir_all(&path).await?,
                Some(content) => {
                    if let Some(parent) = path.parent() {
                        async_fs::create_dir_all(parent).await?;
                    }
                    async_fs::write(&path, content).await?;
                }
            }
        }
        tracing::info!(dest = %dest.display(), files = entries.len(), "export extracted");

        Ok(filename)
    }
}

/// One decoded archive member. Directories carry no content.
struct ArchiveEntry {
    path: PathBuf,
    content: Option<Vec<u8>>,
}

/// Decodes a ZIP held in memory.
///
/// Reading each entry to its end makes the zip reader verify the CRC, so a
/// corrupt member fails here rather than halfway through the extraction.
fn read_archive(bytes: Vec<u8>) -> Res<Vec<ArchiveEntry>> {
    let invalid = |reason: String| Error::InvalidExport {
        path: PathBuf::from(EXPORT_PATH),
        reason,
    };

    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    if archive.is_empty() {
        return Err(invalid("the archive is empty".to_string()));
    }

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let path = file
            .enclosed_name()
            .ok_or_else(|| invalid(format!("unsafe entry name '{}'", file.name())))?;

        let content = if file.is_dir() {
            None
        } else {
            let mut content = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut content)
                .map_err(|e| invalid(format!("corrupt entry '{}': {}", file.name(), e)))?;
            Some(content)
        };
        entries.push(ArchiveEntry { path, content });
    }
    Ok(entries)
}
