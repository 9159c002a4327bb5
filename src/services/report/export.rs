//! Export Artifacts
//!
//! Named byte blobs handed to an export sink. The core only produces bytes
//! and suggested filenames; delivery belongs to the sink.

use std::fs;
use std::path::{Path, PathBuf};

use deeptrust_core::MediaType;

use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::ensure_dir;

/// Product prefix used in export filenames.
pub const PRODUCT_SLUG: &str = "deeptrust";

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// `deeptrust_report_<mediaType>_<epochMillis>.pdf`
pub fn document_filename(media_type: MediaType, epoch_millis: i64) -> String {
    format!("{}_report_{}_{}.pdf", PRODUCT_SLUG, media_type, epoch_millis)
}

/// `deeptrust_analysis_<mediaType>_<epochMillis>.json`
pub fn snapshot_filename(media_type: MediaType, epoch_millis: i64) -> String {
    format!("{}_analysis_{}_{}.json", PRODUCT_SLUG, media_type, epoch_millis)
}

/// A rendered artifact ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn pdf(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: PDF_CONTENT_TYPE,
            bytes,
        }
    }

    pub fn json(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: JSON_CONTENT_TYPE,
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Makes an artifact available to the user.
pub trait ExportSink: Send + Sync {
    /// Deliver the artifact, returning where it ended up.
    fn deliver(&self, artifact: &ExportArtifact) -> AppResult<PathBuf>;
}

/// Writes artifacts into a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for DirectorySink {
    fn deliver(&self, artifact: &ExportArtifact) -> AppResult<PathBuf> {
        // Filenames come from the builders above; refuse anything that could escape the directory.
        let name = Path::new(&artifact.filename);
        if name.components().count() != 1 || name.file_name().is_none() {
            return Err(AppError::validation(format!(
                "invalid export filename: {}",
                artifact.filename
            )));
        }

        ensure_dir(&self.dir)?;
        let path = self.dir.join(name);
        fs::write(&path, &artifact.bytes)?;
        tracing::info!(path = %path.display(), bytes = artifact.len(), "export written");
        Ok(path)
    }
}
