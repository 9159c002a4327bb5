//! Media Types
//!
//! Media kinds accepted for analysis, the sensitivity knob forwarded to
//! providers, and the in-memory representation of a submitted file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "ogg"];

/// Kind of media submitted for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Audio,
}

impl MediaType {
    /// All media types, in dashboard order.
    pub const ALL: [MediaType; 3] = [MediaType::Image, MediaType::Video, MediaType::Audio];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
        }
    }

    /// File extensions accepted for this media type.
    ///
    /// Audio analysis also accepts video containers; the audio track is
    /// extracted by the provider.
    pub fn accepted_extensions(&self) -> Vec<&'static str> {
        match self {
            MediaType::Image => IMAGE_EXTENSIONS.to_vec(),
            MediaType::Video => VIDEO_EXTENSIONS.to_vec(),
            MediaType::Audio => AUDIO_EXTENSIONS
                .iter()
                .chain(VIDEO_EXTENSIONS.iter())
                .copied()
                .collect(),
        }
    }

    /// Whether a filename's extension is accepted for this media type.
    pub fn accepts(&self, filename: &str) -> bool {
        match extension_of(filename) {
            Some(ext) => self.accepted_extensions().contains(&ext.as_str()),
            None => false,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            "audio" => Ok(MediaType::Audio),
            other => Err(CoreError::parse(format!("unknown media type: {}", other))),
        }
    }
}

/// Detection sensitivity forwarded to the secondary provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    #[default]
    Medium,
    High,
}

impl Sensitivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sensitivity::Low => "low",
            Sensitivity::Medium => "medium",
            Sensitivity::High => "high",
        }
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sensitivity {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Sensitivity::Low),
            "medium" => Ok(Sensitivity::Medium),
            "high" => Ok(Sensitivity::High),
            other => Err(CoreError::parse(format!("unknown sensitivity: {}", other))),
        }
    }
}

/// A media file held in memory for the duration of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Original filename as supplied by the user
    pub filename: String,
    /// MIME type, inferred from the extension when not supplied
    pub mime_type: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl MediaFile {
    /// Create a media file, inferring the MIME type from the filename.
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let mime_type = mime_type_for(&filename).to_string();
        Self {
            filename,
            mime_type,
            bytes,
        }
    }

    /// Override the inferred MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Size in megabytes, as shown next to the preview.
    pub fn size_mb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0 / 1024.0
    }

    /// Whether the file is a video container (relevant for audio extraction).
    pub fn is_video_container(&self) -> bool {
        self.mime_type.starts_with("video/")
    }

    /// Check the file can be submitted for the given media type.
    pub fn validate_for(&self, media_type: MediaType) -> CoreResult<()> {
        if self.filename.trim().is_empty() {
            return Err(CoreError::validation("filename is empty"));
        }
        if self.is_empty() {
            return Err(CoreError::validation(format!(
                "file '{}' is empty",
                self.filename
            )));
        }
        if !media_type.accepts(&self.filename) {
            return Err(CoreError::validation(format!(
                "file '{}' is not a supported {} format (accepted: {})",
                self.filename,
                media_type,
                media_type.accepted_extensions().join(", ")
            )));
        }
        Ok(())
    }
}

fn extension_of(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

/// Infer a MIME type from a filename extension.
pub fn mime_type_for(filename: &str) -> &'static str {
    match extension_of(filename).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        Some("ogg") => "audio/ogg",
        _ => "application/octet-stream",
    }
}
