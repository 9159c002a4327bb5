//! JSON Snapshot
//!
//! Canonical, human-readable serialization of one analysis. Key order follows
//! struct field order, so rendering an unchanged result is byte-stable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use deeptrust_core::{AnalysisResult, MediaType};

use super::{RenderResult, ReportMetadata};

/// Snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Owned form of a parsed snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSnapshot {
    pub version: u32,
    pub filename: String,
    pub media_type: MediaType,
    pub created_at: DateTime<Utc>,
    pub result: AnalysisResult,
}

/// Borrowed view used for rendering; same field names and order.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotView<'a> {
    version: u32,
    filename: &'a str,
    media_type: MediaType,
    created_at: DateTime<Utc>,
    result: &'a AnalysisResult,
}

/// Render a pretty-printed (two-space indented) JSON snapshot.
pub fn render_snapshot(result: &AnalysisResult, meta: &ReportMetadata) -> RenderResult<Vec<u8>> {
    let view = SnapshotView {
        version: SNAPSHOT_VERSION,
        filename: &meta.filename,
        media_type: meta.media_type,
        created_at: meta.created_at,
        result,
    };
    let mut bytes = serde_json::to_vec_pretty(&view)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Parse a snapshot. The embedded result is re-validated, so a snapshot whose
/// risk level disagrees with its score is rejected.
pub fn parse_snapshot(bytes: &[u8]) -> RenderResult<AnalysisSnapshot> {
    Ok(serde_json::from_slice(bytes)?)
}
