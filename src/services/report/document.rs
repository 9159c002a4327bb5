//! Document Layout
//!
//! Turns a result into positioned text lines on A4 pages: title block,
//! metadata block, score block, then one block per signal. Signals that do
//! not fit flow onto further pages. The layout is deterministic; the PDF
//! writer only serializes it.

use chrono::{DateTime, Utc};

use deeptrust_core::{AnalysisResult, ResultTier, Signal};

use super::pdf::write_pdf;
use super::{RenderError, RenderResult, ReportMetadata};

/// A4 in points.
pub const PAGE_WIDTH: u16 = 595;
pub const PAGE_HEIGHT: u16 = 842;

const MARGIN_LEFT: u16 = 50;
const SIGNAL_INDENT: u16 = 65;
const TOP_Y: u16 = 792;
const BOTTOM_Y: u16 = 60;
const FOOTER_Y: u16 = 30;

/// Characters per wrapped description line at 10pt Helvetica.
const WRAP_COLUMNS: usize = 88;

/// Hard stop for pathological inputs.
const MAX_PAGES: usize = 500;

pub const DOCUMENT_TITLE: &str = "DeepTrust Analysis Report";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Regular,
    Bold,
}

impl FontFace {
    /// Resource name inside the PDF page dictionary
    pub fn resource(&self) -> &'static str {
        match self {
            FontFace::Regular => "F1",
            FontFace::Bold => "F2",
        }
    }
}

/// One positioned line of text; `y` is measured from the page bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub x: u16,
    pub y: u16,
    pub font: FontFace,
    pub size: u8,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<TextLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub pages: Vec<Page>,
}

impl DocumentLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All text in reading order
    pub fn text(&self) -> impl Iterator<Item = &str> {
        self.pages
            .iter()
            .flat_map(|p| p.lines.iter().map(|l| l.text.as_str()))
    }
}

struct PageBuilder {
    pages: Vec<Page>,
    current: Page,
    y: u16,
}

impl PageBuilder {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Page::default(),
            y: TOP_Y,
        }
    }

    fn line(&mut self, x: u16, font: FontFace, size: u8, text: impl Into<String>) -> RenderResult<()> {
        let leading = u16::from(size) + 4;
        if self.y < BOTTOM_Y + leading {
            self.break_page()?;
        }
        self.y -= leading;
        self.current.lines.push(TextLine {
            x,
            y: self.y,
            font,
            size,
            text: text.into(),
        });
        Ok(())
    }

    fn space(&mut self, points: u16) {
        self.y = self.y.saturating_sub(points).max(BOTTOM_Y);
    }

    /// Keep a block's first lines together with its heading.
    fn reserve(&mut self, points: u16) -> RenderResult<()> {
        if self.y < BOTTOM_Y + points {
            self.break_page()?;
        }
        Ok(())
    }

    fn break_page(&mut self) -> RenderResult<()> {
        if self.pages.len() + 1 >= MAX_PAGES {
            return Err(RenderError::Layout(format!(
                "document exceeds {} pages",
                MAX_PAGES
            )));
        }
        self.pages.push(std::mem::take(&mut self.current));
        self.y = TOP_Y;
        Ok(())
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.lines.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        let total = self.pages.len();
        for (index, page) in self.pages.iter_mut().enumerate() {
            page.lines.push(TextLine {
                x: MARGIN_LEFT,
                y: FOOTER_Y,
                font: FontFace::Regular,
                size: 9,
                text: format!("Page {} of {}", index + 1, total),
            });
        }
        self.pages
    }
}

fn tier_label(tier: ResultTier) -> &'static str {
    match tier {
        ResultTier::Primary => "primary provider",
        ResultTier::Secondary => "secondary provider",
        ResultTier::Fallback => "synthetic fallback (not a real analysis)",
    }
}

fn check_signal(index: usize, signal: &Signal) -> RenderResult<()> {
    if signal.kind.trim().is_empty() {
        return Err(RenderError::MalformedSignal {
            index,
            reason: "empty signal type".to_string(),
        });
    }
    if !signal.confidence.is_finite() || !(0.0..=1.0).contains(&signal.confidence) {
        return Err(RenderError::MalformedSignal {
            index,
            reason: format!("confidence {} outside [0, 1]", signal.confidence),
        });
    }
    Ok(())
}

/// Replace control characters so every line is a single visual line.
fn clean(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Greedy word wrap; words longer than `width` are split.
pub(crate) fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            lines.push(chars.drain(..width).collect());
        }
        if chars.is_empty() {
            continue;
        }
        let needed = if current_len == 0 { chars.len() } else { current_len + 1 + chars.len() };
        if needed > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(chars.iter());
        current_len += chars.len();
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Lay out the report pages.
pub fn layout_document(result: &AnalysisResult, meta: &ReportMetadata) -> RenderResult<DocumentLayout> {
    let mut page = PageBuilder::new();

    // Title block
    page.line(MARGIN_LEFT, FontFace::Bold, 20, DOCUMENT_TITLE)?;
    page.space(10);

    // Metadata block
    page.line(
        MARGIN_LEFT,
        FontFace::Regular,
        10,
        format!("Date: {}", meta.created_at.format("%Y-%m-%d %H:%M:%S UTC")),
    )?;
    for line in wrap_text(&format!("File: {}", clean(&meta.filename)), WRAP_COLUMNS) {
        page.line(MARGIN_LEFT, FontFace::Regular, 10, line)?;
    }
    page.line(MARGIN_LEFT, FontFace::Regular, 10, format!("Type: {}", meta.media_type))?;
    page.line(
        MARGIN_LEFT,
        FontFace::Regular,
        10,
        format!("Source: {}", tier_label(result.tier())),
    )?;
    page.space(14);

    // Score block
    page.line(MARGIN_LEFT, FontFace::Bold, 16, format!("Score: {}/100", result.score()))?;
    page.line(
        MARGIN_LEFT,
        FontFace::Regular,
        12,
        format!("Risk Level: {}", result.risk_level().as_str().to_uppercase()),
    )?;
    page.space(14);

    // Signal blocks
    page.line(
        MARGIN_LEFT,
        FontFace::Bold,
        14,
        format!("Detected Signals ({})", result.signals().len()),
    )?;
    page.space(4);

    for (index, signal) in result.signals().iter().enumerate() {
        check_signal(index, signal)?;
        page.reserve(30)?;

        let marker = if signal.is_strong() { " [strong]" } else { "" };
        page.line(
            MARGIN_LEFT,
            FontFace::Bold,
            11,
            format!(
                "- {} ({}%){}",
                clean(&signal.kind),
                signal.confidence_percent(),
                marker
            ),
        )?;
        for line in wrap_text(&clean(&signal.description), WRAP_COLUMNS) {
            page.line(SIGNAL_INDENT, FontFace::Regular, 10, line)?;
        }
        page.space(6);
    }

    Ok(DocumentLayout {
        title: DOCUMENT_TITLE.to_string(),
        created_at: meta.created_at,
        pages: page.finish(),
    })
}

/// Render the paginated PDF document.
pub fn render_document(result: &AnalysisResult, meta: &ReportMetadata) -> RenderResult<Vec<u8>> {
    let layout = layout_document(result, meta)?;
    Ok(write_pdf(&layout))
}
