//! Minimal PDF 1.4 Writer
//!
//! Serializes a [`DocumentLayout`] using the two built-in Helvetica faces and
//! WinAnsi text encoding. Output depends only on the layout, so the same
//! input always produces the same bytes.

use std::fmt::Write as _;

use super::document::{DocumentLayout, FontFace, PAGE_HEIGHT, PAGE_WIDTH};

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const REGULAR_FONT_ID: usize = 3;
const BOLD_FONT_ID: usize = 4;
const INFO_ID: usize = 5;
const FIRST_PAGE_ID: usize = 6;

struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new(object_count: usize) -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: vec![0; object_count],
        }
    }

    fn object(&mut self, id: usize, body: &[u8]) {
        self.offsets[id - 1] = self.buf.len();
        self.buf.extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn stream(&mut self, id: usize, content: &[u8]) {
        let mut body = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(b"\nendstream");
        self.object(id, &body);
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_offset = self.buf.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", self.offsets.len() + 1);
        for offset in &self.offsets {
            let _ = writeln!(xref, "{:010} 00000 n ", offset);
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            self.offsets.len() + 1,
            CATALOG_ID,
            INFO_ID,
            xref_offset
        );
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}

/// Map a char to its WinAnsi byte, or `?` when it has none.
fn win_ansi(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '\u{20AC}' => 0x80,
        '\u{2026}' => 0x85,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        _ => b'?',
    }
}

/// Encode text as a PDF literal string, parentheses included.
pub(crate) fn literal(text: &str) -> Vec<u8> {
    let mut out = vec![b'('];
    for byte in text.chars().map(win_ansi) {
        match byte {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(byte);
            }
            0x80..=0xFF => out.extend_from_slice(format!("\\{:03o}", byte).as_bytes()),
            _ => out.push(byte),
        }
    }
    out.push(b')');
    out
}

fn page_content(lines: &[super::document::TextLine]) -> Vec<u8> {
    let mut content = Vec::new();
    for line in lines {
        content.extend_from_slice(
            format!(
                "BT\n/{} {} Tf\n1 0 0 1 {} {} Tm\n",
                line.font.resource(),
                line.size,
                line.x,
                line.y
            )
            .as_bytes(),
        );
        content.extend_from_slice(&literal(&line.text));
        content.extend_from_slice(b" Tj\nET\n");
    }
    content
}

fn font_object(base: &str) -> Vec<u8> {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        base
    )
    .into_bytes()
}

/// Serialize the layout to PDF bytes.
pub(crate) fn write_pdf(layout: &DocumentLayout) -> Vec<u8> {
    let page_count = layout.pages.len();
    let mut pdf = PdfWriter::new(FIRST_PAGE_ID - 1 + page_count * 2);

    pdf.object(
        CATALOG_ID,
        format!("<< /Type /Catalog /Pages {} 0 R >>", PAGES_ID).as_bytes(),
    );

    let kids = (0..page_count)
        .map(|i| format!("{} 0 R", FIRST_PAGE_ID + i * 2))
        .collect::<Vec<_>>()
        .join(" ");
    pdf.object(
        PAGES_ID,
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids, page_count
        )
        .as_bytes(),
    );

    pdf.object(REGULAR_FONT_ID, &font_object("Helvetica"));
    pdf.object(BOLD_FONT_ID, &font_object("Helvetica-Bold"));

    let mut info = b"<< /Title ".to_vec();
    info.extend_from_slice(&literal(&layout.title));
    info.extend_from_slice(b" /Producer (DeepTrust) /CreationDate ");
    info.extend_from_slice(&literal(&layout.created_at.format("D:%Y%m%d%H%M%SZ").to_string()));
    info.extend_from_slice(b" >>");
    pdf.object(INFO_ID, &info);

    for (index, page) in layout.pages.iter().enumerate() {
        let page_id = FIRST_PAGE_ID + index * 2;
        let content_id = page_id + 1;
        pdf.object(
            page_id,
            format!(
                "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /{} {} 0 R /{} {} 0 R >> >> /Contents {} 0 R >>",
                PAGES_ID,
                PAGE_WIDTH,
                PAGE_HEIGHT,
                FontFace::Regular.resource(),
                REGULAR_FONT_ID,
                FontFace::Bold.resource(),
                BOLD_FONT_ID,
                content_id
            )
            .as_bytes(),
        );
        pdf.stream(content_id, &page_content(&page.lines));
    }

    pdf.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::report::document::{Page, TextLine};
    use chrono::{TimeZone, Utc};

    fn layout(pages: usize) -> DocumentLayout {
        DocumentLayout {
            title: "Report".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
            pages: (0..pages)
                .map(|i| Page {
                    lines: vec![TextLine {
                        x: 50,
                        y: 700,
                        font: FontFace::Regular,
                        size: 10,
                        text: format!("page {}", i),
                    }],
                })
                .collect(),
        }
    }

    #[test]
    fn test_literal_escapes() {
        assert_eq!(literal("a(b)c\\"), b"(a\\(b\\)c\\\\)".to_vec());
        assert_eq!(literal("caf\u{e9}"), b"(caf\\351)".to_vec());
        assert_eq!(literal("\u{4e2d}"), b"(?)".to_vec());
    }

    #[test]
    fn test_structure() {
        let bytes = write_pdf(&layout(2));
        let text = String::from_utf8_lossy(&bytes);

        assert!(bytes.starts_with(b"%PDF-1.4\n"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        assert!(text.contains("/Count 2"));
        assert!(text.contains("/Kids [6 0 R 8 0 R]"));
        assert!(text.contains("/CreationDate (D:20260201000000Z)"));
    }

    fn rfind(hay: &[u8], needle: &[u8]) -> Option<usize> {
        hay.windows(needle.len()).rposition(|w| w == needle)
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let bytes = write_pdf(&layout(3));

        let startxref = rfind(&bytes, b"startxref\n").unwrap();
        let tail = std::str::from_utf8(&bytes[startxref + 10..]).unwrap();
        let xref_offset: usize = tail.lines().next().unwrap().parse().unwrap();
        assert!(bytes[xref_offset..].starts_with(b"xref\n"));

        let xref = std::str::from_utf8(&bytes[xref_offset..]).unwrap();
        let entries: Vec<&str> = xref.lines().skip(3).take(11).collect();
        assert_eq!(entries.len(), 11);
        for (index, entry) in entries.iter().enumerate() {
            let offset: usize = entry[..10].parse().unwrap();
            let expected = format!("{} 0 obj", index + 1);
            assert!(bytes[offset..].starts_with(expected.as_bytes()), "object {}", index + 1);
        }
    }

    #[test]
    fn test_output_is_deterministic() {
        assert_eq!(write_pdf(&layout(2)), write_pdf(&layout(2)));
    }
}
