//! Structured PDF generation. Lays the payload out as wrapped, paginated text and
//! writes a minimal PDF with `lopdf`.
//!
//! Layout follows a simple cursor model: the first baseline sits at the top margin,
//! each line advances the cursor by the line height, and a new page starts whenever
//! the next line would cross `page height - margin`.

use async_trait::async_trait;
use bytes::Bytes;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::debug;

use crate::export::metrics::{get_metrics, PageLayout};
use crate::export::wrap::split_text_to_size;
use crate::export::{DocumentRenderer, ExportArtifact, ExportRequest, RenderError};

/// A line placed on a page. `cursor_y` is measured from the top edge.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub cursor_y: f32,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct StructuredRenderer {
    layout: PageLayout,
}

impl StructuredRenderer {
    pub fn new(layout: PageLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Wraps and paginates `text`. Always returns at least one page.
    pub fn paginate(&self, text: &str) -> Vec<Vec<PlacedLine>> {
        let layout = &self.layout;
        let metrics = get_metrics(layout.font);
        let lines = split_text_to_size(
            text,
            metrics,
            layout.font_size_pt,
            layout.text_width_pt(),
        );

        let bottom = layout.height_pt - layout.margin_pt;
        let mut pages = vec![Vec::new()];
        let mut cursor_y = layout.margin_pt;

        for line in lines {
            if cursor_y + layout.line_height_pt > bottom {
                pages.push(Vec::new());
                cursor_y = layout.margin_pt;
            }
            if let Some(page) = pages.last_mut() {
                page.push(PlacedLine {
                    cursor_y,
                    text: line,
                });
            }
            cursor_y += layout.line_height_pt;
        }

        pages
    }

    /// Renders `text` to PDF bytes.
    pub fn render_pdf(&self, text: &str) -> Result<Vec<u8>, RenderError> {
        let layout = &self.layout;
        let pages = self.paginate(text);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => layout.font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for page in &pages {
            let mut operations = vec![
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec!["F1".into(), Object::Real(layout.font_size_pt as _)],
                ),
            ];
            for line in page {
                // PDF space has its origin at the bottom-left corner.
                let baseline = layout.height_pt - line.cursor_y;
                operations.push(Operation::new(
                    "Tm",
                    vec![
                        Object::Integer(1),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(1),
                        Object::Real(layout.margin_pt as _),
                        Object::Real(baseline as _),
                    ],
                ));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(encode_win_ansi(&line.text))],
                ));
            }
            operations.push(Operation::new("ET", vec![]));

            let content = Content { operations }
                .encode()
                .map_err(|e| RenderError::Failed(format!("content stream encoding failed: {e}")))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(layout.width_pt as _),
                    Object::Real(layout.height_pt as _),
                ],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| RenderError::Failed(format!("PDF serialization failed: {e}")))?;

        debug!(
            "Structured PDF rendered: {} page(s), {} bytes",
            page_count,
            buffer.len()
        );
        Ok(buffer)
    }
}

#[async_trait]
impl DocumentRenderer for StructuredRenderer {
    fn name(&self) -> &'static str {
        "structured"
    }

    async fn render(&self, request: &ExportRequest) -> Result<ExportArtifact, RenderError> {
        let renderer = self.clone();
        let text = request.text.clone();
        // CPU-bound layout runs off the async executor.
        let pdf = tokio::task::spawn_blocking(move || renderer.render_pdf(&text))
            .await
            .map_err(|e| RenderError::Failed(format!("render task failed: {e}")))??;
        Ok(ExportArtifact::Pdf(Bytes::from(pdf)))
    }
}

/// Maps text onto single-byte codes for the standard fonts. Characters outside
/// Latin-1 (and C1 controls) become `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            code @ 0x20..=0x7E => code as u8,
            code @ 0xA0..=0xFF => code as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_text(doc: &Document, page_id: lopdf::ObjectId) -> Vec<String> {
        let content = doc.get_page_content(page_id).unwrap();
        Content::decode(&content)
            .unwrap()
            .operations
            .into_iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_single_page_pdf_contains_lines() {
        let renderer = StructuredRenderer::default();
        let pdf = renderer
            .render_pdf("Modified Resume for Senior Frontend Developer\n\nEXPERIENCE:")
            .unwrap();
        assert!(pdf.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&pdf).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);

        let page_id = *pages.get(&1).unwrap();
        let lines = page_text(&doc, page_id);
        assert_eq!(
            lines,
            vec![
                "Modified Resume for Senior Frontend Developer".to_string(),
                String::new(),
                "EXPERIENCE:".to_string(),
            ]
        );
    }

    #[test]
    fn test_paginates_when_cursor_passes_bottom_margin() {
        let renderer = StructuredRenderer::default();
        // A4 height 841.89 - 40 margin = 801.89 bottom; lines start at 40 with 12pt pitch.
        // Lines fit while cursor_y + 12 <= 801.89, i.e. cursor_y in 40, 52, ..., 784 → 63 lines.
        let text = (0..100).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let pages = renderer.paginate(&text);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].len(), 63);
        assert_eq!(pages[1].len(), 37);
        assert_eq!(pages[1][0].cursor_y, 40.0);
        assert_eq!(pages[1][0].text, "line 63");

        let pdf = renderer.render_pdf(&text).unwrap();
        let doc = Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_long_lines_wrap_to_page_width() {
        let renderer = StructuredRenderer::default();
        // Courier 12pt → 7.2pt per char; 515.28pt fits 71 characters.
        let text = "x".repeat(150);
        let pages = renderer.paginate(&text);
        let widths: Vec<usize> = pages[0].iter().map(|l| l.text.len()).collect();
        assert_eq!(widths, vec![71, 71, 8]);
    }

    #[test]
    fn test_encode_win_ansi_replaces_unmappable() {
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_win_ansi("→ ok"), b"? ok".to_vec());
    }

    #[tokio::test]
    async fn test_renderer_trait_returns_pdf_artifact() {
        let renderer = StructuredRenderer::default();
        let request = ExportRequest::new("Hello", Some("Engineer"));
        match renderer.render(&request).await.unwrap() {
            ExportArtifact::Pdf(bytes) => assert!(bytes.starts_with(b"%PDF")),
            other => panic!("expected PDF, got {other:?}"),
        }
    }
}
