//! Plain text extraction from Word planning documents.
//!
//! A `.docx` file is a zip archive; the body lives in `word/document.xml`.
//! Body paragraphs and table cells are read as plain text blocks. Headers,
//! footers and images are never consulted.

use std::io::{Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Error, Result};

/// Archive member holding the document body.
const DOCUMENT_PART: &str = "word/document.xml";

/// Where a text block came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSource {
    /// A body paragraph.
    Paragraph,
    /// A table cell (all paragraphs of the cell joined by newlines).
    TableCell,
}

/// A single run of plain text from the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    /// Origin of the block.
    pub source: BlockSource,
    /// Plain text content.
    pub text: String,
}

impl TextBlock {
    /// Create a paragraph block.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self { source: BlockSource::Paragraph, text: text.into() }
    }

    /// Create a table cell block.
    pub fn cell(text: impl Into<String>) -> Self {
        Self { source: BlockSource::TableCell, text: text.into() }
    }
}

/// Ordered text blocks of one document: paragraphs first, then table cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    blocks: Vec<TextBlock>,
}

impl ExtractedText {
    /// Wrap an ordered list of blocks.
    pub const fn new(blocks: Vec<TextBlock>) -> Self {
        Self { blocks }
    }

    /// Treat every line of `text` as a body paragraph.
    pub fn from_plain_text(text: &str) -> Self {
        Self {
            blocks: text.lines().map(TextBlock::paragraph).collect(),
        }
    }

    /// All blocks in order.
    pub fn blocks(&self) -> &[TextBlock] {
        &self.blocks
    }

    /// Paragraph text only, in document order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .filter(|b| b.source == BlockSource::Paragraph)
            .map(|b| b.text.as_str())
    }

    /// Whole document as one newline-separated corpus.
    pub fn corpus(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// True when the document has no non-blank text at all.
    pub fn is_blank(&self) -> bool {
        self.blocks.iter().all(|b| b.text.trim().is_empty())
    }
}

/// Read all paragraph and table cell text from a `.docx` file.
pub fn extract_text(path: &Path) -> Result<ExtractedText> {
    let file = fs_err::File::open(path)
        .map_err(|e| Error::document(e.to_string(), path.to_path_buf()))?;
    let text = extract_from_reader(file, Some(path))?;
    tracing::debug!(
        "Extracted {} text blocks from {}",
        text.blocks().len(),
        path.display()
    );
    Ok(text)
}

/// Read a `.docx` archive from any seekable reader.
pub fn extract_from_reader<R: Read + Seek>(
    reader: R,
    path: Option<&Path>,
) -> Result<ExtractedText> {
    let path_buf = path.map(Path::to_path_buf);

    let mut archive = zip::ZipArchive::new(reader)
        .map_err(|e| Error::document(format!("Not a .docx archive: {e}"), path_buf.clone()))?;

    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| Error::document(format!("Missing {DOCUMENT_PART}: {e}"), path_buf.clone()))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml).map_err(|e| {
        Error::document(format!("Unreadable {DOCUMENT_PART}: {e}"), path_buf.clone())
    })?;

    parse_document_xml(&xml).map_err(|e| match e {
        Error::DocumentRead { message, .. } => Error::document(message, path_buf),
        other => other,
    })
}

/// Parse the WordprocessingML body into text blocks.
pub fn parse_document_xml(xml: &str) -> Result<ExtractedText> {
    let mut reader = Reader::from_str(xml);
    let mut walker = BodyWalker::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => walker.open(e.local_name().as_ref()),
            Ok(Event::Empty(e)) => walker.empty(e.local_name().as_ref()),
            Ok(Event::End(e)) => walker.close(e.local_name().as_ref()),
            Ok(Event::Text(t)) if walker.in_text => {
                let text = t.unescape().map_err(|e| {
                    Error::document(
                        format!("Bad text at {}: {e}", reader.buffer_position()),
                        None,
                    )
                })?;
                walker.push_text(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::document(
                    format!("Malformed XML at {}: {e}", reader.buffer_position()),
                    None,
                ));
            }
            Ok(_) => {}
        }
    }

    Ok(walker.finish())
}

/// Tracks nesting while walking the body.
#[derive(Default)]
struct BodyWalker {
    paragraphs: Vec<TextBlock>,
    cells: Vec<TextBlock>,
    /// Open paragraphs; text boxes can nest a paragraph inside another.
    open_paragraphs: Vec<String>,
    /// Paragraphs of the outermost open table cell.
    cell_lines: Vec<String>,
    table_depth: usize,
    run_depth: usize,
    in_text: bool,
}

impl BodyWalker {
    fn open(&mut self, name: &[u8]) {
        match name {
            b"p" => self.open_paragraphs.push(String::new()),
            b"tbl" => self.table_depth += 1,
            b"tc" if self.table_depth == 1 => self.cell_lines.clear(),
            b"r" => self.run_depth += 1,
            b"t" if self.run_depth > 0 => self.in_text = true,
            _ => {}
        }
    }

    fn empty(&mut self, name: &[u8]) {
        match name {
            b"p" => self.emit_paragraph(String::new()),
            b"tab" if self.run_depth > 0 => self.push_text("\t"),
            b"br" | b"cr" if self.run_depth > 0 => self.push_text("\n"),
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"p" => {
                if let Some(text) = self.open_paragraphs.pop() {
                    self.emit_paragraph(text);
                }
            }
            b"tbl" => self.table_depth = self.table_depth.saturating_sub(1),
            b"tc" if self.table_depth == 1 => {
                let text = std::mem::take(&mut self.cell_lines).join("\n");
                self.cells.push(TextBlock::cell(text));
            }
            b"r" => self.run_depth = self.run_depth.saturating_sub(1),
            b"t" => self.in_text = false,
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(current) = self.open_paragraphs.last_mut() {
            current.push_str(text);
        }
    }

    fn emit_paragraph(&mut self, text: String) {
        if self.table_depth > 0 {
            self.cell_lines.push(text);
        } else {
            self.paragraphs.push(TextBlock::paragraph(text));
        }
    }

    fn finish(mut self) -> ExtractedText {
        self.paragraphs.append(&mut self.cells);
        ExtractedText::new(self.paragraphs)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use std::io::Write;

    /// Wrap body XML in a minimal `w:document`.
    pub(crate) fn document_xml(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        )
    }

    /// Body XML for one paragraph with a single run.
    pub(crate) fn para(text: &str) -> String {
        format!(r#"<w:p><w:r><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#)
    }

    /// Write a `.docx` containing the given body XML.
    pub(crate) fn write_docx(path: &Path, body: &str) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(b"<?xml version=\"1.0\"?><Types/>").unwrap();
        zip.start_file(DOCUMENT_PART, options).unwrap();
        zip.write_all(document_xml(body).as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn paragraphs_and_runs_are_joined() {
        let xml = document_xml(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>Psalm</w:t></w:r><w:r><w:t xml:space="preserve"> 23</w:t></w:r></w:p><w:p/><w:p><w:r><w:t>Amen</w:t><w:br/><w:t>Ende</w:t></w:r></w:p>"#,
        );
        let text = parse_document_xml(&xml).unwrap();
        let paragraphs: Vec<_> = text.paragraphs().collect();
        assert_eq!(paragraphs, vec!["Psalm 23", "", "Amen\nEnde"]);
    }

    #[test]
    fn table_cells_follow_paragraphs() {
        let body = format!(
            "{}<w:tbl><w:tr><w:tc>{}{}</w:tc><w:tc>{}</w:tc></w:tr><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>{}",
            para("Intro"),
            para("Lied"),
            para("Cornerstone"),
            para("10:00"),
            para("Psalm 42"),
            para("Segen"),
        );
        let text = parse_document_xml(&document_xml(&body)).unwrap();
        assert_eq!(
            text.blocks(),
            &[
                TextBlock::paragraph("Intro"),
                TextBlock::paragraph("Segen"),
                TextBlock::cell("Lied\nCornerstone"),
                TextBlock::cell("10:00"),
                TextBlock::cell("Psalm 42"),
            ]
        );
        assert_eq!(text.paragraphs().count(), 2);
        assert!(text.corpus().contains("Cornerstone"));
    }

    #[test]
    fn entities_are_unescaped() {
        let text = parse_document_xml(&document_xml(&para("Lord &amp; Savior"))).unwrap();
        assert_eq!(text.paragraphs().next(), Some("Lord & Savior"));
    }

    #[test]
    fn malformed_xml_is_a_document_error() {
        let result = parse_document_xml("<w:document><w:body><w:p></w:body>");
        assert!(matches!(result, Err(Error::DocumentRead { .. })));
    }

    #[test]
    fn reads_docx_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.docx");
        write_docx(&path, &format!("{}{}", para("Lobpreis-Block"), para("- Cornerstone")));

        let text = extract_text(&path).unwrap();
        assert_eq!(text.corpus(), "Lobpreis-Block\n- Cornerstone");
    }

    #[test]
    fn missing_or_non_zip_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.docx");
        assert!(matches!(extract_text(&missing), Err(Error::DocumentRead { .. })));

        let bogus = dir.path().join("bogus.docx");
        std::fs::write(&bogus, b"plain text, not a zip").unwrap();
        match extract_text(&bogus) {
            Err(Error::DocumentRead { path, .. }) => {
                assert_eq!(path.as_deref(), Some(bogus.as_path()));
            }
            other => panic!("expected DocumentRead, got {other:?}"),
        }
    }

    #[test]
    fn plain_text_lines_become_paragraphs() {
        let text = ExtractedText::from_plain_text("a\n\nb");
        assert_eq!(text.paragraphs().collect::<Vec<_>>(), vec!["a", "", "b"]);
        assert!(!text.is_blank());
        assert!(ExtractedText::from_plain_text(" \n").is_blank());
    }
}
