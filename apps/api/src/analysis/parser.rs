//! Resume file parsing: turns an uploaded PDF or DOCX into normalized plain text.

use std::io::{Cursor, Read};

use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::errors::AppError;

const DOCX_BODY_PART: &str = "word/document.xml";

/// Document formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Detects the format from the file extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Result<Self, AppError> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".pdf") {
            Ok(DocumentKind::Pdf)
        } else if lower.ends_with(".docx") {
            Ok(DocumentKind::Docx)
        } else {
            Err(AppError::Validation(
                "Unsupported file type. Please upload PDF or DOCX.".to_string(),
            ))
        }
    }
}

/// Validates the extension, extracts the text and normalizes whitespace.
/// Extraction is CPU-bound, so it runs on the blocking pool.
pub async fn parse_resume_file(filename: &str, content: Bytes) -> Result<String, AppError> {
    let kind = DocumentKind::from_filename(filename)?;
    debug!("Parsing {:?} upload '{}' ({} bytes)", kind, filename, content.len());

    let raw = extract_on_blocking_pool(move || extract_text(kind, &content)).await?;

    Ok(clean_text(&raw))
}

/// Runs an extractor on the blocking pool. A panicking extractor means the
/// document could not be read, not that the server failed.
async fn extract_on_blocking_pool<F>(extract: F) -> Result<String, AppError>
where
    F: FnOnce() -> Result<String, AppError> + Send + 'static,
{
    match tokio::task::spawn_blocking(extract).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => Err(AppError::UnprocessableEntity(
            "Could not extract text from the uploaded file.".to_string(),
        )),
        Err(e) => Err(AppError::Internal(anyhow::anyhow!(
            "Text extraction task failed: {e}"
        ))),
    }
}

fn extract_text(kind: DocumentKind, content: &[u8]) -> Result<String, AppError> {
    match kind {
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(content).map_err(|e| {
            AppError::UnprocessableEntity(format!("Could not read the PDF file: {e}"))
        }),
        DocumentKind::Docx => extract_docx_text(content),
    }
}

/// Reads the paragraphs of a DOCX body, one line per `<w:p>`.
fn extract_docx_text(content: &[u8]) -> Result<String, AppError> {
    fn unreadable(e: impl std::fmt::Display) -> AppError {
        AppError::UnprocessableEntity(format!("Could not read the DOCX file: {e}"))
    }

    let mut archive = zip::ZipArchive::new(Cursor::new(content)).map_err(unreadable)?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY_PART)
        .map_err(unreadable)?
        .read_to_string(&mut xml)
        .map_err(unreadable)?;

    Ok(document_xml_to_text(&xml))
}

// Self-closing `<w:t/>` runs are empty and must not open a capture.
static DOCX_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<w:t(?:\s[^>/]*)?>(.*?)</w:t>|</w:p>|<w:tab(?:\s[^>]*)?/>|<w:br(?:\s[^>]*)?/>")
        .unwrap()
});

fn document_xml_to_text(xml: &str) -> String {
    let mut text = String::with_capacity(xml.len() / 4);
    for caps in DOCX_TOKEN_RE.captures_iter(xml) {
        match caps.get(1) {
            Some(run) => text.push_str(&decode_xml_entities(run.as_str())),
            None if &caps[0] == "</w:p>" => text.push('\n'),
            None => text.push(' '),
        }
    }
    text
}

static XML_ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|lt|gt|quot|apos|amp);").unwrap());

fn decode_xml_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    XML_ENTITY_RE
        .replace_all(s, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                _ => match entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok().and_then(char::from_u32),
                    None => entity[1..].parse::<u32>().ok().and_then(char::from_u32),
                },
            };
            // Out-of-range references are left as written.
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

/// Collapses every whitespace run to a single space and trims the ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    /// Builds a minimal DOCX container with one paragraph per input line.
    pub(crate) fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!(r#"<w:p><w:r><w:t xml:space="preserve">{p}</w:t></w:r></w:p>"#))
            .collect();
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(DOCX_BODY_PART, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    /// Builds a one-page PDF with one line of Courier text per input line.
    pub(crate) fn build_pdf(lines: &[&str]) -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 10.into()]),
            Operation::new("Td", vec![50.into(), 750.into()]),
        ];
        for line in lines {
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("Td", vec![0.into(), (-14).into()]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[test]
    fn test_kind_detection_is_case_insensitive() {
        assert_eq!(DocumentKind::from_filename("CV.PDF").unwrap(), DocumentKind::Pdf);
        assert_eq!(
            DocumentKind::from_filename("resume.Docx").unwrap(),
            DocumentKind::Docx
        );
    }

    #[test]
    fn test_unsupported_extension_is_validation_error() {
        let err = DocumentKind::from_filename("resume.txt").unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("PDF or DOCX")));
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  Rust \n\n\t engineer  "), "Rust engineer");
    }

    #[test]
    fn test_document_xml_to_text_splits_paragraphs_and_decodes() {
        let xml = r#"<w:p><w:r><w:t>R&amp;D lead</w:t></w:r><w:r><w:tab/><w:t xml:space="preserve">2020</w:t></w:r></w:p><w:p><w:r><w:t>Skills</w:t></w:r></w:p>"#;
        assert_eq!(document_xml_to_text(xml), "R&D lead 2020\nSkills\n");
    }

    #[test]
    fn test_self_closing_run_does_not_leak_markup() {
        let xml = r#"<w:p><w:r><w:t xml:space="preserve"/></w:r><w:r><w:t>Rust</w:t></w:r></w:p>"#;
        assert_eq!(document_xml_to_text(xml), "Rust\n");
    }

    #[test]
    fn test_tabs_and_breaks_with_attributes_are_whitespace() {
        let xml = r#"<w:p><w:r><w:t>Go</w:t><w:br w:type="line"/><w:t>SQL</w:t><w:tab w:val="left"/><w:t>AWS</w:t></w:r></w:p>"#;
        assert_eq!(document_xml_to_text(xml), "Go SQL AWS\n");
    }

    #[test]
    fn test_numeric_character_references_are_decoded() {
        assert_eq!(
            decode_xml_entities("Jane&#8217;s team &#x2013; R&amp;D &amp;lt;"),
            "Jane\u{2019}s team \u{2013} R&D &lt;"
        );
        assert_eq!(decode_xml_entities("&#xFFFFFF;"), "&#xFFFFFF;");
    }

    #[tokio::test]
    async fn test_parse_pdf_upload() {
        let pdf = build_pdf(&["Jane Doe", "Experience:   built   Rust APIs"]);
        let text = parse_resume_file("cv.pdf", Bytes::from(pdf)).await.unwrap();
        assert!(text.contains("Jane Doe"), "got: {text}");
        assert!(text.contains("built Rust APIs"), "got: {text}");
        assert_eq!(text, clean_text(&text));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_unprocessable() {
        let err = parse_resume_file("cv.pdf", Bytes::from_static(b"%PDF-1.5 truncated"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[tokio::test]
    async fn test_panicking_extractor_is_unprocessable() {
        let err = extract_on_blocking_pool(|| -> Result<String, AppError> {
            panic!("malformed cross-reference table")
        })
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[tokio::test]
    async fn test_parse_docx_upload() {
        let docx = build_docx(&["Jane Doe", "Experience:   built   APIs"]);
        let text = parse_resume_file("jane.docx", Bytes::from(docx)).await.unwrap();
        assert_eq!(text, "Jane Doe Experience: built APIs");
    }

    #[tokio::test]
    async fn test_corrupt_docx_is_unprocessable() {
        let err = parse_resume_file("jane.docx", Bytes::from_static(b"not a zip"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }
}
