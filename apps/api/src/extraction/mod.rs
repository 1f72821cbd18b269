//! Text Extractor — turns an uploaded resume (PDF or DOCX) into plain text.
//!
//! Payloads arrive base64-encoded. Parsing runs on the blocking pool: both
//! parsers are CPU-bound and a panic inside one must not take down the worker.

use std::io::{Cursor, Read};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::info;

use crate::errors::PipelineError;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const LEGACY_DOC_MIME: &str = "application/msword";

/// Upper bound on a decoded resume payload.
pub const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;

const DOCX_BODY_PART: &str = "word/document.xml";

/// Upper bound on the inflated `word/document.xml`.
const MAX_DOCUMENT_XML_BYTES: u64 = 32 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    Pdf,
    Docx,
}

impl ResumeFormat {
    /// Maps a declared MIME type to a supported format.
    /// Parameters such as `; charset=binary` are ignored.
    pub fn from_mime(mime: &str) -> Result<Self, PipelineError> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            PDF_MIME => Ok(ResumeFormat::Pdf),
            DOCX_MIME => Ok(ResumeFormat::Docx),
            LEGACY_DOC_MIME => Err(PipelineError::UnsupportedFormat(
                "legacy .doc files are not supported; upload PDF or DOCX".to_string(),
            )),
            _ => Err(PipelineError::UnsupportedFormat(mime.to_string())),
        }
    }
}

/// Decodes a base64 transport payload. Accepts an optional `data:...;base64,`
/// prefix and ignores embedded whitespace.
pub fn decode_payload(encoded: &str) -> Result<Vec<u8>, PipelineError> {
    let body = match encoded.trim().split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded.trim(),
    };
    let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| PipelineError::ExtractionFailed(format!("invalid base64 payload: {e}")))
}

/// Decodes and extracts a resume. Format is checked before the payload is touched.
pub async fn extract_resume_text(encoded: &str, mime: &str) -> Result<String, PipelineError> {
    let format = ResumeFormat::from_mime(mime)?;
    let bytes = decode_payload(encoded)?;
    if bytes.len() > MAX_RESUME_BYTES {
        return Err(PipelineError::ExtractionFailed(format!(
            "resume is {} bytes; the limit is {MAX_RESUME_BYTES}",
            bytes.len()
        )));
    }

    let text = tokio::task::spawn_blocking(move || extract_text(&bytes, format))
        .await
        .map_err(|e| PipelineError::ExtractionFailed(format!("parser aborted: {e}")))??;

    info!("Extracted {} chars from {:?} resume", text.chars().count(), format);
    Ok(text)
}

/// Extracts trimmed plain text from raw document bytes.
pub fn extract_text(bytes: &[u8], format: ResumeFormat) -> Result<String, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::ExtractionFailed(
            "resume payload is empty".to_string(),
        ));
    }

    let raw = match format {
        ResumeFormat::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| PipelineError::ExtractionFailed(format!("PDF: {e}")))?,
        ResumeFormat::Docx => extract_docx_text(bytes)?,
    };

    let text = raw.trim();
    if text.is_empty() {
        return Err(PipelineError::ExtractionFailed(format!(
            "no text found in {format:?} resume"
        )));
    }
    Ok(text.to_string())
}

fn extract_docx_text(bytes: &[u8]) -> Result<String, PipelineError> {
    read_docx_text(bytes, MAX_DOCUMENT_XML_BYTES)
}

fn read_docx_text(bytes: &[u8], max_xml_bytes: u64) -> Result<String, PipelineError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| PipelineError::ExtractionFailed(format!("DOCX container: {e}")))?;
    let part = archive
        .by_name(DOCX_BODY_PART)
        .map_err(|e| PipelineError::ExtractionFailed(format!("DOCX {DOCX_BODY_PART}: {e}")))?;

    let too_large = || {
        PipelineError::ExtractionFailed(format!(
            "DOCX {DOCX_BODY_PART} inflates beyond {max_xml_bytes} bytes"
        ))
    };
    if part.size() > max_xml_bytes {
        return Err(too_large());
    }

    // The header size is untrusted: cap the actual inflated read as well.
    let mut xml = Vec::new();
    part.take(max_xml_bytes + 1)
        .read_to_end(&mut xml)
        .map_err(|e| PipelineError::ExtractionFailed(format!("DOCX read: {e}")))?;
    if xml.len() as u64 > max_xml_bytes {
        return Err(too_large());
    }

    document_xml_to_text(&xml)
}

/// Walks WordprocessingML and keeps run text, tabs, and line/paragraph breaks.
fn document_xml_to_text(xml: &[u8]) -> Result<String, PipelineError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut out = String::new();
    let mut in_text = false;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| PipelineError::ExtractionFailed(format!("DOCX XML: {e}")))?;
        match event {
            Event::Start(e) if e.local_name().as_ref() == b"t" => in_text = true,
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => out.push('\t'),
                b"br" | b"cr" => out.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => out.push_str(&String::from_utf8_lossy(&t)),
            Event::GeneralRef(r) if in_text => {
                if let Some(resolved) = resolve_entity(&r) {
                    out.push_str(&resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}

fn resolve_entity(name: &[u8]) -> Option<String> {
    match name {
        b"amp" => Some("&".to_string()),
        b"lt" => Some("<".to_string()),
        b"gt" => Some(">".to_string()),
        b"quot" => Some("\"".to_string()),
        b"apos" => Some("'".to_string()),
        [b'#', b'x' | b'X', hex @ ..] => std::str::from_utf8(hex)
            .ok()
            .and_then(|h| u32::from_str_radix(h, 16).ok())
            .and_then(char::from_u32)
            .map(String::from),
        [b'#', dec @ ..] => std::str::from_utf8(dec)
            .ok()
            .and_then(|d| d.parse::<u32>().ok())
            .and_then(char::from_u32)
            .map(String::from),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>
    <w:p><w:r><w:t xml:space="preserve">Engineer at </w:t></w:r><w:r><w:t>Acme &amp; Co</w:t></w:r></w:p>
    <w:p><w:r><w:t>2019</w:t><w:tab/><w:t>Present</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    fn build_docx(document_xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(DOCX_BODY_PART, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_mime_mapping() {
        assert_eq!(ResumeFormat::from_mime(PDF_MIME).unwrap(), ResumeFormat::Pdf);
        assert_eq!(
            ResumeFormat::from_mime(&format!("{DOCX_MIME}; charset=binary")).unwrap(),
            ResumeFormat::Docx
        );
        assert!(matches!(
            ResumeFormat::from_mime("text/plain"),
            Err(PipelineError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            ResumeFormat::from_mime(LEGACY_DOC_MIME),
            Err(PipelineError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_decode_payload_plain_and_data_url() {
        assert_eq!(decode_payload("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(
            decode_payload("data:application/pdf;base64,aGVs\nbG8=").unwrap(),
            b"hello"
        );
    }

    #[test]
    fn test_decode_payload_invalid() {
        assert!(matches!(
            decode_payload("not base64!!"),
            Err(PipelineError::ExtractionFailed(_))
        ));
    }

    #[test]
    fn test_empty_payload_rejected_before_parsing() {
        for format in [ResumeFormat::Pdf, ResumeFormat::Docx] {
            let err = extract_text(&[], format).unwrap_err();
            assert!(matches!(err, PipelineError::ExtractionFailed(ref m) if m.contains("empty")));
        }
    }

    #[test]
    fn test_docx_text_extraction() {
        let docx = build_docx(DOCUMENT_XML);
        let text = extract_text(&docx, ResumeFormat::Docx).unwrap();
        assert_eq!(text, "Jane Doe\nEngineer at Acme & Co\n2019\tPresent");
    }

    #[test]
    fn test_docx_without_body_part_fails() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/styles.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<styles/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        assert!(matches!(
            extract_text(&bytes, ResumeFormat::Docx),
            Err(PipelineError::ExtractionFailed(_))
        ));
    }

    #[test]
    fn test_corrupt_payloads_fail_cleanly() {
        let garbage = b"definitely not a document";
        assert!(matches!(
            extract_text(garbage, ResumeFormat::Docx),
            Err(PipelineError::ExtractionFailed(_))
        ));
    }

    #[test]
    fn test_corrupt_pdf_fails_cleanly() {
        let err = extract_text(b"definitely not a document", ResumeFormat::Pdf).unwrap_err();
        assert!(matches!(err, PipelineError::ExtractionFailed(ref m) if m.starts_with("PDF")));
    }

    /// Single-page PDF with one line of Helvetica text and a correct xref table.
    fn build_pdf(line: &str) -> Vec<u8> {
        let content = format!("BT /F1 18 Tf 72 720 Td ({line}) Tj ET");
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
                .to_string(),
            format!(
                "<< /Length {} >>\nstream\n{content}\nendstream",
                content.len()
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ];

        let mut pdf = String::from("%PDF-1.4\n");
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.push_str(&format!("{} 0 obj\n{body}\nendobj\n", i + 1));
        }
        let xref_at = pdf.len();
        pdf.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
        for offset in offsets {
            pdf.push_str(&format!("{offset:010} 00000 n \n"));
        }
        pdf.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1
        ));
        pdf.into_bytes()
    }

    #[test]
    fn test_pdf_text_extraction() {
        let text = extract_text(&build_pdf("Staff Engineer at Acme"), ResumeFormat::Pdf).unwrap();
        assert!(text.contains("Staff Engineer at Acme"), "got {text:?}");
    }

    #[test]
    fn test_docx_body_over_inflate_limit_rejected() {
        let body = "<w:p><w:r><w:t>filler text</w:t></w:r></w:p>".repeat(200);
        let xml = format!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        let docx = build_docx(&xml);
        assert!(docx.len() < xml.len());

        let err = read_docx_text(&docx, 1024).unwrap_err();
        assert!(matches!(err, PipelineError::ExtractionFailed(ref m) if m.contains("inflates beyond")));

        let text = read_docx_text(&docx, xml.len() as u64).unwrap();
        assert!(text.starts_with("filler text"));
    }

    #[test]
    fn test_numeric_entities_resolved() {
        assert_eq!(resolve_entity(b"#233").as_deref(), Some("é"));
        assert_eq!(resolve_entity(b"#x41").as_deref(), Some("A"));
        assert_eq!(resolve_entity(b"nbsp"), None);
    }

    #[tokio::test]
    async fn test_extract_resume_text_round_trip_docx() {
        let encoded = STANDARD.encode(build_docx(DOCUMENT_XML));
        let text = extract_resume_text(&encoded, DOCX_MIME).await.unwrap();
        assert!(text.starts_with("Jane Doe"));
    }

    #[tokio::test]
    async fn test_extract_resume_text_rejects_unknown_mime_first() {
        let err = extract_resume_text("!!!", "image/png").await.unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_extract_resume_text_rejects_empty_decoded_payload() {
        let err = extract_resume_text("", PDF_MIME).await.unwrap_err();
        assert!(matches!(err, PipelineError::ExtractionFailed(_)));
    }
}
