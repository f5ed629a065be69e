use pdf_extract::extract_text_from_mem;
use thiserror::Error;
use tracing::debug;

const PDF_MAGIC: &[u8] = b"%PDF-";
const UTF8_BOM: &str = "\u{feff}";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Document is empty")]
    Empty,

    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    PlainText,
}

/// Sniff the format of an upload from its magic bytes, falling back to the
/// declared content type and file extension.
pub fn detect_format(
    bytes: &[u8],
    file_name: Option<&str>,
    content_type: Option<&str>,
) -> Option<DocumentFormat> {
    if bytes.starts_with(PDF_MAGIC) {
        return Some(DocumentFormat::Pdf);
    }

    let declared_text = content_type.is_some_and(|ct| ct.starts_with("text/"))
        || file_name.is_some_and(|name| {
            let name = name.to_lowercase();
            name.ends_with(".txt") || name.ends_with(".md")
        });

    if declared_text || std::str::from_utf8(bytes).is_ok() {
        Some(DocumentFormat::PlainText)
    } else {
        None
    }
}

/// Decode an uploaded document into plain text
pub fn decode_document(
    bytes: &[u8],
    file_name: Option<&str>,
    content_type: Option<&str>,
) -> Result<String, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let format = detect_format(bytes, file_name, content_type)
        .ok_or_else(|| {
        DecodeError::UnsupportedFormat(file_name.unwrap_or("unnamed upload").to_string())
    })?;

    debug!(?format, size = bytes.len(), "Decoding document");

    match format {
        DocumentFormat::Pdf => {
            extract_text_from_mem(bytes).map_err(|e| DecodeError::InvalidPdf(e.to_string()))
        }
        DocumentFormat::PlainText => {
            let text = String::from_utf8_lossy(bytes);
            Ok(text.strip_prefix(UTF8_BOM).unwrap_or(&text).to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detects_pdf_by_magic() {
        assert_eq!(
            detect_format(b"%PDF-1.7\n...", Some("agreement.bin"), None),
            Some(DocumentFormat::Pdf)
        );
    }

    #[test]
    fn test_detects_plain_text() {
        assert_eq!(
            detect_format(b"Borrower: Acme plc", None, None),
            Some(DocumentFormat::PlainText)
        );
        assert_eq!(
            detect_format(&[0xff, 0xfe, 0x00], Some("notes.TXT"), None),
            Some(DocumentFormat::PlainText)
        );
    }

    #[test]
    fn test_rejects_binary_without_hints() {
        assert_eq!(
            detect_format(&[0x50, 0x4b, 0x03, 0x04, 0xff, 0xfe], Some("terms.docx"), None),
            None
        );
    }

    #[test]
    fn test_decodes_text_and_strips_bom() {
        let text = decode_document("\u{feff}Borrower: Acme plc".as_bytes(), None, None).unwrap();
        assert_eq!(text, "Borrower: Acme plc");
    }

    #[test]
    fn test_empty_upload_is_an_error() {
        assert!(matches!(
            decode_document(b"", Some("v1.pdf"), None),
            Err(DecodeError::Empty)
        ));
    }

    #[test]
    fn test_docx_is_unsupported() {
        let err = decode_document(
            &[0x50, 0x4b, 0x03, 0x04, 0xff, 0xfe],
            Some("terms.docx"),
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedFormat(ref n) if n == "terms.docx"));
        assert_eq!(err.to_string(), "Unsupported document format: terms.docx");
    }

    #[test]
    fn test_truncated_pdf_is_invalid() {
        let err = decode_document(b"%PDF-1.4\n%%EOF", Some("broken.pdf"), None).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidPdf(_)));
    }

    #[test]
    fn test_extracts_text_from_real_pdf() {
        let bytes = include_bytes!("../tests/fixtures/facility_v1.pdf");
        let text = decode_document(bytes, Some("facility_v1.pdf"), Some("application/pdf")).unwrap();
        assert!(text.contains("Borrower: GreenTech Energy Ltd."), "got: {text:?}");
        assert!(text.contains("Facility Amount: EUR 150,000,000"), "got: {text:?}");
        assert!(text.contains("Interest Margin: 2.50% per annum"), "got: {text:?}");
    }
}
