//! CV upload validation. Only PDF and Word documents are ever sent to the
//! analysis endpoint; anything else is rejected before a request is built.

use std::path::Path;

use bytes::Bytes;

use crate::errors::UiError;

pub const UNSUPPORTED_TYPE_MESSAGE: &str = "Please upload a PDF or Word document.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Doc,
    Docx,
}

impl DocumentKind {
    pub fn mime(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Doc => "application/msword",
            DocumentKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        // Browsers may append parameters, e.g. "application/pdf; charset=binary".
        let essence = mime.split(';').next().unwrap_or_default().trim();
        [DocumentKind::Pdf, DocumentKind::Doc, DocumentKind::Docx]
            .into_iter()
            .find(|k| k.mime().eq_ignore_ascii_case(essence))
    }

    pub fn from_extension(file_name: &str) -> Option<Self> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "doc" => Some(DocumentKind::Doc),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }
}

/// A validated CV file ready to be sent as the `cv` multipart field.
#[derive(Debug, Clone)]
pub struct CvUpload {
    pub file_name: String,
    pub kind: DocumentKind,
    pub bytes: Bytes,
}

impl CvUpload {
    /// Validates the declared content type. The extension is only consulted
    /// when the client sent no type or the generic `application/octet-stream`.
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<&str>,
        bytes: Bytes,
    ) -> Result<Self, UiError> {
        let file_name = file_name.into();

        let kind = match content_type.map(str::trim).filter(|ct| !ct.is_empty()) {
            Some(ct) if !ct.eq_ignore_ascii_case("application/octet-stream") => {
                DocumentKind::from_mime(ct)
            }
            _ => DocumentKind::from_extension(&file_name),
        };

        let kind =
            kind.ok_or_else(|| UiError::Validation(UNSUPPORTED_TYPE_MESSAGE.to_string()))?;

        Ok(Self {
            file_name,
            kind,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_supported_mime_types() {
        for (mime, kind) in [
            ("application/pdf", DocumentKind::Pdf),
            ("application/msword", DocumentKind::Doc),
            (
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                DocumentKind::Docx,
            ),
        ] {
            let upload = CvUpload::new("cv", Some(mime), Bytes::from_static(b"x")).unwrap();
            assert_eq!(upload.kind, kind, "mime {mime}");
        }
    }

    #[test]
    fn test_mime_parameters_are_ignored() {
        assert_eq!(
            DocumentKind::from_mime("application/pdf; charset=binary"),
            Some(DocumentKind::Pdf)
        );
    }

    #[test]
    fn test_rejects_unsupported_type_with_user_message() {
        let err = CvUpload::new("cv.png", Some("image/png"), Bytes::new()).unwrap_err();
        match err {
            UiError::Validation(msg) => assert_eq!(msg, UNSUPPORTED_TYPE_MESSAGE),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_declared_type_wins_over_extension() {
        // A .pdf name does not rescue a declared text/plain upload.
        assert!(CvUpload::new("cv.pdf", Some("text/plain"), Bytes::new()).is_err());
    }

    #[test]
    fn test_extension_fallback_for_generic_or_missing_type() {
        let a = CvUpload::new("cv.DOCX", Some("application/octet-stream"), Bytes::new()).unwrap();
        assert_eq!(a.kind, DocumentKind::Docx);
        let b = CvUpload::new("cv.doc", None, Bytes::new()).unwrap();
        assert_eq!(b.kind, DocumentKind::Doc);
        assert!(CvUpload::new("cv.txt", None, Bytes::new()).is_err());
    }
}
