use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::Id;

/// The kind of content an attachment points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    /// An image file.
    Image,
    /// A PDF document.
    Pdf,
    /// An external web link.
    Link,
}

/// A file or link attached to a note, discussion or reply.
///
/// Attachments are staged by the caller and fixed once the post is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Unique within the owning post.
    pub id: Id,
    /// What the attachment points at.
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    /// Where the content can be found.
    pub url: String,
    /// Display name.
    pub name: String,
    /// Size in bytes, for files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl Attachment {
    /// Stages a link attachment.
    ///
    /// The attachment is named after the last non-empty path segment of the
    /// URL, or the whole URL if it has none.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError::InvalidUrl`] if the input is not an
    /// absolute URL.
    pub fn link(url: &str) -> Result<Self, AttachmentError> {
        let parsed = Url::parse(url).map_err(|source| AttachmentError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let name = parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map_or_else(|| url.to_string(), ToString::to_string);

        Ok(Self {
            id: Id::generate(),
            kind: AttachmentKind::Link,
            url: url.to_string(),
            name,
            size: None,
        })
    }

    /// Stages a local file as an attachment.
    ///
    /// The file is classified by its MIME type: images and PDFs are accepted,
    /// anything else is rejected. The attachment URL is the file's `file://`
    /// URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the file type is unsupported, or if the file
    /// cannot be inspected.
    pub fn from_file(path: &Path) -> Result<Self, AttachmentError> {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        let kind = classify(&mime)?;

        let path = fs::canonicalize(path).map_err(|source| AttachmentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let metadata = fs::metadata(&path).map_err(|source| AttachmentError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let url = Url::from_file_path(&path)
            .map_err(|()| AttachmentError::NotAbsolute(path.display().to_string()))?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

        Ok(Self {
            id: Id::generate(),
            kind,
            url: url.to_string(),
            name,
            size: Some(metadata.len()),
        })
    }
}

fn classify(mime: &mime_guess::Mime) -> Result<AttachmentKind, AttachmentError> {
    if mime.type_() == mime_guess::mime::IMAGE {
        Ok(AttachmentKind::Image)
    } else if *mime == mime_guess::mime::APPLICATION_PDF {
        Ok(AttachmentKind::Pdf)
    } else {
        Err(AttachmentError::Unsupported(mime.to_string()))
    }
}

/// Errors raised while staging an attachment.
#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    /// The link is not a valid absolute URL.
    #[error("'{url}' is not a valid URL: {source}")]
    InvalidUrl {
        /// The rejected input.
        url: String,
        /// Why parsing failed.
        source: url::ParseError,
    },
    /// Only images and PDFs can be attached as files.
    #[error("file type not supported: {0}")]
    Unsupported(String),
    /// The file could not be inspected.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that was being attached.
        path: String,
        /// The underlying I/O error.
        source: io::Error,
    },
    /// The file path could not be expressed as a `file://` URL.
    #[error("cannot build a file URL for {0}")]
    NotAbsolute(String),
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use test_case::test_case;

    use super::*;

    #[test_case("https://example.com/docs/guide.pdf", "guide.pdf"; "file name segment")]
    #[test_case("https://example.com/docs/", "docs"; "trailing slash")]
    #[test_case("https://example.com", "https://example.com"; "no path")]
    fn link_is_named_after_last_segment(url: &str, expected: &str) {
        let attachment = Attachment::link(url).unwrap();
        assert_eq!(attachment.kind, AttachmentKind::Link);
        assert_eq!(attachment.name, expected);
        assert_eq!(attachment.url, url);
        assert_eq!(attachment.size, None);
    }

    #[test]
    fn relative_link_is_rejected() {
        let error = Attachment::link("not a url").unwrap_err();
        assert!(matches!(error, AttachmentError::InvalidUrl { .. }));
    }

    #[test_case("photo.png", Some(AttachmentKind::Image); "png")]
    #[test_case("photo.JPG", Some(AttachmentKind::Image); "uppercase jpg")]
    #[test_case("paper.pdf", Some(AttachmentKind::Pdf); "pdf")]
    #[test_case("notes.txt", None; "text is unsupported")]
    #[test_case("archive", None; "no extension")]
    fn files_are_classified_by_mime_type(name: &str, expected: Option<AttachmentKind>) {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"0123456789").unwrap();

        match (Attachment::from_file(&path), expected) {
            (Ok(attachment), Some(kind)) => {
                assert_eq!(attachment.kind, kind);
                assert_eq!(attachment.name, name);
                assert_eq!(attachment.size, Some(10));
                assert!(attachment.url.starts_with("file://"));
            }
            (Err(AttachmentError::Unsupported(_)), None) => {}
            (other, _) => panic!("unexpected result for {name}: {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let error = Attachment::from_file(&tmp.path().join("gone.png")).unwrap_err();
        assert!(matches!(error, AttachmentError::Io { .. }));
    }

    #[test]
    fn kind_serialises_under_type_key() {
        let attachment = Attachment {
            id: Id::from("a1"),
            kind: AttachmentKind::Pdf,
            url: "blob:x".to_string(),
            name: "x.pdf".to_string(),
            size: Some(3),
        };
        let json = serde_json::to_value(&attachment).unwrap();
        assert_eq!(json["type"], "pdf");
        assert_eq!(json["size"], 3);
    }
}
