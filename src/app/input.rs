//! User-supplied files and their validation.

use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::TutorError;

const MIB: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Image,
    Audio,
}

impl InputKind {
    fn label(&self) -> &'static str {
        match self {
            Self::Image => "Image",
            Self::Audio => "Audio",
        }
    }
}

/// A photo, upload, or recording handed to the tutor.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mime_type = mime_for_path(path).unwrap_or("application/octet-stream");
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, mime_type, bytes))
    }

    pub fn kind(&self) -> Option<InputKind> {
        let mime = self.mime_type.to_ascii_lowercase();
        if mime.starts_with("image/") {
            Some(InputKind::Image)
        } else if mime.starts_with("audio/") {
            Some(InputKind::Audio)
        } else {
            None
        }
    }

    /// Check MIME type and size. `expected` narrows the accepted kind.
    pub fn validate(
        &self,
        limits: &LimitsConfig,
        expected: Option<InputKind>,
    ) -> Result<InputKind, TutorError> {
        let kind = match (self.kind(), expected) {
            (Some(kind), None) => kind,
            (Some(kind), Some(want)) if kind == want => kind,
            _ => {
                return Err(TutorError::UnsupportedFileType {
                    mime_type: self.mime_type.clone(),
                })
            }
        };

        let limit = match kind {
            InputKind::Image => limits.max_image_bytes,
            InputKind::Audio => limits.max_audio_bytes,
        };
        if self.bytes.len() > limit {
            return Err(TutorError::FileTooLarge {
                kind: kind.label(),
                size_mb: self.bytes.len() as f64 / MIB as f64,
                limit_mb: limit / MIB,
            });
        }
        Ok(kind)
    }
}

/// MIME type for common image and audio extensions.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "ogg" => "audio/ogg",
        "webm" => "audio/webm",
        "flac" => "audio/flac",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_image_rejected() {
        let file = InputFile::new("big.png", "image/png", vec![0; 10 * MIB]);
        let err = file.validate(&LimitsConfig::default(), None).unwrap_err();
        assert!(err.to_string().contains("too large"));
        assert!(err.to_string().contains("10.0 MB"));
    }

    #[test]
    fn image_at_limit_accepted() {
        let file = InputFile::new("ok.jpg", "image/jpeg", vec![0; 8 * MIB]);
        assert_eq!(
            file.validate(&LimitsConfig::default(), None).unwrap(),
            InputKind::Image
        );
    }

    #[test]
    fn audio_has_larger_limit() {
        let file = InputFile::new("q.mp3", "audio/mpeg", vec![0; 12 * MIB]);
        assert_eq!(
            file.validate(&LimitsConfig::default(), None).unwrap(),
            InputKind::Audio
        );
    }

    #[test]
    fn wrong_kind_is_unsupported() {
        let pdf = InputFile::new("notes.pdf", "application/pdf", vec![1]);
        assert!(matches!(
            pdf.validate(&LimitsConfig::default(), None),
            Err(TutorError::UnsupportedFileType { .. })
        ));

        let image = InputFile::new("a.png", "image/png", vec![1]);
        assert!(image
            .validate(&LimitsConfig::default(), Some(InputKind::Audio))
            .is_err());
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for_path(Path::new("hw/PAGE.JPG")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("q.m4a")), Some("audio/mp4"));
        assert_eq!(mime_for_path(Path::new("README")), None);
    }
}
