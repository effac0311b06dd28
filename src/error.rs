use std::io;

use crate::builders::BuilderKind;

#[derive(thiserror::Error, Debug)]
pub enum OcrError {
    /// Tesseract exited with an error, or its output could not be understood
    #[error("Tesseract error {status}: {message}")]
    Tesseract { status: i32, message: String },

    #[error("Cuneiform error {status}: {message}")]
    Cuneiform { status: i32, message: String },

    #[error("language {0} is not available")]
    LanguageUnavailable(String),

    #[error("no script detected")]
    NoScript,

    #[error("{tool} does not support the \"{builder}\" builder")]
    Unsupported {
        tool: &'static str,
        builder: BuilderKind,
    },

    #[error("{0} cannot detect orientation")]
    OrientationUnsupported(&'static str),

    /// A word was added before any line was started
    #[error("no line has been started")]
    NoOpenLine,

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Invalid hOCR: {0}")]
    Hocr(String),

    #[error("Unable to parse version: {0}")]
    Version(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),
}

impl OcrError {
    pub(crate) fn tesseract(status: i32, message: impl Into<String>) -> Self {
        OcrError::Tesseract {
            status,
            message: message.into(),
        }
    }

    /// Exit status reported by the engine, when there is one.
    pub fn status(&self) -> Option<i32> {
        match self {
            OcrError::Tesseract { status, .. } | OcrError::Cuneiform { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, OcrError>;
