//! Tesseract through its C API.
//!
//! The library is reached through [`TessBackend`]; with the `libtesseract`
//! feature enabled, [`NativeBackend`] links against the real thing.

#[cfg(feature = "libtesseract")]
mod raw;

#[cfg(feature = "libtesseract")]
pub use raw::NativeBackend;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbImage};
use tracing::debug;

use crate::builders::{Builder, BuilderKind};
use crate::error::{OcrError, Result};
use crate::image_io;
use crate::types::{BBox, Orientation, PageSegMode, Version};

pub const NAME: &str = "Tesseract (C-API)";

pub const BUILDERS: &[BuilderKind] = &[
    BuilderKind::Text,
    BuilderKind::WordBoxes,
    BuilderKind::Digits,
    BuilderKind::LineBoxes,
    BuilderKind::DigitLineBoxes,
];

/// Oldest library version whose C API is usable here.
const MIN_VERSION: Version = Version::new(4, 0, 0);

const DEFAULT_LANG: &str = "eng";
const DIGITS_WHITELIST: &str = "0123456789.";

#[cfg(windows)]
const NULL_DEVICE: &str = "NUL";
#[cfg(not(windows))]
const NULL_DEVICE: &str = "/dev/null";

/// Granularity the result cursor reports and moves at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum PageIteratorLevel {
    Block = 0,
    Paragraph = 1,
    TextLine = 2,
    Word = 3,
    Symbol = 4,
}

pub trait TessBackend: Send + Sync {
    /// Version string reported by the library, e.g. `4.1.1`.
    fn version(&self) -> Result<String>;

    /// An initialized API handle; `None` leaves the language to the library.
    fn open(&self, lang: Option<&str>) -> Result<Box<dyn TessHandle>>;
}

/// An initialized API instance. Dropping it releases the instance.
pub trait TessHandle {
    fn available_languages(&self) -> Result<Vec<String>>;

    fn set_page_seg_mode(&mut self, mode: PageSegMode);

    fn set_variable(&mut self, name: &str, value: &str) -> Result<()>;

    fn set_image(&mut self, image: &RgbImage) -> Result<()>;

    fn recognize(&mut self) -> Result<()>;

    /// Cursor over the last recognition, `None` when nothing was found.
    fn result_cursor(&mut self) -> Option<Box<dyn ResultCursor + '_>>;

    /// `None` when the library could not tell.
    fn detect_orientation_script(&mut self) -> Result<Option<Orientation>>;

    /// A renderer writing `<output_base>.pdf` from what this handle recognizes.
    fn pdf_renderer(
        &mut self,
        output_base: &Path,
        text_only: bool,
    ) -> Result<Box<dyn PdfRenderer + '_>>;
}

/// Searchable PDF output. Dropping it releases the renderer.
pub trait PdfRenderer {
    fn begin_document(&mut self, title: &str) -> Result<()>;

    /// Recognizes `image` and appends it as the next page.
    fn add_page(&mut self, image: &RgbImage) -> Result<()>;

    fn end_document(&mut self) -> Result<()>;
}

pub trait ResultCursor {
    fn is_at_beginning_of(&self, level: PageIteratorLevel) -> bool;

    fn is_at_final_element(&self, level: PageIteratorLevel, element: PageIteratorLevel) -> bool;

    fn bounding_box(&self, level: PageIteratorLevel) -> Option<BBox>;

    fn text(&self, level: PageIteratorLevel) -> Option<String>;

    /// 0-100
    fn confidence(&self, level: PageIteratorLevel) -> f32;

    /// Moves to the next element at `level`; false once exhausted.
    fn next(&mut self, level: PageIteratorLevel) -> bool;
}

pub struct LibTesseract<B> {
    backend: B,
}

#[cfg(feature = "libtesseract")]
impl Default for LibTesseract<NativeBackend> {
    fn default() -> Self {
        Self::new(NativeBackend)
    }
}

impl<B: TessBackend> LibTesseract<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn name(&self) -> &'static str {
        NAME
    }

    pub fn available_builders(&self) -> &'static [BuilderKind] {
        BUILDERS
    }

    pub fn version(&self) -> Result<Version> {
        let raw = self.backend.version()?;
        Version::parse_lenient(&raw)
            .map_err(|_| OcrError::Version(format!("unexpected libtesseract version {raw:?}")))
    }

    pub fn is_available(&self) -> bool {
        self.version().is_ok_and(|v| v >= MIN_VERSION)
    }

    fn open(&self, lang: Option<&str>) -> Result<Box<dyn TessHandle>> {
        let mut handle = self.backend.open(lang)?;
        handle.set_variable("tessedit_zero_rejection", "F")?;
        Ok(handle)
    }

    pub fn available_languages(&self) -> Result<Vec<String>> {
        self.open(None)?.available_languages()
    }

    pub fn can_detect_orientation(&self) -> bool {
        self.available_languages()
            .is_ok_and(|langs| langs.iter().any(|l| l == "osd"))
    }

    pub fn detect_orientation(
        &self,
        image: &DynamicImage,
        _lang: Option<&str>,
    ) -> Result<Orientation> {
        let mut handle = self.open(Some("osd"))?;
        handle.set_page_seg_mode(PageSegMode::OsdOnly);
        handle.set_image(&image_io::to_rgb(image))?;
        match handle.detect_orientation_script()? {
            Some(orientation) if orientation.confidence > 0.0 => Ok(orientation),
            _ => Err(OcrError::NoScript),
        }
    }

    pub fn image_to_string<B2: Builder>(
        &self,
        image: &DynamicImage,
        lang: Option<&str>,
        mut builder: B2,
    ) -> Result<B2::Output> {
        let kind = builder.kind();
        if !BUILDERS.contains(&kind) {
            return Err(OcrError::Unsupported {
                tool: NAME,
                builder: kind,
            });
        }

        let mut handle = self.open(lang)?;
        let installed = handle.available_languages()?;
        for wanted in lang.unwrap_or(DEFAULT_LANG).split('+') {
            if !installed.iter().any(|l| l == wanted) {
                return Err(OcrError::LanguageUnavailable(wanted.to_string()));
            }
        }

        handle.set_page_seg_mode(builder.tesseract_layout());
        handle.set_variable("debug_file", NULL_DEVICE)?;
        handle.set_image(&image_io::to_rgb(image))?;
        if builder.tesseract_configs().contains(&"digits") {
            handle.set_variable("tessedit_char_whitelist", DIGITS_WHITELIST)?;
        }
        handle.recognize()?;

        let mut cursor = handle.result_cursor().ok_or(OcrError::NoScript)?;
        rebuild(cursor.as_mut(), &mut builder)?;
        Ok(builder.get_output())
    }

    /// Writes `image` as a one-page searchable PDF to `<output_base>.pdf`.
    pub fn image_to_pdf(
        &self,
        image: &DynamicImage,
        output_base: impl Into<PathBuf>,
    ) -> Result<PathBuf> {
        self.pdf_builder()
            .output_file(output_base)
            .add_image(image)
            .build()
    }

    pub fn pdf_builder(&self) -> PdfBuilder<'_, B> {
        PdfBuilder::new(self)
    }
}

/// Collects the pages of one searchable PDF.
///
/// ```rust,ignore
/// let pdf = tess
///     .pdf_builder()
///     .output_file("scan")
///     .add_image(&page1)
///     .add_image(&page2)
///     .build()?;
/// ```
pub struct PdfBuilder<'a, B> {
    tess: &'a LibTesseract<B>,
    output_base: Option<PathBuf>,
    lang: Option<String>,
    text_only: bool,
    pages: Vec<RgbImage>,
}

impl<'a, B: TessBackend> PdfBuilder<'a, B> {
    pub fn new(tess: &'a LibTesseract<B>) -> Self {
        Self {
            tess,
            output_base: None,
            lang: None,
            text_only: false,
            pages: Vec::new(),
        }
    }

    /// Output path without the `.pdf` extension, which the library appends.
    pub fn output_file(mut self, output_base: impl Into<PathBuf>) -> Self {
        self.output_base = Some(output_base.into());
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Leave the page images out and keep only the text layer.
    pub fn text_only(mut self, text_only: bool) -> Self {
        self.text_only = text_only;
        self
    }

    pub fn add_image(mut self, image: &DynamicImage) -> Self {
        self.pages.push(image_io::to_rgb(image));
        self
    }

    /// Recognizes every page and writes the document; returns its path.
    pub fn build(self) -> Result<PathBuf> {
        let output_base = self
            .output_base
            .ok_or_else(|| OcrError::Pdf("no output file set".to_string()))?;

        let mut handle = self.tess.open(self.lang.as_deref())?;
        handle.set_page_seg_mode(PageSegMode::AutoOsd);
        let mut renderer = handle.pdf_renderer(&output_base, self.text_only)?;
        renderer.begin_document("")?;
        for page in &self.pages {
            renderer.add_page(page)?;
        }
        renderer.end_document()?;

        let mut path = OsString::from(output_base);
        path.push(".pdf");
        debug!(pages = self.pages.len(), path = ?path, "PDF written");
        Ok(PathBuf::from(path))
    }
}

/// Feeds the recognized lines and words to `builder`, in reading order.
fn rebuild<C, B>(cursor: &mut C, builder: &mut B) -> Result<()>
where
    C: ResultCursor + ?Sized,
    B: Builder,
{
    use PageIteratorLevel::{TextLine, Word};

    let mut words = 0usize;
    loop {
        if cursor.is_at_beginning_of(TextLine) {
            builder.start_line(cursor.bounding_box(TextLine).unwrap_or_default());
        }

        let last_word_in_line = cursor.is_at_final_element(TextLine, Word);
        let text = cursor.text(Word);
        let confidence = cursor.confidence(Word).round() as i32;
        if let Some(text) = text.filter(|t| !t.is_empty()) {
            let position = cursor.bounding_box(Word).unwrap_or_default();
            builder.add_word(&text, position, confidence)?;
            words += 1;
            if last_word_in_line {
                builder.end_line();
            }
        }

        if !cursor.next(Word) {
            break;
        }
    }
    debug!(words, "libtesseract result read");
    Ok(())
}
