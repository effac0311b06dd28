// Bindings to the Tesseract C API (capi.h)
use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::os::raw::{c_char, c_float, c_int, c_uchar};
use std::path::Path;
use std::ptr;

use image::RgbImage;
use tracing::debug;

use super::{PageIteratorLevel, PdfRenderer, ResultCursor, TessBackend, TessHandle};
use crate::error::{OcrError, Result};
use crate::types::{BBox, Orientation, PageSegMode};

#[repr(C)]
struct TessBaseAPI {
    _private: [u8; 0],
}

#[repr(C)]
struct TessResultIterator {
    _private: [u8; 0],
}

#[repr(C)]
struct TessPageIterator {
    _private: [u8; 0],
}

#[repr(C)]
struct TessResultRenderer {
    _private: [u8; 0],
}

type Bool = c_int;

#[link(name = "tesseract")]
extern "C" {
    fn TessVersion() -> *const c_char;
    fn TessDeleteText(text: *const c_char);
    fn TessDeleteTextArray(arr: *mut *mut c_char);

    fn TessBaseAPICreate() -> *mut TessBaseAPI;
    fn TessBaseAPIDelete(handle: *mut TessBaseAPI);
    fn TessBaseAPIInit3(
        handle: *mut TessBaseAPI,
        datapath: *const c_char,
        language: *const c_char,
    ) -> c_int;
    fn TessBaseAPISetVariable(
        handle: *mut TessBaseAPI,
        name: *const c_char,
        value: *const c_char,
    ) -> Bool;
    fn TessBaseAPIGetAvailableLanguagesAsVector(handle: *const TessBaseAPI) -> *mut *mut c_char;
    fn TessBaseAPISetPageSegMode(handle: *mut TessBaseAPI, mode: c_int);
    fn TessBaseAPISetImage(
        handle: *mut TessBaseAPI,
        imagedata: *const c_uchar,
        width: c_int,
        height: c_int,
        bytes_per_pixel: c_int,
        bytes_per_line: c_int,
    );
    fn TessBaseAPIRecognize(handle: *mut TessBaseAPI, monitor: *mut std::ffi::c_void) -> c_int;
    fn TessBaseAPIGetIterator(handle: *mut TessBaseAPI) -> *mut TessResultIterator;
    fn TessBaseAPIGetDatapath(handle: *mut TessBaseAPI) -> *const c_char;
    fn TessBaseAPIDetectOrientationScript(
        handle: *mut TessBaseAPI,
        orient_deg: *mut c_int,
        orient_conf: *mut c_float,
        script_name: *mut *const c_char,
        script_conf: *mut c_float,
    ) -> Bool;

    fn TessPDFRendererCreate(
        outputbase: *const c_char,
        datadir: *const c_char,
        textonly: Bool,
    ) -> *mut TessResultRenderer;
    fn TessDeleteResultRenderer(renderer: *mut TessResultRenderer);
    fn TessResultRendererBeginDocument(
        renderer: *mut TessResultRenderer,
        title: *const c_char,
    ) -> Bool;
    fn TessResultRendererAddImage(
        renderer: *mut TessResultRenderer,
        api: *mut TessBaseAPI,
    ) -> Bool;
    fn TessResultRendererEndDocument(renderer: *mut TessResultRenderer) -> Bool;

    fn TessResultIteratorDelete(iterator: *mut TessResultIterator);
    fn TessResultIteratorNext(iterator: *mut TessResultIterator, level: c_int) -> Bool;
    fn TessResultIteratorGetPageIteratorConst(
        iterator: *const TessResultIterator,
    ) -> *const TessPageIterator;
    fn TessResultIteratorGetUTF8Text(
        iterator: *const TessResultIterator,
        level: c_int,
    ) -> *mut c_char;
    fn TessResultIteratorConfidence(iterator: *const TessResultIterator, level: c_int) -> c_float;

    fn TessPageIteratorIsAtBeginningOf(iterator: *const TessPageIterator, level: c_int) -> Bool;
    fn TessPageIteratorIsAtFinalElement(
        iterator: *const TessPageIterator,
        level: c_int,
        element: c_int,
    ) -> Bool;
    fn TessPageIteratorBoundingBox(
        iterator: *const TessPageIterator,
        level: c_int,
        left: *mut c_int,
        top: *mut c_int,
        right: *mut c_int,
        bottom: *mut c_int,
    ) -> Bool;
}

fn c_string(value: &str) -> Result<CString> {
    CString::new(value).map_err(|_| OcrError::tesseract(-1, format!("NUL byte in {value:?}")))
}

/// Copies a string owned by the library and frees it.
///
/// # Safety
/// `text` must be null or a string allocated by the library.
unsafe fn take_text(text: *mut c_char) -> Option<String> {
    if text.is_null() {
        return None;
    }
    let owned = CStr::from_ptr(text).to_string_lossy().into_owned();
    TessDeleteText(text);
    Some(owned)
}

/// The system `libtesseract`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeBackend;

impl TessBackend for NativeBackend {
    fn version(&self) -> Result<String> {
        // SAFETY: TessVersion returns a static string
        let version = unsafe { TessVersion() };
        if version.is_null() {
            return Err(OcrError::Version("TessVersion() returned nothing".to_string()));
        }
        Ok(unsafe { CStr::from_ptr(version) }
            .to_string_lossy()
            .into_owned())
    }

    fn open(&self, lang: Option<&str>) -> Result<Box<dyn TessHandle>> {
        let lang = lang.map(c_string).transpose()?;
        // SAFETY: a fresh handle is owned by NativeHandle from here on
        let handle = NativeHandle {
            api: unsafe { TessBaseAPICreate() },
        };
        if handle.api.is_null() {
            return Err(OcrError::tesseract(-1, "TessBaseAPICreate() failed"));
        }

        let lang_ptr = lang.as_ref().map_or(ptr::null(), |l| l.as_ptr());
        let status = unsafe { TessBaseAPIInit3(handle.api, ptr::null(), lang_ptr) };
        if status != 0 {
            return Err(OcrError::tesseract(
                status,
                "Failed to initialize Tesseract",
            ));
        }
        debug!(lang = ?lang, "libtesseract handle ready");
        Ok(Box::new(handle))
    }
}

struct NativeHandle {
    api: *mut TessBaseAPI,
}

impl Drop for NativeHandle {
    fn drop(&mut self) {
        // SAFETY: api came from TessBaseAPICreate and is deleted once
        unsafe { TessBaseAPIDelete(self.api) }
    }
}

impl TessHandle for NativeHandle {
    fn available_languages(&self) -> Result<Vec<String>> {
        let mut langs = Vec::new();
        unsafe {
            let array = TessBaseAPIGetAvailableLanguagesAsVector(self.api);
            if array.is_null() {
                return Ok(langs);
            }
            let mut cursor = array;
            while !(*cursor).is_null() {
                let lang = CStr::from_ptr(*cursor).to_string_lossy().into_owned();
                if !lang.is_empty() {
                    langs.push(lang);
                }
                cursor = cursor.add(1);
            }
            TessDeleteTextArray(array);
        }
        Ok(langs)
    }

    fn set_page_seg_mode(&mut self, mode: PageSegMode) {
        unsafe { TessBaseAPISetPageSegMode(self.api, mode.as_u32() as c_int) }
    }

    fn set_variable(&mut self, name: &str, value: &str) -> Result<()> {
        let c_name = c_string(name)?;
        let c_value = c_string(value)?;
        let ok = unsafe { TessBaseAPISetVariable(self.api, c_name.as_ptr(), c_value.as_ptr()) };
        if ok == 0 {
            return Err(OcrError::tesseract(
                -1,
                format!("unknown Tesseract variable {name}"),
            ));
        }
        Ok(())
    }

    fn set_image(&mut self, image: &RgbImage) -> Result<()> {
        let too_large = || OcrError::tesseract(-1, "image too large for Tesseract");
        let width = c_int::try_from(image.width()).map_err(|_| too_large())?;
        let height = c_int::try_from(image.height()).map_err(|_| too_large())?;
        let bytes_per_line = width.checked_mul(3).ok_or_else(too_large)?;
        // SAFETY: Tesseract copies the pixels before SetImage returns
        unsafe {
            TessBaseAPISetImage(
                self.api,
                image.as_raw().as_ptr(),
                width,
                height,
                3,
                bytes_per_line,
            )
        }
        Ok(())
    }

    fn recognize(&mut self) -> Result<()> {
        let status = unsafe { TessBaseAPIRecognize(self.api, ptr::null_mut()) };
        if status != 0 {
            return Err(OcrError::tesseract(status, "TessBaseAPIRecognize() failed"));
        }
        Ok(())
    }

    fn result_cursor(&mut self) -> Option<Box<dyn ResultCursor + '_>> {
        let iterator = unsafe { TessBaseAPIGetIterator(self.api) };
        if iterator.is_null() {
            return None;
        }
        let page = unsafe { TessResultIteratorGetPageIteratorConst(iterator) };
        Some(Box::new(NativeCursor {
            iterator,
            page,
            _handle: PhantomData,
        }))
    }

    fn detect_orientation_script(&mut self) -> Result<Option<Orientation>> {
        let mut angle: c_int = 0;
        let mut confidence: c_float = 0.0;
        let ok = unsafe {
            TessBaseAPIDetectOrientationScript(
                self.api,
                &mut angle,
                &mut confidence,
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };
        if ok == 0 {
            debug!("orientation detection gave no answer");
            return Ok(None);
        }
        Ok(Some(Orientation { angle, confidence }))
    }

    fn pdf_renderer(
        &mut self,
        output_base: &Path,
        text_only: bool,
    ) -> Result<Box<dyn PdfRenderer + '_>> {
        let base = c_string(&output_base.to_string_lossy())?;
        // SAFETY: the datapath string belongs to the handle, which outlives the call
        let renderer = unsafe {
            let datadir = TessBaseAPIGetDatapath(self.api);
            TessPDFRendererCreate(base.as_ptr(), datadir, Bool::from(text_only))
        };
        if renderer.is_null() {
            return Err(OcrError::Pdf(format!(
                "unable to create a PDF renderer for {}",
                output_base.display()
            )));
        }
        Ok(Box::new(NativeRenderer {
            renderer,
            handle: self,
        }))
    }
}

/// PDF renderer fed from the handle it borrows.
struct NativeRenderer<'a> {
    renderer: *mut TessResultRenderer,
    handle: &'a mut NativeHandle,
}

impl Drop for NativeRenderer<'_> {
    fn drop(&mut self) {
        // SAFETY: renderer came from TessPDFRendererCreate and is deleted once
        unsafe { TessDeleteResultRenderer(self.renderer) }
    }
}

impl PdfRenderer for NativeRenderer<'_> {
    fn begin_document(&mut self, title: &str) -> Result<()> {
        let title = c_string(title)?;
        if unsafe { TessResultRendererBeginDocument(self.renderer, title.as_ptr()) } == 0 {
            return Err(OcrError::Pdf("unable to begin the document".to_string()));
        }
        Ok(())
    }

    fn add_page(&mut self, image: &RgbImage) -> Result<()> {
        self.handle.set_image(image)?;
        self.handle.recognize()?;
        if unsafe { TessResultRendererAddImage(self.renderer, self.handle.api) } == 0 {
            return Err(OcrError::Pdf("unable to add a page".to_string()));
        }
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        if unsafe { TessResultRendererEndDocument(self.renderer) } == 0 {
            return Err(OcrError::Pdf("unable to finish the document".to_string()));
        }
        Ok(())
    }
}

/// Result iterator, valid while the handle that produced it is borrowed.
struct NativeCursor<'a> {
    iterator: *mut TessResultIterator,
    page: *const TessPageIterator,
    _handle: PhantomData<&'a mut NativeHandle>,
}

impl Drop for NativeCursor<'_> {
    fn drop(&mut self) {
        // the page iterator is a view into this one and is not freed separately
        unsafe { TessResultIteratorDelete(self.iterator) }
    }
}

impl ResultCursor for NativeCursor<'_> {
    fn is_at_beginning_of(&self, level: PageIteratorLevel) -> bool {
        unsafe { TessPageIteratorIsAtBeginningOf(self.page, level as c_int) != 0 }
    }

    fn is_at_final_element(&self, level: PageIteratorLevel, element: PageIteratorLevel) -> bool {
        unsafe { TessPageIteratorIsAtFinalElement(self.page, level as c_int, element as c_int) != 0 }
    }

    fn bounding_box(&self, level: PageIteratorLevel) -> Option<BBox> {
        let (mut left, mut top, mut right, mut bottom) = (0, 0, 0, 0);
        let ok = unsafe {
            TessPageIteratorBoundingBox(
                self.page,
                level as c_int,
                &mut left,
                &mut top,
                &mut right,
                &mut bottom,
            )
        };
        if ok == 0 {
            return None;
        }
        Some(BBox::new(
            u32::try_from(left).ok()?,
            u32::try_from(top).ok()?,
            u32::try_from(right).ok()?,
            u32::try_from(bottom).ok()?,
        ))
    }

    fn text(&self, level: PageIteratorLevel) -> Option<String> {
        unsafe { take_text(TessResultIteratorGetUTF8Text(self.iterator, level as c_int)) }
    }

    fn confidence(&self, level: PageIteratorLevel) -> f32 {
        unsafe { TessResultIteratorConfidence(self.iterator, level as c_int) }
    }

    fn next(&mut self, level: PageIteratorLevel) -> bool {
        unsafe { TessResultIteratorNext(self.iterator, level as c_int) != 0 }
    }
}
