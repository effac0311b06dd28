//! # tessera
//!
//! One interface over external OCR engines: Tesseract (its command-line
//! program or, with the `libtesseract` feature, its C API) and Cuneiform.
//!
//! The engines do the recognition. This crate runs them, hands them the
//! image and turns what they write back (plain text, hOCR, box files,
//! orientation reports) into Rust values through a [`Builder`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tessera::{get_available_tools, LineBoxBuilder, OcrTool};
//!
//! let tools = get_available_tools();
//! let tool = tools.first().expect("no OCR tool found");
//! let image = image::open("page.png")?;
//!
//! for line in tool.image_to_string(&image, Some("eng"), LineBoxBuilder::new())? {
//!     println!("{} @ {}", line.content(), line.position);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod image_io;
mod types;

pub mod builders;
pub mod cuneiform;
pub mod hocr;
pub mod libtesseract;
pub mod runner;
pub mod tesseract;
pub mod tools;

#[cfg(test)]
mod testing;

pub use crate::builders::{
    Builder, BuilderKind, CharBoxBuilder, CuneiformOptions, DigitBuilder, DigitLineBoxBuilder,
    LineBoxBuilder, TextBuilder, WordBoxBuilder,
};
pub use crate::cuneiform::{Cuneiform, CuneiformConfig};
pub use crate::error::{OcrError, Result};
pub use crate::image_io::open as open_image;
pub use crate::libtesseract::{LibTesseract, PdfBuilder};
pub use crate::tesseract::{Tesseract, TesseractConfig};
pub use crate::tools::{get_available_tools, OcrTool, Tool};
pub use crate::types::{
    BBox, LineBox, Orientation, PageSegMode, TextBox, Version, VersionParseError,
};
