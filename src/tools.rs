//! One interface over every engine.

use image::DynamicImage;
use tracing::debug;

use crate::builders::{Builder, BuilderKind};
use crate::cuneiform::Cuneiform;
use crate::error::Result;
#[cfg(feature = "libtesseract")]
use crate::libtesseract::NativeBackend;
use crate::libtesseract::{LibTesseract, TessBackend};
use crate::runner::Runner;
use crate::tesseract::Tesseract;
use crate::types::{Orientation, Version};

/// What every engine can be asked.
pub trait OcrTool {
    fn name(&self) -> &'static str;

    fn is_available(&self) -> bool;

    fn version(&self) -> Result<Version>;

    fn available_languages(&self) -> Result<Vec<String>>;

    fn available_builders(&self) -> &'static [BuilderKind];

    fn supports(&self, kind: BuilderKind) -> bool {
        self.available_builders().contains(&kind)
    }

    fn can_detect_orientation(&self) -> bool;

    fn detect_orientation(&self, image: &DynamicImage, lang: Option<&str>)
        -> Result<Orientation>;

    fn image_to_string<B: Builder>(
        &self,
        image: &DynamicImage,
        lang: Option<&str>,
        builder: B,
    ) -> Result<B::Output>;
}

macro_rules! delegate_tool {
    ($ty:ty, $($bound:tt)*) => {
        impl<X: $($bound)*> OcrTool for $ty {
            fn name(&self) -> &'static str {
                <$ty>::name(self)
            }

            fn is_available(&self) -> bool {
                <$ty>::is_available(self)
            }

            fn version(&self) -> Result<Version> {
                <$ty>::version(self)
            }

            fn available_languages(&self) -> Result<Vec<String>> {
                <$ty>::available_languages(self)
            }

            fn available_builders(&self) -> &'static [BuilderKind] {
                <$ty>::available_builders(self)
            }

            fn can_detect_orientation(&self) -> bool {
                <$ty>::can_detect_orientation(self)
            }

            fn detect_orientation(
                &self,
                image: &DynamicImage,
                lang: Option<&str>,
            ) -> Result<Orientation> {
                <$ty>::detect_orientation(self, image, lang)
            }

            fn image_to_string<B: Builder>(
                &self,
                image: &DynamicImage,
                lang: Option<&str>,
                builder: B,
            ) -> Result<B::Output> {
                <$ty>::image_to_string(self, image, lang, builder)
            }
        }
    };
}

delegate_tool!(Tesseract<X>, Runner);
delegate_tool!(Cuneiform<X>, Runner);
delegate_tool!(LibTesseract<X>, TessBackend);

/// An engine on this system.
pub enum Tool {
    #[cfg(feature = "libtesseract")]
    LibTesseract(LibTesseract<NativeBackend>),
    Tesseract(Tesseract),
    Cuneiform(Cuneiform),
}

macro_rules! dispatch {
    ($tool:expr, $inner:ident => $call:expr) => {
        match $tool {
            #[cfg(feature = "libtesseract")]
            Tool::LibTesseract($inner) => $call,
            Tool::Tesseract($inner) => $call,
            Tool::Cuneiform($inner) => $call,
        }
    };
}

impl Tool {
    /// Every engine this build knows about, preferred first.
    pub fn all() -> Vec<Tool> {
        let mut tools = Vec::new();
        #[cfg(feature = "libtesseract")]
        tools.push(Tool::LibTesseract(LibTesseract::default()));
        tools.push(Tool::Tesseract(Tesseract::new()));
        tools.push(Tool::Cuneiform(Cuneiform::new()));
        tools
    }
}

impl OcrTool for Tool {
    fn name(&self) -> &'static str {
        dispatch!(self, t => t.name())
    }

    fn is_available(&self) -> bool {
        dispatch!(self, t => t.is_available())
    }

    fn version(&self) -> Result<Version> {
        dispatch!(self, t => t.version())
    }

    fn available_languages(&self) -> Result<Vec<String>> {
        dispatch!(self, t => t.available_languages())
    }

    fn available_builders(&self) -> &'static [BuilderKind] {
        dispatch!(self, t => t.available_builders())
    }

    fn can_detect_orientation(&self) -> bool {
        dispatch!(self, t => t.can_detect_orientation())
    }

    fn detect_orientation(&self, image: &DynamicImage, lang: Option<&str>) -> Result<Orientation> {
        dispatch!(self, t => t.detect_orientation(image, lang))
    }

    fn image_to_string<B: Builder>(
        &self,
        image: &DynamicImage,
        lang: Option<&str>,
        builder: B,
    ) -> Result<B::Output> {
        dispatch!(self, t => t.image_to_string(image, lang, builder))
    }
}

/// The engines usable right now, preferred first.
pub fn get_available_tools() -> Vec<Tool> {
    let tools: Vec<Tool> = Tool::all()
        .into_iter()
        .filter(|tool| tool.is_available())
        .collect();
    debug!(
        tools = ?tools.iter().map(|t| t.name()).collect::<Vec<_>>(),
        "available OCR tools"
    );
    tools
}
