use std::fmt;

use serde::{Deserialize, Serialize};

/// Axis-aligned box in image pixels: top-left `(x1, y1)`, bottom-right `(x2, y2)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl BBox {
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x1, self.y1, self.x2, self.y2)
    }
}

/// A recognized word or character with its position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBox {
    pub content: String,
    pub position: BBox,
    /// 0-100, 0 when the engine did not report one
    #[serde(default)]
    pub confidence: i32,
}

impl TextBox {
    pub fn new(content: impl Into<String>, position: BBox) -> Self {
        Self::with_confidence(content, position, 0)
    }

    pub fn with_confidence(content: impl Into<String>, position: BBox, confidence: i32) -> Self {
        Self {
            content: content.into(),
            position,
            confidence,
        }
    }

    /// `content x1 y1 x2 y2`, the layout of a Tesseract box file line.
    pub fn to_box_line(&self) -> String {
        format!("{} {}", self.content, self.position)
    }
}

impl fmt::Display for TextBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_box_line())
    }
}

/// A line of text: its word boxes and the box enclosing the whole line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBox {
    pub word_boxes: Vec<TextBox>,
    pub position: BBox,
}

impl LineBox {
    pub fn new(word_boxes: Vec<TextBox>, position: BBox) -> Self {
        Self {
            word_boxes,
            position,
        }
    }

    /// Words of the line separated by single spaces.
    pub fn content(&self) -> String {
        self.word_boxes
            .iter()
            .map(|b| b.content.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for LineBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[")?;
        for word in &self.word_boxes {
            writeln!(f, "  {}", word)?;
        }
        write!(f, "] {}", self.position)
    }
}

/// Engine version, compared component-wise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersionParseError {
    /// Fewer than two dot-separated components
    Split,
    /// A component does not start with a digit
    NotANumber,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parses the loose version strings engines print: `4.0.0`, `3.05`,
    /// `4.00.00dev2`, `v4.0.0.20181030`, `4.0.0alpha`.
    pub fn parse_lenient(s: &str) -> Result<Self, VersionParseError> {
        let s = s.trim();
        let s = s.strip_prefix('v').unwrap_or(s);
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() < 2 {
            return Err(VersionParseError::Split);
        }

        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(parts.iter()) {
            let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
            *slot = digits
                .parse()
                .map_err(|_| VersionParseError::NotANumber)?;
        }

        Ok(Self::new(numbers[0], numbers[1], numbers[2]))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Tesseract page segmentation modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum PageSegMode {
    OsdOnly = 0,
    AutoOsd = 1,
    AutoOnly = 2,
    Auto = 3,
    SingleColumn = 4,
    SingleBlockVertText = 5,
    SingleBlock = 6,
    SingleLine = 7,
    SingleWord = 8,
    CircleWord = 9,
    SingleChar = 10,
    SparseText = 11,
    SparseTextOsd = 12,
    RawLine = 13,
}

impl PageSegMode {
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for PageSegMode {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        use PageSegMode::*;
        Ok(match value {
            0 => OsdOnly,
            1 => AutoOsd,
            2 => AutoOnly,
            3 => Auto,
            4 => SingleColumn,
            5 => SingleBlockVertText,
            6 => SingleBlock,
            7 => SingleLine,
            8 => SingleWord,
            9 => CircleWord,
            10 => SingleChar,
            11 => SparseText,
            12 => SparseTextOsd,
            13 => RawLine,
            other => return Err(other),
        })
    }
}

/// Result of orientation detection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    /// Degrees, one of 0, 90, 180, 270
    pub angle: i32,
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_lenient() {
        let cases = [
            ("4.0.0", Version::new(4, 0, 0)),
            ("4.00.00dev2", Version::new(4, 0, 0)),
            ("4.00.00alpha", Version::new(4, 0, 0)),
            ("3.05", Version::new(3, 5, 0)),
            ("3.0", Version::new(3, 0, 0)),
            ("v4.0.0.20181030", Version::new(4, 0, 0)),
            ("3.5.1dev1", Version::new(3, 5, 1)),
            ("4.0.0aplha", Version::new(4, 0, 0)),
        ];
        for (input, expected) in cases {
            assert_eq!(Version::parse_lenient(input), Ok(expected), "{input}");
        }
    }

    #[test]
    fn test_version_lenient_errors() {
        assert_eq!(Version::parse_lenient("3"), Err(VersionParseError::Split));
        assert_eq!(
            Version::parse_lenient("A.B.C"),
            Err(VersionParseError::NotANumber)
        );
    }

    #[test]
    fn test_version_ordering() {
        assert!(Version::new(3, 5, 0) < Version::new(4, 0, 0));
        assert!(Version::new(3, 3, 0) > Version::new(3, 2, 1));
    }

    #[test]
    fn test_line_box_display() {
        let line = LineBox::new(
            vec![
                TextBox::new("word1", BBox::new(1, 2, 3, 4)),
                TextBox::new("word2", BBox::new(5, 6, 7, 8)),
            ],
            BBox::new(1, 2, 7, 8),
        );
        assert_eq!(line.content(), "word1 word2");
        assert_eq!(
            line.to_string(),
            "[\n  word1 1 2 3 4\n  word2 5 6 7 8\n] 1 2 7 8"
        );
    }

    #[test]
    fn test_page_seg_mode_roundtrip() {
        assert_eq!(PageSegMode::try_from(3), Ok(PageSegMode::Auto));
        assert_eq!(PageSegMode::Auto.as_u32(), 3);
        assert_eq!(PageSegMode::try_from(14), Err(14));
    }
}
