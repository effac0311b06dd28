//! Builders tell an engine what to produce and turn its output into Rust values.
//!
//! A builder is used two ways: CLI engines write a file which
//! [`Builder::read_file`] parses, while the C API is walked word by word and
//! fed through [`Builder::start_line`], [`Builder::add_word`] and
//! [`Builder::end_line`] before [`Builder::get_output`] is called.

use std::fmt;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{OcrError, Result};
use crate::hocr;
use crate::tesseract::psm_parameter;
use crate::types::{BBox, LineBox, PageSegMode, TextBox, Version};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuilderKind {
    Text,
    WordBoxes,
    LineBoxes,
    CharBoxes,
    Digits,
    DigitLineBoxes,
}

impl fmt::Display for BuilderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BuilderKind::Text => "Raw text",
            BuilderKind::WordBoxes => "Word boxes",
            BuilderKind::LineBoxes => "Line boxes",
            BuilderKind::CharBoxes => "Character boxes",
            BuilderKind::Digits => "Digits raw text",
            BuilderKind::DigitLineBoxes => "Digit line boxes",
        })
    }
}

pub trait Builder: fmt::Display {
    type Output;

    fn kind(&self) -> BuilderKind;

    /// Extensions Tesseract may give its output file, tried in order.
    fn file_extensions(&self) -> &'static [&'static str];

    fn tesseract_layout(&self) -> PageSegMode;

    /// Command-line flags for the given Tesseract version.
    fn tesseract_flags(&self, version: Version) -> Vec<String> {
        vec![
            psm_parameter(version).to_string(),
            self.tesseract_layout().as_u32().to_string(),
        ]
    }

    /// Tesseract config files, appended after the flags.
    fn tesseract_configs(&self) -> &'static [&'static str];

    fn cuneiform_args(&self) -> Vec<String>;

    fn read_file(&self, content: &str) -> Result<Self::Output>;

    fn write_file<W: Write>(&self, out: &mut W, output: &Self::Output) -> io::Result<()>;

    fn start_line(&mut self, position: BBox);

    fn add_word(&mut self, word: &str, position: BBox, confidence: i32) -> Result<()>;

    fn end_line(&mut self);

    fn get_output(&self) -> Self::Output;
}

/// Cuneiform switches that only apply to plain-text recognition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuneiformOptions {
    pub dotmatrix: bool,
    pub fax: bool,
    pub singlecolumn: bool,
}

impl CuneiformOptions {
    fn to_args(self) -> Vec<String> {
        let mut args = Vec::new();
        if self.dotmatrix {
            args.push("--dotmatrix".to_string());
        }
        if self.fax {
            args.push("--fax".to_string());
        }
        if self.singlecolumn {
            args.push("--singlecolumn".to_string());
        }
        args
    }
}

fn hocr_cuneiform_args() -> Vec<String> {
    vec!["-f".to_string(), "hocr".to_string()]
}

/// Plain text, one line of output per recognized line.
#[derive(Clone, Debug)]
pub struct TextBuilder {
    layout: PageSegMode,
    cuneiform: CuneiformOptions,
    built_text: Vec<String>,
}

impl Default for TextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuilder {
    pub fn new() -> Self {
        Self::with_layout(PageSegMode::Auto)
    }

    pub fn with_layout(layout: PageSegMode) -> Self {
        Self {
            layout,
            cuneiform: CuneiformOptions::default(),
            built_text: Vec::new(),
        }
    }

    pub fn with_cuneiform_options(mut self, options: CuneiformOptions) -> Self {
        self.cuneiform = options;
        self
    }

    pub fn built_text(&self) -> &[String] {
        &self.built_text
    }
}

impl fmt::Display for TextBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind().fmt(f)
    }
}

impl Builder for TextBuilder {
    type Output = String;

    fn kind(&self) -> BuilderKind {
        BuilderKind::Text
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["txt"]
    }

    fn tesseract_layout(&self) -> PageSegMode {
        self.layout
    }

    fn tesseract_configs(&self) -> &'static [&'static str] {
        &[]
    }

    fn cuneiform_args(&self) -> Vec<String> {
        let mut args = vec!["-f".to_string(), "text".to_string()];
        args.extend(self.cuneiform.to_args());
        args
    }

    fn read_file(&self, content: &str) -> Result<String> {
        Ok(content.trim().to_string())
    }

    fn write_file<W: Write>(&self, out: &mut W, output: &String) -> io::Result<()> {
        out.write_all(output.as_bytes())
    }

    fn start_line(&mut self, _position: BBox) {
        self.built_text.push(String::new());
    }

    fn add_word(&mut self, word: &str, _position: BBox, _confidence: i32) -> Result<()> {
        let line = self.built_text.last_mut().ok_or(OcrError::NoOpenLine)?;
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
        Ok(())
    }

    fn end_line(&mut self) {}

    fn get_output(&self) -> String {
        self.built_text.join("\n")
    }
}

/// Plain text restricted to digits.
#[derive(Clone, Debug, Default)]
pub struct DigitBuilder {
    inner: TextBuilder,
}

impl DigitBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(layout: PageSegMode) -> Self {
        Self {
            inner: TextBuilder::with_layout(layout),
        }
    }
}

impl fmt::Display for DigitBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind().fmt(f)
    }
}

impl Builder for DigitBuilder {
    type Output = String;

    fn kind(&self) -> BuilderKind {
        BuilderKind::Digits
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        self.inner.file_extensions()
    }

    fn tesseract_layout(&self) -> PageSegMode {
        self.inner.tesseract_layout()
    }

    fn tesseract_configs(&self) -> &'static [&'static str] {
        &["digits"]
    }

    fn cuneiform_args(&self) -> Vec<String> {
        self.inner.cuneiform_args()
    }

    fn read_file(&self, content: &str) -> Result<String> {
        self.inner.read_file(content)
    }

    fn write_file<W: Write>(&self, out: &mut W, output: &String) -> io::Result<()> {
        self.inner.write_file(out, output)
    }

    fn start_line(&mut self, position: BBox) {
        self.inner.start_line(position)
    }

    fn add_word(&mut self, word: &str, position: BBox, confidence: i32) -> Result<()> {
        self.inner.add_word(word, position, confidence)
    }

    fn end_line(&mut self) {
        self.inner.end_line()
    }

    fn get_output(&self) -> String {
        self.inner.get_output()
    }
}

/// Every recognized word with its box and confidence.
#[derive(Clone, Debug)]
pub struct WordBoxBuilder {
    layout: PageSegMode,
    word_boxes: Vec<TextBox>,
}

impl Default for WordBoxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WordBoxBuilder {
    pub fn new() -> Self {
        Self::with_layout(PageSegMode::AutoOsd)
    }

    pub fn with_layout(layout: PageSegMode) -> Self {
        Self {
            layout,
            word_boxes: Vec::new(),
        }
    }

    pub fn word_boxes(&self) -> &[TextBox] {
        &self.word_boxes
    }
}

impl fmt::Display for WordBoxBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind().fmt(f)
    }
}

impl Builder for WordBoxBuilder {
    type Output = Vec<TextBox>;

    fn kind(&self) -> BuilderKind {
        BuilderKind::WordBoxes
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["html", "hocr"]
    }

    fn tesseract_layout(&self) -> PageSegMode {
        self.layout
    }

    fn tesseract_configs(&self) -> &'static [&'static str] {
        &["hocr"]
    }

    fn cuneiform_args(&self) -> Vec<String> {
        hocr_cuneiform_args()
    }

    fn read_file(&self, content: &str) -> Result<Vec<TextBox>> {
        let words = hocr::parse_words(content)?;
        if !words.is_empty() {
            return Ok(words);
        }
        let lines = hocr::parse_char_info_lines(content)?;
        Ok(lines.into_iter().flat_map(|l| l.word_boxes).collect())
    }

    fn write_file<W: Write>(&self, out: &mut W, output: &Vec<TextBox>) -> io::Result<()> {
        hocr::write_document(out, output.iter().map(hocr::word_tag))
    }

    fn start_line(&mut self, _position: BBox) {}

    fn add_word(&mut self, word: &str, position: BBox, confidence: i32) -> Result<()> {
        self.word_boxes
            .push(TextBox::with_confidence(word, position, confidence));
        Ok(())
    }

    fn end_line(&mut self) {}

    fn get_output(&self) -> Vec<TextBox> {
        self.word_boxes.clone()
    }
}

/// Lines, each with the boxes of its words.
#[derive(Clone, Debug)]
pub struct LineBoxBuilder {
    layout: PageSegMode,
    lines: Vec<LineBox>,
}

impl Default for LineBoxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBoxBuilder {
    pub fn new() -> Self {
        Self::with_layout(PageSegMode::AutoOsd)
    }

    pub fn with_layout(layout: PageSegMode) -> Self {
        Self {
            layout,
            lines: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[LineBox] {
        &self.lines
    }
}

impl fmt::Display for LineBoxBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind().fmt(f)
    }
}

impl Builder for LineBoxBuilder {
    type Output = Vec<LineBox>;

    fn kind(&self) -> BuilderKind {
        BuilderKind::LineBoxes
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["html", "hocr"]
    }

    fn tesseract_layout(&self) -> PageSegMode {
        self.layout
    }

    fn tesseract_configs(&self) -> &'static [&'static str] {
        &["hocr"]
    }

    fn cuneiform_args(&self) -> Vec<String> {
        hocr_cuneiform_args()
    }

    fn read_file(&self, content: &str) -> Result<Vec<LineBox>> {
        let lines = hocr::parse_lines(content)?;
        if !lines.is_empty() {
            return Ok(lines);
        }
        hocr::parse_char_info_lines(content)
    }

    fn write_file<W: Write>(&self, out: &mut W, output: &Vec<LineBox>) -> io::Result<()> {
        hocr::write_document(out, output.iter().map(hocr::line_tag))
    }

    fn start_line(&mut self, position: BBox) {
        // never leave an empty line behind
        if self
            .lines
            .last()
            .is_some_and(|line| line.word_boxes.is_empty())
        {
            return;
        }
        self.lines.push(LineBox::new(Vec::new(), position));
    }

    fn add_word(&mut self, word: &str, position: BBox, confidence: i32) -> Result<()> {
        let line = self.lines.last_mut().ok_or(OcrError::NoOpenLine)?;
        line.word_boxes
            .push(TextBox::with_confidence(word, position, confidence));
        Ok(())
    }

    fn end_line(&mut self) {}

    fn get_output(&self) -> Vec<LineBox> {
        self.lines.clone()
    }
}

/// Line boxes restricted to digits.
#[derive(Clone, Debug, Default)]
pub struct DigitLineBoxBuilder {
    inner: LineBoxBuilder,
}

impl DigitLineBoxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(layout: PageSegMode) -> Self {
        Self {
            inner: LineBoxBuilder::with_layout(layout),
        }
    }
}

impl fmt::Display for DigitLineBoxBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind().fmt(f)
    }
}

impl Builder for DigitLineBoxBuilder {
    type Output = Vec<LineBox>;

    fn kind(&self) -> BuilderKind {
        BuilderKind::DigitLineBoxes
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        self.inner.file_extensions()
    }

    fn tesseract_layout(&self) -> PageSegMode {
        self.inner.tesseract_layout()
    }

    fn tesseract_configs(&self) -> &'static [&'static str] {
        &["hocr", "digits"]
    }

    fn cuneiform_args(&self) -> Vec<String> {
        self.inner.cuneiform_args()
    }

    fn read_file(&self, content: &str) -> Result<Vec<LineBox>> {
        self.inner.read_file(content)
    }

    fn write_file<W: Write>(&self, out: &mut W, output: &Vec<LineBox>) -> io::Result<()> {
        self.inner.write_file(out, output)
    }

    fn start_line(&mut self, position: BBox) {
        self.inner.start_line(position)
    }

    fn add_word(&mut self, word: &str, position: BBox, confidence: i32) -> Result<()> {
        self.inner.add_word(word, position, confidence)
    }

    fn end_line(&mut self) {
        self.inner.end_line()
    }

    fn get_output(&self) -> Vec<LineBox> {
        self.inner.get_output()
    }
}

/// Individual characters, read from a Tesseract `makebox` file.
///
/// Box files measure `y` from the bottom of the image; the values are kept
/// as Tesseract wrote them.
#[derive(Clone, Debug, Default)]
pub struct CharBoxBuilder {
    char_boxes: Vec<TextBox>,
}

impl CharBoxBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Display for CharBoxBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind().fmt(f)
    }
}

fn parse_box_line(line: &str) -> Option<TextBox> {
    let fields: Vec<&str> = line.split(' ').collect();
    if fields.len() < 6 {
        return None;
    }
    let mut coords = [0u32; 4];
    for (slot, field) in coords.iter_mut().zip(&fields[1..5]) {
        match field.parse() {
            Ok(value) => *slot = value,
            Err(_) => {
                warn!(line, "box file line skipped: bad coordinate");
                return None;
            }
        }
    }
    Some(TextBox::new(
        fields[0],
        BBox::new(coords[0], coords[1], coords[2], coords[3]),
    ))
}

impl Builder for CharBoxBuilder {
    type Output = Vec<TextBox>;

    fn kind(&self) -> BuilderKind {
        BuilderKind::CharBoxes
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["box"]
    }

    fn tesseract_layout(&self) -> PageSegMode {
        PageSegMode::AutoOsd
    }

    fn tesseract_flags(&self, _version: Version) -> Vec<String> {
        Vec::new()
    }

    fn tesseract_configs(&self) -> &'static [&'static str] {
        &["batch.nochop", "makebox"]
    }

    fn cuneiform_args(&self) -> Vec<String> {
        Vec::new()
    }

    fn read_file(&self, content: &str) -> Result<Vec<TextBox>> {
        // order matters: it is the reading order of the characters
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter_map(parse_box_line)
            .collect())
    }

    fn write_file<W: Write>(&self, out: &mut W, output: &Vec<TextBox>) -> io::Result<()> {
        for char_box in output {
            writeln!(out, "{} 0", char_box.to_box_line())?;
        }
        Ok(())
    }

    fn start_line(&mut self, _position: BBox) {}

    fn add_word(&mut self, word: &str, position: BBox, confidence: i32) -> Result<()> {
        self.char_boxes
            .push(TextBox::with_confidence(word, position, confidence));
        Ok(())
    }

    fn end_line(&mut self) {}

    fn get_output(&self) -> Vec<TextBox> {
        self.char_boxes.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V3: Version = Version::new(3, 5, 0);
    const V4: Version = Version::new(4, 0, 0);

    fn sample_boxes() -> Vec<TextBox> {
        vec![
            TextBox::with_confidence("word1", BBox::new(10, 11, 12, 13), 95),
            TextBox::new("word2", BBox::new(11, 12, 13, 14)),
            TextBox::new("word3", BBox::new(12, 13, 14, 15)),
            TextBox::with_confidence("word4", BBox::new(13, 14, 15, 16), 87),
        ]
    }

    fn sample_lines() -> Vec<LineBox> {
        (0..4u32)
            .map(|l| {
                let boxes = (0..4u32)
                    .map(|b| {
                        let i = 4 * l + b;
                        TextBox::with_confidence(
                            format!("word{i}"),
                            BBox::new(i, i + 1, i + 2, i + 3),
                            (i * 7 % 100) as i32,
                        )
                    })
                    .collect();
                LineBox::new(boxes, BBox::new(4 * l, 4 * (l + 1), 4 * l + 2, 4 * (l + 1) + 2))
            })
            .collect()
    }

    #[test]
    fn test_text_builder_init() {
        let builder = TextBuilder::new();
        assert_eq!(builder.file_extensions(), &["txt"]);
        assert_eq!(builder.tesseract_flags(V4), vec!["--psm", "3"]);
        assert!(builder.tesseract_configs().is_empty());
        assert_eq!(builder.tesseract_layout(), PageSegMode::Auto);
        assert_eq!(builder.cuneiform_args(), vec!["-f", "text"]);
        assert_eq!(builder.to_string(), "Raw text");
    }

    #[test]
    fn test_text_builder_cuneiform_options() {
        for bits in 0..8u8 {
            let options = CuneiformOptions {
                dotmatrix: bits & 1 != 0,
                fax: bits & 2 != 0,
                singlecolumn: bits & 4 != 0,
            };
            let args = TextBuilder::new().with_cuneiform_options(options).cuneiform_args();
            assert_eq!(args.contains(&"--dotmatrix".to_string()), options.dotmatrix);
            assert_eq!(args.contains(&"--fax".to_string()), options.fax);
            assert_eq!(
                args.contains(&"--singlecolumn".to_string()),
                options.singlecolumn
            );
        }
    }

    #[test]
    fn test_text_builder_read_write() {
        let builder = TextBuilder::new();
        let txt = "first line\nsecond line\n0123456789\n🖨  ";
        assert_eq!(builder.read_file(txt).unwrap(), txt.trim());

        let mut out = Vec::new();
        builder.write_file(&mut out, &txt.to_string()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), txt);
    }

    #[test]
    fn test_text_builder_add_word_without_line() {
        let mut builder = TextBuilder::new();
        let err = builder
            .add_word("word", BBox::new(10, 11, 12, 13), 0)
            .unwrap_err();
        assert!(matches!(err, OcrError::NoOpenLine));
    }

    #[test]
    fn test_text_builder_output() {
        let mut builder = TextBuilder::new();
        let position = BBox::new(10, 11, 12, 13);
        builder.start_line(position);
        assert_eq!(builder.built_text(), &[String::new()]);
        builder.add_word("word1", position, 0).unwrap();
        builder.add_word("word2", position, 0).unwrap();
        builder.end_line();
        builder.start_line(position);
        builder.add_word("word3", position, 0).unwrap();
        builder.add_word("word4", position, 0).unwrap();
        assert_eq!(builder.get_output(), "word1 word2\nword3 word4");
    }

    #[test]
    fn test_word_box_builder_flags_follow_version() {
        let builder = WordBoxBuilder::new();
        assert_eq!(builder.tesseract_flags(V3), vec!["-psm", "1"]);
        assert_eq!(builder.tesseract_flags(V4), vec!["--psm", "1"]);
        assert_eq!(builder.file_extensions(), &["html", "hocr"]);
        assert_eq!(builder.tesseract_configs(), &["hocr"]);
        assert_eq!(builder.cuneiform_args(), vec!["-f", "hocr"]);
        assert!(builder.word_boxes().is_empty());
        assert_eq!(builder.to_string(), "Word boxes");
    }

    #[test]
    fn test_word_box_builder_empty_file() {
        assert!(WordBoxBuilder::new().read_file("").unwrap().is_empty());
    }

    #[test]
    fn test_word_box_builder_write_file() {
        let boxes = sample_boxes();
        let mut out = Vec::new();
        WordBoxBuilder::new().write_file(&mut out, &boxes).unwrap();
        let out = String::from_utf8(out).unwrap();
        for b in &boxes {
            assert!(out.contains(&b.content));
            assert!(out.contains(&b.position.to_string()));
            assert!(out.contains(&b.confidence.to_string()));
        }
        assert_eq!(WordBoxBuilder::new().read_file(&out).unwrap(), boxes);
    }

    #[test]
    fn test_word_box_builder_output() {
        let mut builder = WordBoxBuilder::new();
        let boxes = sample_boxes();
        builder.start_line(BBox::new(1, 2, 3, 4));
        assert!(builder.word_boxes().is_empty());
        for b in &boxes {
            builder.add_word(&b.content, b.position, b.confidence).unwrap();
        }
        builder.end_line();
        assert_eq!(builder.get_output(), boxes);
    }

    #[test]
    fn test_line_box_builder_init() {
        let builder = LineBoxBuilder::new();
        assert_eq!(builder.tesseract_flags(V3), vec!["-psm", "1"]);
        assert_eq!(builder.tesseract_flags(V4), vec!["--psm", "1"]);
        assert_eq!(builder.tesseract_configs(), &["hocr"]);
        assert!(builder.lines().is_empty());
        assert_eq!(builder.to_string(), "Line boxes");
    }

    #[test]
    fn test_line_box_builder_start_line_twice() {
        let mut builder = LineBoxBuilder::new();
        let position = BBox::new(1, 2, 3, 4);
        builder.start_line(position);
        builder.start_line(BBox::new(5, 6, 7, 8));
        assert_eq!(builder.lines(), &[LineBox::new(Vec::new(), position)]);
    }

    #[test]
    fn test_line_box_builder_add_word_without_line() {
        let mut builder = LineBoxBuilder::new();
        let err = builder.add_word("word", BBox::new(1, 2, 3, 4), 42).unwrap_err();
        assert!(matches!(err, OcrError::NoOpenLine));
        assert!(builder.lines().is_empty());
    }

    #[test]
    fn test_line_box_builder_output() {
        let lines = sample_lines();
        let mut builder = LineBoxBuilder::new();
        for line in &lines {
            builder.start_line(line.position);
            for word in &line.word_boxes {
                builder
                    .add_word(&word.content, word.position, word.confidence)
                    .unwrap();
            }
            builder.end_line();
        }
        assert_eq!(builder.get_output(), lines);
    }

    #[test]
    fn test_line_box_builder_write_file() {
        let lines = sample_lines();
        let builder = LineBoxBuilder::new();
        let mut out = Vec::new();
        builder.write_file(&mut out, &lines).unwrap();
        let out = String::from_utf8(out).unwrap();
        for word in lines.iter().flat_map(|l| &l.word_boxes) {
            assert!(out.contains(&word.content));
            assert!(out.contains(&word.position.to_string()));
        }
        assert_eq!(builder.read_file(&out).unwrap(), lines);
    }

    #[test]
    fn test_digit_builders() {
        let digits = DigitBuilder::new();
        assert!(digits.tesseract_configs().contains(&"digits"));
        assert_eq!(digits.to_string(), "Digits raw text");

        let digit_lines = DigitLineBoxBuilder::new();
        assert!(digit_lines.tesseract_configs().contains(&"digits"));
        assert!(digit_lines.tesseract_configs().contains(&"hocr"));
        assert_eq!(digit_lines.to_string(), "Digit line boxes");
    }

    #[test]
    fn test_char_box_builder_init() {
        let builder = CharBoxBuilder::new();
        assert_eq!(builder.file_extensions(), &["box"]);
        assert!(builder.tesseract_flags(V4).is_empty());
        assert_eq!(builder.tesseract_configs(), &["batch.nochop", "makebox"]);
        assert!(builder.cuneiform_args().is_empty());
        assert_eq!(builder.tesseract_layout(), PageSegMode::AutoOsd);
        assert_eq!(builder.to_string(), "Character boxes");
    }

    #[test]
    fn test_char_box_builder_read_file() {
        let content = "T 10 20 30 40 0\n\nh 31 20 40 40 0\n# 1 2\n  \ne 41 20 50 x 0\n";
        let boxes = CharBoxBuilder::new().read_file(content).unwrap();
        assert_eq!(
            boxes,
            vec![
                TextBox::new("T", BBox::new(10, 20, 30, 40)),
                TextBox::new("h", BBox::new(31, 20, 40, 40)),
            ]
        );
        assert!(CharBoxBuilder::new().read_file("").unwrap().is_empty());
    }

    #[test]
    fn test_char_box_builder_write_file() {
        let boxes = vec![
            TextBox::with_confidence("a", BBox::new(10, 11, 12, 13), 95),
            TextBox::new("\u{e9}", BBox::new(14, 15, 16, 17)),
        ];
        let mut out = Vec::new();
        CharBoxBuilder::new().write_file(&mut out, &boxes).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "a 10 11 12 13 0\n\u{e9} 14 15 16 17 0\n"
        );
    }
}
