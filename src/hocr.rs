//! hOCR reading and writing.
//!
//! Tesseract writes one element per word (`ocrx_word`, or `ocr_word` before
//! 3.03) nested in line elements, every element carrying a `title` such as
//! `bbox 36 92 96 116; x_wconf 90`. Cuneiform only marks lines and gives the
//! box of every character in an `ocr_cinfo` element (`x_bboxes x1 y1 x2 y2 ...`),
//! so words have to be rebuilt from the characters.

use std::io::{self, Write};

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::error::{OcrError, Result};
use crate::types::{BBox, LineBox, TextBox};

const WORD_SELECTOR: &str = ".ocrx_word, .ocr_word";
const LINE_SELECTOR: &str = ".ocr_line, .ocr_header, .ocr_caption, .ocr_textfloat";
const CHAR_INFO_SELECTOR: &str = ".ocr_cinfo";

/// Properties found in an hOCR `title` attribute.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TitleProps {
    pub bbox: Option<BBox>,
    pub x_wconf: Option<i32>,
    /// Raw per-character boxes; Cuneiform uses `-1` for spaces
    pub x_bboxes: Vec<[i64; 4]>,
}

/// Splits a `title` on `;` and picks out the properties we use. Unknown or
/// malformed properties are left as `None`.
pub fn parse_title(title: &str) -> TitleProps {
    let mut props = TitleProps::default();
    for piece in title.split(';') {
        let mut fields = piece.split_whitespace();
        match fields.next() {
            Some("bbox") => {
                let coords: Vec<u32> = fields.filter_map(|f| f.parse().ok()).collect();
                if coords.len() == 4 {
                    props.bbox = Some(BBox::new(coords[0], coords[1], coords[2], coords[3]));
                }
            }
            Some("x_wconf") => {
                props.x_wconf = fields
                    .next()
                    .and_then(|f| f.parse::<f32>().ok())
                    .map(|c| c.round() as i32);
            }
            Some("x_bboxes") => {
                let values: Vec<i64> = fields.filter_map(|f| f.parse().ok()).collect();
                props.x_bboxes = values
                    .chunks_exact(4)
                    .map(|c| [c[0], c[1], c[2], c[3]])
                    .collect();
            }
            _ => {}
        }
    }
    props
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| OcrError::Hocr(format!("bad selector {css:?}: {e}")))
}

fn title_of(element: &ElementRef<'_>) -> Option<TitleProps> {
    element.value().attr("title").map(parse_title)
}

/// Confidence of a word: its own `x_wconf`, or the first one found below it
/// (Tesseract 3.02 put it on an inner `xocr_word`).
fn word_confidence(element: &ElementRef<'_>) -> i32 {
    if let Some(conf) = title_of(element).and_then(|t| t.x_wconf) {
        return conf;
    }
    element
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter_map(|e| title_of(&e).and_then(|t| t.x_wconf))
        .next()
        .unwrap_or(0)
}

fn read_word(element: &ElementRef<'_>) -> Option<TextBox> {
    // Words without a bbox come from an older layout; skip them
    let position = title_of(element)?.bbox?;
    let content: String = element.text().collect();
    let content = content.trim();
    if content.is_empty() {
        return None;
    }
    Some(TextBox::with_confidence(
        content,
        position,
        word_confidence(element),
    ))
}

/// Every word of a Tesseract hOCR document, in document order.
pub fn parse_words(html: &str) -> Result<Vec<TextBox>> {
    let document = Html::parse_document(html);
    let words = selector(WORD_SELECTOR)?;
    Ok(document.select(&words).filter_map(|e| read_word(&e)).collect())
}

/// Every line of a Tesseract hOCR document with the words it contains.
///
/// Returns an empty list when the document has no word elements at all, which
/// is what Cuneiform output looks like; see [`parse_char_info_lines`].
pub fn parse_lines(html: &str) -> Result<Vec<LineBox>> {
    let document = Html::parse_document(html);
    let words = selector(WORD_SELECTOR)?;
    if document.select(&words).next().is_none() {
        return Ok(Vec::new());
    }

    let lines = selector(LINE_SELECTOR)?;
    let mut out = Vec::new();
    for line in document.select(&lines) {
        let title = line.value().attr("title").unwrap_or_default();
        let position = parse_title(title)
            .bbox
            .ok_or_else(|| OcrError::Hocr(format!("invalid line position: {title:?}")))?;
        let word_boxes = line.select(&words).filter_map(|e| read_word(&e)).collect();
        out.push(LineBox::new(word_boxes, position));
    }
    Ok(out)
}

/// Lines of a Cuneiform hOCR document, words rebuilt from character boxes.
pub fn parse_char_info_lines(html: &str) -> Result<Vec<LineBox>> {
    let document = Html::parse_document(html);
    let lines = selector(".ocr_line")?;
    let char_info = selector(CHAR_INFO_SELECTOR)?;

    let mut out = Vec::new();
    for line in document.select(&lines) {
        let mut positions: Vec<[i64; 4]> = title_of(&line).map(|t| t.x_bboxes).unwrap_or_default();
        for info in line.select(&char_info) {
            if let Some(title) = title_of(&info) {
                positions.extend(title.x_bboxes);
            }
        }
        if positions.is_empty() {
            continue;
        }

        let text: String = line.text().collect();
        let mut chars: Vec<char> = text.chars().collect();
        if chars.len() != positions.len() {
            chars = text.trim().chars().collect();
        }
        if chars.len() != positions.len() {
            warn!(
                chars = chars.len(),
                boxes = positions.len(),
                "hOCR line skipped: character boxes do not match its text"
            );
            continue;
        }

        match words_from_chars(&chars, &positions) {
            Some(words) if !words.is_empty() => {
                let position = words
                    .iter()
                    .skip(1)
                    .fold(words[0].position, |acc, w| acc.union(&w.position));
                out.push(LineBox::new(words, position));
            }
            Some(_) => {}
            None => warn!(text = %text, "hOCR line skipped: negative character box"),
        }
    }
    Ok(out)
}

fn words_from_chars(chars: &[char], positions: &[[i64; 4]]) -> Option<Vec<TextBox>> {
    let mut words = Vec::new();
    let mut current: Option<(String, BBox)> = None;

    for (c, raw) in chars.iter().zip(positions) {
        if c.is_whitespace() {
            if let Some((content, position)) = current.take() {
                words.push(TextBox::new(content, position));
            }
            continue;
        }
        let bbox = to_bbox(raw)?;
        current = Some(match current.take() {
            Some((mut content, position)) => {
                content.push(*c);
                (content, position.union(&bbox))
            }
            None => (c.to_string(), bbox),
        });
    }
    if let Some((content, position)) = current {
        words.push(TextBox::new(content, position));
    }
    Some(words)
}

fn to_bbox(raw: &[i64; 4]) -> Option<BBox> {
    let [x1, y1, x2, y2] = *raw;
    Some(BBox::new(
        u32::try_from(x1).ok()?,
        u32::try_from(y1).ok()?,
        u32::try_from(x2).ok()?,
        u32::try_from(y2).ok()?,
    ))
}

pub fn word_tag(word: &TextBox) -> String {
    format!(
        "<span class=\"ocrx_word\" title=\"bbox {}; x_wconf {}\">{}</span>",
        word.position,
        word.confidence,
        html_escape::encode_safe(&word.content)
    )
}

pub fn line_tag(line: &LineBox) -> String {
    let words: Vec<String> = line.word_boxes.iter().map(word_tag).collect();
    format!(
        "<span class=\"ocr_line\" title=\"bbox {}\">{}</span>",
        line.position,
        words.join(" ")
    )
}

const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="en" lang="en">
 <head>
  <title>OCR output</title>
  <meta http-equiv="Content-Type" content="text/html;charset=utf-8" />
  <meta name="ocr-system" content="tessera" />
  <meta name="ocr-capabilities" content="ocr_line ocrx_word" />
 </head>
 <body>
"#;

const FOOTER: &str = " </body>\n</html>\n";

/// Writes a complete hOCR document whose body holds one element per line.
pub fn write_document<W, I>(out: &mut W, elements: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = String>,
{
    out.write_all(HEADER.as_bytes())?;
    for element in elements {
        writeln!(out, "  {element}")?;
    }
    out.write_all(FOOTER.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TESSERACT_HOCR: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html><body>
<div class='ocr_page' id='page_1' title='image "input.bmp"; bbox 0 0 640 480; ppageno 0'>
 <div class='ocr_carea' id='block_1_1' title="bbox 36 92 580 212">
  <p class='ocr_par' id='par_1_1' lang='eng' title="bbox 36 92 580 212">
   <span class='ocr_line' id='line_1_1' title="bbox 36 92 580 116; baseline 0 -6; x_size 24">
    <span class='ocrx_word' id='word_1_1' title='bbox 36 92 96 116; x_wconf 90'>This</span>
    <span class='ocrx_word' id='word_1_2' title='bbox 109 92 129 116; x_wconf 91'><strong>is</strong></span>
   </span>
   <span class='ocr_line' id='line_1_2' title="bbox 36 130 200 152">
    <span class='ocrx_word' id='word_1_3' title='bbox 36 130 60 152; x_wconf 87.6'>a</span>
    <span class='ocrx_word' id='word_1_4' title='bbox 70 130 200 152; x_wconf 80'> </span>
   </span>
  </p>
 </div>
</div>
</body></html>"#;

    const CUNEIFORM_HOCR: &str = r#"<html><body>
<div class='ocr_page' title='bbox 0 0 640 480'>
<p><span class='ocr_line' id='line_1' title="bbox 10 10 100 30"><span class='ocr_cinfo' title="x_bboxes 10 10 20 30 21 12 30 30 -1 -1 -1 -1 40 10 50 30">ab c</span></span></p>
<p><span class='ocr_line' id='line_2' title="bbox 10 40 100 60"><span class='ocr_cinfo' title="x_bboxes 10 40 20 60">xyz</span></span></p>
</div></body></html>"#;

    #[test]
    fn test_parse_title() {
        let props = parse_title("bbox 36 92 96 116; x_wconf 90");
        assert_eq!(props.bbox, Some(BBox::new(36, 92, 96, 116)));
        assert_eq!(props.x_wconf, Some(90));

        let props = parse_title("image \"x.png\"; bbox 0 0 10; ppageno 0");
        assert_eq!(props.bbox, None);
        assert_eq!(props.x_wconf, None);

        let props = parse_title("x_bboxes 1 2 3 4 5 6 7 8");
        assert_eq!(props.x_bboxes, vec![[1, 2, 3, 4], [5, 6, 7, 8]]);
    }

    #[test]
    fn test_parse_words() {
        let words = parse_words(TESSERACT_HOCR).unwrap();
        let contents: Vec<&str> = words.iter().map(|w| w.content.as_str()).collect();
        assert_eq!(contents, vec!["This", "is", "a"]);
        assert_eq!(words[0].position, BBox::new(36, 92, 96, 116));
        assert_eq!(words[0].confidence, 90);
        assert_eq!(words[2].confidence, 88);
    }

    #[test]
    fn test_parse_words_old_layout() {
        let html = r#"<html><body>
<span class='ocr_word' id='word_1' title="bbox 1 2 3 4"><span class='xocr_word' id='xword_1' title="x_wconf 70">Hello</span></span>
<span class='ocr_word' id='word_2' title="x_wconf 50">world</span>
</body></html>"#;
        let words = parse_words(html).unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].content, "Hello");
        assert_eq!(words[0].confidence, 70);
    }

    #[test]
    fn test_parse_lines() {
        let lines = parse_lines(TESSERACT_HOCR).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].position, BBox::new(36, 92, 580, 116));
        assert_eq!(lines[0].content(), "This is");
        assert_eq!(lines[1].content(), "a");
    }

    #[test]
    fn test_parse_lines_without_words_is_empty() {
        assert!(parse_lines(CUNEIFORM_HOCR).unwrap().is_empty());
        assert!(parse_lines("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_char_info_lines() {
        let lines = parse_char_info_lines(CUNEIFORM_HOCR).unwrap();
        // second line has 3 characters but a single box
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line.content(), "ab c");
        assert_eq!(line.word_boxes[0].position, BBox::new(10, 10, 30, 30));
        assert_eq!(line.word_boxes[1].position, BBox::new(40, 10, 50, 30));
        assert_eq!(line.position, BBox::new(10, 10, 50, 30));
    }

    #[test]
    fn test_written_document_reads_back() {
        let lines = vec![LineBox::new(
            vec![
                TextBox::with_confidence("fish & <chips>", BBox::new(1, 2, 3, 4), 95),
                TextBox::with_confidence("l'eau", BBox::new(5, 2, 9, 4), 12),
            ],
            BBox::new(1, 2, 9, 4),
        )];
        let mut out = Vec::new();
        write_document(&mut out, lines.iter().map(line_tag)).unwrap();
        let html = String::from_utf8(out).unwrap();
        assert!(html.contains("fish &amp; &lt;chips&gt;"));
        assert_eq!(parse_lines(&html).unwrap(), lines);
    }

    #[test]
    fn test_word_tag_escapes_markup() {
        let word = TextBox::with_confidence("\"a/b\" <i>", BBox::new(0, 0, 8, 8), 70);
        let tag = word_tag(&word);
        assert!(!tag.contains("<i>"));
        assert!(tag.contains("&quot;"));
        assert_eq!(parse_words(&tag).unwrap(), vec![word]);
    }
}
