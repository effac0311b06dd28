use tessera::{
    BBox, Builder, CharBoxBuilder, DigitLineBoxBuilder, LineBox, LineBoxBuilder, TextBox,
    TextBuilder, WordBoxBuilder,
};

const TESSERACT_HOCR: &str = include_str!("data/tesseract.hocr");
const CUNEIFORM_HOCR: &str = include_str!("data/cuneiform.hocr");
const DIGITS_HOCR: &str = include_str!("data/digits.hocr");

#[test]
fn test_text_file_is_trimmed() {
    let text = include_str!("data/text.txt");
    let read = TextBuilder::new().read_file(text).unwrap();
    assert!(read.starts_with("This is a lot of 12 point text"));
    assert!(read.ends_with("over the lazy fox."));
}

#[test]
fn test_tesseract_words() {
    let words = WordBoxBuilder::new().read_file(TESSERACT_HOCR).unwrap();
    assert_eq!(words.len(), 24);
    assert_eq!(
        words[0],
        TextBox::with_confidence("This", BBox::new(36, 92, 96, 116), 96)
    );
    // markup inside a word is part of its text
    assert!(words.iter().any(|w| w.content == "works"));
    assert_eq!(words.last().map(|w| w.content.as_str()), Some("format."));
    assert!(words.iter().all(|w| !w.content.trim().is_empty()));
}

#[test]
fn test_tesseract_lines() {
    let lines = LineBoxBuilder::new().read_file(TESSERACT_HOCR).unwrap();
    let contents: Vec<String> = lines.iter().map(LineBox::content).collect();
    assert_eq!(
        contents,
        vec![
            "This is a lot of 12 point text to test the",
            "ocr code and see if it works on all types",
            "of file format.",
        ]
    );
    assert_eq!(lines[0].position, BBox::new(36, 92, 580, 122));
}

#[test]
fn test_cuneiform_lines() {
    let lines = LineBoxBuilder::new().read_file(CUNEIFORM_HOCR).unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].content(), "The ox is");
    assert_eq!(lines[0].position, BBox::new(10, 10, 190, 40));
    assert_eq!(
        lines[0].word_boxes[1],
        TextBox::new("ox", BBox::new(90, 10, 130, 40))
    );
    assert_eq!(lines[1].content(), "lazy.");
    assert_eq!(lines[1].position, BBox::new(10, 60, 110, 90));
}

#[test]
fn test_cuneiform_words() {
    let words = WordBoxBuilder::new().read_file(CUNEIFORM_HOCR).unwrap();
    let contents: Vec<&str> = words.iter().map(|w| w.content.as_str()).collect();
    assert_eq!(contents, vec!["The", "ox", "is", "lazy."]);
    assert_eq!(words[2].position, BBox::new(150, 12, 190, 40));
}

#[test]
fn test_digit_lines() {
    let lines = DigitLineBoxBuilder::new().read_file(DIGITS_HOCR).unwrap();
    assert_eq!(lines.len(), 2);
    for line in &lines {
        assert!(line
            .content()
            .split(' ')
            .all(|w| w.chars().all(|c| c.is_ascii_digit())));
    }
    assert_eq!(lines[1].word_boxes[1].confidence, 90);
}

#[test]
fn test_lines_written_then_read() {
    let builder = LineBoxBuilder::new();
    let lines = builder.read_file(TESSERACT_HOCR).unwrap();
    let mut out = Vec::new();
    builder.write_file(&mut out, &lines).unwrap();
    let written = String::from_utf8(out).unwrap();
    assert!(written.contains("ocr_line"));
    assert_eq!(builder.read_file(&written).unwrap(), lines);
}

#[test]
fn test_char_boxes() {
    let builder = CharBoxBuilder::new();
    let boxes = builder.read_file(include_str!("data/boxes.box")).unwrap();
    let chars: String = boxes.iter().map(|b| b.content.as_str()).collect();
    assert_eq!(chars, "This\u{e9}");
    assert_eq!(boxes[0].position, BBox::new(36, 1534, 56, 1558));

    let mut out = Vec::new();
    builder.write_file(&mut out, &boxes).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        include_str!("data/boxes.box")
    );
}

#[test]
fn test_char_boxes_skip_blank_and_short_lines() {
    let builder = CharBoxBuilder::new();
    for fixture in [
        include_str!("data/boxes_empty_lines.box"),
        include_str!("data/boxes_short_lines.box"),
    ] {
        let boxes = builder.read_file(fixture).unwrap();
        let chars: Vec<&str> = boxes.iter().map(|b| b.content.as_str()).collect();
        assert_eq!(chars, vec!["T", "h", "i"]);
    }
}

#[test]
fn test_empty_input() {
    assert_eq!(TextBuilder::new().read_file("").unwrap(), "");
    assert!(WordBoxBuilder::new().read_file("").unwrap().is_empty());
    assert!(LineBoxBuilder::new().read_file("").unwrap().is_empty());
    assert!(CharBoxBuilder::new().read_file("").unwrap().is_empty());
}
