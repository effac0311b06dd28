use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde::Serialize;
use tessera::{
    get_available_tools, Builder, CharBoxBuilder, Cuneiform, CuneiformOptions, DigitBuilder,
    DigitLineBoxBuilder, LineBox, LineBoxBuilder, OcrTool, PageSegMode, Tesseract, TextBox,
    TextBuilder, Tool, WordBoxBuilder,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "Tessera - run Tesseract or Cuneiform on an image", long_about = None)]
struct Cli {
    /// Input image path
    #[arg(required_unless_present_any = ["list_tools", "list_langs"])]
    image: Option<PathBuf>,

    /// OCR engine to use
    #[arg(short, long, value_enum, default_value_t = ToolChoice::Auto)]
    tool: ToolChoice,

    /// Language(s), e.g. `eng` or `eng+fra`
    #[arg(short, long)]
    lang: Option<String>,

    /// What to extract
    #[arg(short, long, value_enum, default_value_t = BuilderChoice::Text)]
    builder: BuilderChoice,

    /// Tesseract page segmentation mode (0-13)
    #[arg(long, value_parser = parse_psm)]
    psm: Option<PageSegMode>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Cuneiform: dot-matrix printer font
    #[arg(long)]
    dotmatrix: bool,

    /// Cuneiform: fax-quality image
    #[arg(long)]
    fax: bool,

    /// Cuneiform: one column of text
    #[arg(long)]
    singlecolumn: bool,

    /// Print the available engines and exit
    #[arg(long)]
    list_tools: bool,

    /// Print the languages of the selected engine and exit
    #[arg(long)]
    list_langs: bool,

    /// Detect the page orientation instead of the text
    #[arg(long)]
    detect_orientation: bool,

    /// Write a searchable PDF to BASE.pdf (Tesseract C API)
    #[arg(long, value_name = "BASE")]
    pdf: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ToolChoice {
    /// First available engine
    Auto,
    Tesseract,
    Cuneiform,
    Libtesseract,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum BuilderChoice {
    Text,
    Words,
    Lines,
    Chars,
    Digits,
    DigitLines,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// JSON
    Json,
    /// Human-readable text
    Text,
    /// The format the engine itself uses: plain text, hOCR or box file
    Native,
}

fn parse_psm(value: &str) -> Result<PageSegMode, String> {
    let number: u32 = value.parse().map_err(|_| format!("not a number: {value}"))?;
    PageSegMode::try_from(number).map_err(|n| format!("no page segmentation mode {n}"))
}

/// How a result reads in `--format text`.
trait PlainText {
    fn plain_text(&self) -> String;
}

impl PlainText for String {
    fn plain_text(&self) -> String {
        self.clone()
    }
}

impl PlainText for Vec<TextBox> {
    fn plain_text(&self) -> String {
        self.iter().map(|b| format!("{b}\n")).collect()
    }
}

impl PlainText for Vec<LineBox> {
    fn plain_text(&self) -> String {
        self.iter().map(|l| format!("{l}\n")).collect()
    }
}

fn select_tool(choice: ToolChoice) -> Result<Tool, Box<dyn std::error::Error>> {
    let tool = match choice {
        ToolChoice::Auto => get_available_tools()
            .into_iter()
            .next()
            .ok_or("no OCR tool found")?,
        ToolChoice::Tesseract => Tool::Tesseract(Tesseract::new()),
        ToolChoice::Cuneiform => Tool::Cuneiform(Cuneiform::new()),
        #[cfg(feature = "libtesseract")]
        ToolChoice::Libtesseract => Tool::LibTesseract(tessera::LibTesseract::default()),
        #[cfg(not(feature = "libtesseract"))]
        ToolChoice::Libtesseract => {
            return Err("tessera was built without the libtesseract feature".into())
        }
    };
    Ok(tool)
}

#[cfg(feature = "libtesseract")]
fn write_pdf(
    image: &image::DynamicImage,
    output_base: &Path,
    lang: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let tess = tessera::LibTesseract::default();
    let mut pdf = tess.pdf_builder().output_file(output_base).add_image(image);
    if let Some(lang) = lang {
        pdf = pdf.lang(lang);
    }
    println!("{}", pdf.build()?.display());
    Ok(())
}

#[cfg(not(feature = "libtesseract"))]
fn write_pdf(
    _image: &image::DynamicImage,
    _output_base: &Path,
    _lang: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    Err("PDF output needs the libtesseract feature".into())
}

fn emit<T: Serialize>(value: &T, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>>
where
    T: PlainText,
{
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        _ => print!("{}", value.plain_text()),
    }
    Ok(())
}

fn run<B>(
    tool: &Tool,
    image: &image::DynamicImage,
    cli: &Cli,
    builder: B,
) -> Result<(), Box<dyn std::error::Error>>
where
    B: Builder + Clone,
    B::Output: Serialize + PlainText,
{
    let output = tool.image_to_string(image, cli.lang.as_deref(), builder.clone())?;
    match cli.format {
        OutputFormat::Native => {
            let mut stdout = io::stdout().lock();
            builder.write_file(&mut stdout, &output)?;
            stdout.flush()?;
        }
        format => emit(&output, format)?,
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.list_tools {
        for tool in get_available_tools() {
            match tool.version() {
                Ok(version) => println!("{} {}", tool.name(), version),
                Err(_) => println!("{}", tool.name()),
            }
        }
        return Ok(());
    }

    let tool = select_tool(cli.tool)?;
    if cli.list_langs {
        for lang in tool.available_languages()? {
            println!("{lang}");
        }
        return Ok(());
    }

    let Some(path) = &cli.image else {
        return Err("no input image".into());
    };
    let image = tessera::open_image(path)?;

    if let Some(output_base) = &cli.pdf {
        return write_pdf(&image, output_base, cli.lang.as_deref());
    }

    if cli.detect_orientation {
        let orientation = tool.detect_orientation(&image, cli.lang.as_deref())?;
        match cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&orientation)?),
            _ => println!(
                "angle: {}\nconfidence: {:.2}",
                orientation.angle, orientation.confidence
            ),
        }
        return Ok(());
    }

    let cuneiform = CuneiformOptions {
        dotmatrix: cli.dotmatrix,
        fax: cli.fax,
        singlecolumn: cli.singlecolumn,
    };
    match (cli.builder, cli.psm) {
        (BuilderChoice::Text, psm) => run(
            &tool,
            &image,
            &cli,
            psm.map_or_else(TextBuilder::new, TextBuilder::with_layout)
                .with_cuneiform_options(cuneiform),
        ),
        (BuilderChoice::Digits, psm) => run(
            &tool,
            &image,
            &cli,
            psm.map_or_else(DigitBuilder::new, DigitBuilder::with_layout),
        ),
        (BuilderChoice::Words, psm) => run(
            &tool,
            &image,
            &cli,
            psm.map_or_else(WordBoxBuilder::new, WordBoxBuilder::with_layout),
        ),
        (BuilderChoice::Lines, psm) => run(
            &tool,
            &image,
            &cli,
            psm.map_or_else(LineBoxBuilder::new, LineBoxBuilder::with_layout),
        ),
        (BuilderChoice::DigitLines, psm) => run(
            &tool,
            &image,
            &cli,
            psm.map_or_else(DigitLineBoxBuilder::new, DigitLineBoxBuilder::with_layout),
        ),
        (BuilderChoice::Chars, _) => run(&tool, &image, &cli, CharBoxBuilder::new()),
    }
}
