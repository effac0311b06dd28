//! Tesseract through its command-line program.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use image::DynamicImage;
use tracing::debug;

use crate::builders::{Builder, BuilderKind};
use crate::error::{OcrError, Result};
use crate::image_io;
use crate::runner::{Capture, Invocation, Runner, SystemRunner};
use crate::types::{Orientation, Version, VersionParseError};

pub const NAME: &str = "Tesseract (sh)";

pub const BUILDERS: &[BuilderKind] = &[
    BuilderKind::LineBoxes,
    BuilderKind::Text,
    BuilderKind::WordBoxes,
    BuilderKind::CharBoxes,
    BuilderKind::Digits,
    BuilderKind::DigitLineBoxes,
];

const INPUT_FILE: &str = "input.bmp";
const OUTPUT_BASE: &str = "output";

/// Orientation and script detection needs 3.3
const OSD_VERSION: Version = Version::new(3, 3, 0);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TesseractConfig {
    /// Program to run, looked up on `PATH` when it is a bare name
    pub command: PathBuf,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            command: PathBuf::from("tesseract"),
        }
    }
}

impl TesseractConfig {
    /// Default configuration, with the command taken from `TESSERACT_CMD` if set.
    pub fn from_env() -> Self {
        match env::var_os("TESSERACT_CMD") {
            Some(cmd) if !cmd.is_empty() => Self {
                command: PathBuf::from(cmd),
            },
            _ => Self::default(),
        }
    }
}

/// Name of the page segmentation flag, which lost its single dash in 4.0.
pub fn psm_parameter(version: Version) -> &'static str {
    if version < Version::new(4, 0, 0) {
        "-psm"
    } else {
        "--psm"
    }
}

pub struct Tesseract<R = SystemRunner> {
    config: TesseractConfig,
    runner: R,
    version: OnceLock<Version>,
}

impl Default for Tesseract {
    fn default() -> Self {
        Self::new()
    }
}

impl Tesseract {
    pub fn new() -> Self {
        Self::with_config(TesseractConfig::from_env())
    }

    pub fn with_config(config: TesseractConfig) -> Self {
        Self::with_runner(config, SystemRunner)
    }
}

impl<R: Runner> Tesseract<R> {
    pub fn with_runner(config: TesseractConfig, runner: R) -> Self {
        Self {
            config,
            runner,
            version: OnceLock::new(),
        }
    }

    /// Skips asking the program for its version.
    pub fn with_known_version(self, version: Version) -> Self {
        let _ = self.version.set(version);
        self
    }

    pub fn config(&self) -> &TesseractConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn name(&self) -> &'static str {
        NAME
    }

    pub fn is_available(&self) -> bool {
        self.runner.which(&self.config.command)
    }

    pub fn available_builders(&self) -> &'static [BuilderKind] {
        BUILDERS
    }

    fn invocation(&self) -> Invocation {
        Invocation::new(&self.config.command)
    }

    /// Version of the program, asked once and then remembered.
    pub fn version(&self) -> Result<Version> {
        if let Some(version) = self.version.get() {
            return Ok(*version);
        }

        // stderr is left alone: some builds print library warnings there
        let done = self
            .runner
            .run(&self.invocation().arg("-v").capture(Capture::Stdout))?;
        let output = done.output_lossy();
        // 3.x exits with 1 after printing its version
        if done.status != 0 && done.status != 1 {
            return Err(OcrError::tesseract(done.status, output));
        }

        let version = parse_version_output(&output)?;
        debug!(%version, "tesseract version");
        Ok(*self.version.get_or_init(|| version))
    }

    pub fn psm_parameter(&self) -> Result<&'static str> {
        Ok(psm_parameter(self.version()?))
    }

    pub fn available_languages(&self) -> Result<Vec<String>> {
        let done = self.runner.run(&self.invocation().arg("--list-langs"))?;
        if done.status != 0 {
            return Err(OcrError::tesseract(done.status, "unable to get languages"));
        }
        Ok(parse_language_list(&done.output_lossy()))
    }

    pub fn can_detect_orientation(&self) -> bool {
        let Ok(version) = self.version() else {
            return false;
        };
        if version < OSD_VERSION {
            return false;
        }
        self.available_languages()
            .map(|langs| langs.iter().any(|l| l == "osd"))
            .unwrap_or(false)
    }

    pub fn detect_orientation(
        &self,
        image: &DynamicImage,
        lang: Option<&str>,
    ) -> Result<Orientation> {
        let version = self.version()?;
        let tmpdir = tempfile::Builder::new().prefix("tess_").tempdir()?;
        image_io::save_bmp(image, tmpdir.path().join(INPUT_FILE))?;

        let mut invocation = self
            .invocation()
            .args([INPUT_FILE, "stdout", psm_parameter(version), "0"]);
        if let Some(lang) = lang {
            // 4.x only accepts the dedicated osd data here
            let lang = if version.major >= 4 { "osd" } else { lang };
            invocation = invocation.args(["-l", lang]);
        }
        let done = self.runner.run(&invocation.cwd(tmpdir.path()))?;
        parse_orientation(done.output_lossy().trim())
    }

    /// Runs `tesseract <input> <output_base> [-l lang] <flags> <configs>`
    /// and returns its exit status and merged output.
    pub fn run_tesseract(
        &self,
        input: &str,
        output_base: &str,
        cwd: Option<&Path>,
        lang: Option<&str>,
        flags: &[String],
        configs: &[&str],
    ) -> Result<(i32, String)> {
        let mut invocation = self.invocation().args([input, output_base]);
        if let Some(lang) = lang {
            invocation = invocation.args(["-l", lang]);
        }
        invocation = invocation
            .args(flags.iter().cloned())
            .args(configs.iter().copied());
        if let Some(cwd) = cwd {
            invocation = invocation.cwd(cwd);
        }
        let done = self.runner.run(&invocation)?;
        Ok((done.status, done.output_lossy()))
    }

    pub fn image_to_string<B: Builder>(
        &self,
        image: &DynamicImage,
        lang: Option<&str>,
        builder: B,
    ) -> Result<B::Output> {
        let version = self.version()?;
        let tmpdir = tempfile::Builder::new().prefix("tess_").tempdir()?;
        image_io::save_bmp(image, tmpdir.path().join(INPUT_FILE))?;

        let (status, output) = self.run_tesseract(
            INPUT_FILE,
            OUTPUT_BASE,
            Some(tmpdir.path()),
            lang,
            &builder.tesseract_flags(version),
            builder.tesseract_configs(),
        )?;
        if status != 0 {
            return Err(OcrError::tesseract(status, output));
        }

        let mut tested = Vec::new();
        for ext in builder.file_extensions() {
            let name = format!("{OUTPUT_BASE}.{ext}");
            let path = tmpdir.path().join(&name);
            tested.push(name);
            match fs::read(&path) {
                Ok(bytes) => return builder.read_file(&String::from_utf8_lossy(&bytes)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(OcrError::tesseract(
            -1,
            format!("Unable to find output file (tested {tested:?})"),
        ))
    }
}

fn parse_version_output(output: &str) -> Result<Version> {
    let first_line = output.lines().next().unwrap_or_default();
    let Some(token) = first_line.split_whitespace().nth(1) else {
        return Err(OcrError::tesseract(
            0,
            format!("Unable to parse Tesseract version (splitting failed): {output}"),
        ));
    };
    Version::parse_lenient(token).map_err(|e| {
        let reason = match e {
            VersionParseError::Split => "splitting failed",
            VersionParseError::NotANumber => "not a number",
        };
        OcrError::tesseract(
            0,
            format!("Unable to parse Tesseract version ({reason}): {output}"),
        )
    })
}

fn parse_language_list(output: &str) -> Vec<String> {
    let lines: Vec<&str> = output.lines().collect();
    let start = lines
        .iter()
        .position(|l| l.starts_with("List of available languages"))
        .map_or(1, |i| i + 1);
    lines
        .iter()
        .skip(start)
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_orientation(output: &str) -> Result<Orientation> {
    if output.contains("Could not initialize tesseract") {
        return Err(OcrError::tesseract(
            -1,
            format!("Error initializing tesseract: {output}"),
        ));
    }

    let fields: HashMap<&str, &str> = output
        .lines()
        .filter_map(|line| line.split_once(": "))
        .map(|(k, v)| (k.trim(), v.trim()))
        .collect();

    let angle = fields
        .get("Orientation in degrees")
        .and_then(|v| v.parse::<i32>().ok());
    let confidence = fields
        .get("Orientation confidence")
        .and_then(|v| v.parse::<f32>().ok());
    match (angle, confidence) {
        (Some(angle), Some(confidence)) => Ok(Orientation { angle, confidence }),
        _ => Err(OcrError::tesseract(
            -1,
            format!("No script found in image ({output})"),
        )),
    }
}
