//! Cuneiform through its command-line program.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use image::DynamicImage;
use tracing::debug;

use crate::builders::{Builder, BuilderKind};
use crate::error::{OcrError, Result};
use crate::image_io;
use crate::runner::{Invocation, Runner, SystemRunner};
use crate::types::{Orientation, Version};

pub const NAME: &str = "Cuneiform (sh)";

pub const BUILDERS: &[BuilderKind] = &[
    BuilderKind::Text,
    BuilderKind::WordBoxes,
    BuilderKind::LineBoxes,
];

const VERSION_PREFIX: &str = "Cuneiform for ";
const LANGUAGES_PREFIX: &str = "Supported languages:";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CuneiformConfig {
    pub command: PathBuf,
}

impl Default for CuneiformConfig {
    fn default() -> Self {
        Self {
            command: PathBuf::from("cuneiform"),
        }
    }
}

impl CuneiformConfig {
    /// Default configuration, with the command taken from `CUNEIFORM_CMD` if set.
    pub fn from_env() -> Self {
        match env::var_os("CUNEIFORM_CMD") {
            Some(cmd) if !cmd.is_empty() => Self {
                command: PathBuf::from(cmd),
            },
            _ => Self::default(),
        }
    }
}

pub struct Cuneiform<R = SystemRunner> {
    config: CuneiformConfig,
    runner: R,
    version: OnceLock<Version>,
}

impl Default for Cuneiform {
    fn default() -> Self {
        Self::new()
    }
}

impl Cuneiform {
    pub fn new() -> Self {
        Self::with_config(CuneiformConfig::from_env())
    }

    pub fn with_config(config: CuneiformConfig) -> Self {
        Self::with_runner(config, SystemRunner)
    }
}

impl<R: Runner> Cuneiform<R> {
    pub fn with_runner(config: CuneiformConfig, runner: R) -> Self {
        Self {
            config,
            runner,
            version: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &CuneiformConfig {
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

    pub fn can_detect_orientation(&self) -> bool {
        false
    }

    pub fn detect_orientation(
        &self,
        _image: &DynamicImage,
        _lang: Option<&str>,
    ) -> Result<Orientation> {
        Err(OcrError::OrientationUnsupported(NAME))
    }

    fn invocation(&self) -> Invocation {
        Invocation::new(&self.config.command)
    }

    /// Version printed in the usage banner, asked once and then remembered.
    pub fn version(&self) -> Result<Version> {
        if let Some(version) = self.version.get() {
            return Ok(*version);
        }
        let done = self.runner.run(&self.invocation())?;
        let output = done.output_lossy();
        let version = parse_banner_version(&output)
            .ok_or_else(|| OcrError::Version(format!("no Cuneiform version in {output:?}")))?;
        debug!(%version, "cuneiform version");
        Ok(*self.version.get_or_init(|| version))
    }

    pub fn available_languages(&self) -> Result<Vec<String>> {
        let done = self.runner.run(&self.invocation().arg("-l"))?;
        let output = done.output_lossy();
        parse_language_list(&output).ok_or_else(|| OcrError::Cuneiform {
            status: done.status,
            message: output,
        })
    }

    pub fn image_to_string<B: Builder>(
        &self,
        image: &DynamicImage,
        lang: Option<&str>,
        builder: B,
    ) -> Result<B::Output> {
        let kind = builder.kind();
        if !BUILDERS.contains(&kind) {
            return Err(OcrError::Unsupported {
                tool: NAME,
                builder: kind,
            });
        }

        let output_file = tempfile::Builder::new()
            .prefix("cuneiform_")
            .suffix(".txt")
            .tempfile()?;

        let mut invocation = self.invocation();
        if let Some(lang) = lang {
            invocation = invocation.args(["-l", lang]);
        }
        invocation = invocation
            .args(builder.cuneiform_args())
            .arg("-o")
            .arg(output_file.path().to_string_lossy())
            .arg("-")
            .stdin(image_io::encode_bmp(image)?);

        let done = self.runner.run(&invocation)?;
        if done.status != 0 {
            return Err(OcrError::Cuneiform {
                status: done.status,
                message: done.output_lossy(),
            });
        }

        let bytes = fs::read(output_file.path())?;
        builder.read_file(&String::from_utf8_lossy(&bytes))
    }
}

/// `Cuneiform for Linux 1.1.0` on the first line of the usage banner.
fn parse_banner_version(output: &str) -> Option<Version> {
    let line = output.lines().find(|l| l.starts_with(VERSION_PREFIX))?;
    let token = line.split_whitespace().last()?;
    Version::parse_lenient(token).ok()
}

fn parse_language_list(output: &str) -> Option<Vec<String>> {
    let start = output.find(LANGUAGES_PREFIX)? + LANGUAGES_PREFIX.len();
    let list = output[start..].lines().next().unwrap_or_default();
    Some(
        list.trim()
            .trim_end_matches('.')
            .split_whitespace()
            .map(str::to_string)
            .collect(),
    )
}
