//! Scripted [`Runner`] for unit tests.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use image::{DynamicImage, RgbImage};

use crate::runner::{Completed, Invocation, Runner};

#[derive(Clone, Debug, Default)]
pub(crate) struct FakeResponse {
    status: i32,
    output: Vec<u8>,
    /// written relative to the invocation's cwd
    files: Vec<(String, String)>,
    /// written to the path following `-o`
    o_file: Option<String>,
}

impl FakeResponse {
    pub(crate) fn ok(output: impl AsRef<[u8]>) -> Self {
        Self::status(0, output)
    }

    pub(crate) fn status(status: i32, output: impl AsRef<[u8]>) -> Self {
        Self {
            status,
            output: output.as_ref().to_vec(),
            ..Self::default()
        }
    }

    pub(crate) fn with_file(mut self, name: &str, content: &str) -> Self {
        self.files.push((name.to_string(), content.to_string()));
        self
    }

    pub(crate) fn with_o_file(mut self, content: &str) -> Self {
        self.o_file = Some(content.to_string());
        self
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeRunner {
    responses: Mutex<VecDeque<FakeResponse>>,
    calls: Mutex<Vec<Invocation>>,
    cwd_listings: Mutex<Vec<Vec<String>>>,
    on_path: Vec<PathBuf>,
}

impl FakeRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, response: FakeResponse) -> Self {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(response);
        self
    }

    pub(crate) fn with_program(mut self, program: &str) -> Self {
        self.on_path.push(PathBuf::from(program));
        self
    }

    pub(crate) fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub(crate) fn argvs(&self) -> Vec<Vec<String>> {
        self.calls().iter().map(Invocation::argv).collect()
    }

    /// Files present in the cwd of each call, at the time it ran.
    pub(crate) fn cwd_listings(&self) -> Vec<Vec<String>> {
        self.cwd_listings.lock().expect("listing lock").clone()
    }
}

fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

impl Runner for FakeRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<Completed> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(invocation.clone());
        let listing = invocation.cwd.as_deref().map(list_dir).unwrap_or_default();
        self.cwd_listings.lock().expect("listing lock").push(listing);

        let response = self
            .responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_default();

        if let Some(cwd) = &invocation.cwd {
            for (name, content) in &response.files {
                fs::write(cwd.join(name), content)?;
            }
        }
        if let Some(content) = &response.o_file {
            let target = invocation
                .args
                .iter()
                .position(|a| a == "-o")
                .and_then(|i| invocation.args.get(i + 1))
                .expect("invocation has -o");
            fs::write(target, content)?;
        }

        Ok(Completed {
            status: response.status,
            output: response.output,
        })
    }

    fn which(&self, program: &Path) -> bool {
        self.on_path.iter().any(|p| p == program)
    }
}

pub(crate) fn tiny_image() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::new(1, 1))
}

pub(crate) fn tiny_gray_image() -> DynamicImage {
    DynamicImage::ImageLuma8(image::GrayImage::new(1, 1))
}
