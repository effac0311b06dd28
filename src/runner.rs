//! Spawning engine processes.

use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use tracing::debug;

/// Which streams end up in [`Completed::output`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capture {
    /// stdout only; stderr goes wherever ours goes
    Stdout,
    /// stdout followed by stderr
    Merged,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub stdin: Option<Vec<u8>>,
    pub capture: Capture,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            stdin: None,
            capture: Capture::Merged,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn stdin(mut self, data: Vec<u8>) -> Self {
        self.stdin = Some(data);
        self
    }

    pub fn capture(mut self, capture: Capture) -> Self {
        self.capture = capture;
        self
    }

    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Completed {
    /// Exit code, -1 when killed by a signal
    pub status: i32,
    pub output: Vec<u8>,
}

impl Completed {
    pub fn output_lossy(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

pub trait Runner: Send + Sync {
    fn run(&self, invocation: &Invocation) -> io::Result<Completed>;

    /// Whether `program` can be found, either as a path or on `PATH`.
    fn which(&self, program: &Path) -> bool;
}

/// Runs real processes.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<Completed> {
        debug!(argv = ?invocation.argv(), cwd = ?invocation.cwd, "running");

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args).stdout(Stdio::piped());
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }
        command.stdin(if invocation.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        command.stderr(match invocation.capture {
            Capture::Stdout => Stdio::inherit(),
            Capture::Merged => Stdio::piped(),
        });

        let mut child = command.spawn()?;
        // feed stdin from another thread so a chatty child cannot block on a full stdout
        let feeder = match (child.stdin.take(), invocation.stdin.clone()) {
            (Some(mut stdin), Some(data)) => Some(thread::spawn(move || stdin.write_all(&data))),
            _ => None,
        };
        let output = child.wait_with_output()?;
        if let Some(feeder) = feeder {
            match feeder.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
                    debug!("process closed stdin early");
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => return Err(io::Error::other("stdin writer panicked")),
            }
        }

        let mut merged = output.stdout;
        merged.extend_from_slice(&output.stderr);
        let status = output.status.code().unwrap_or(-1);
        debug!(status, bytes = merged.len(), "process exited");

        Ok(Completed {
            status,
            output: merged,
        })
    }

    fn which(&self, program: &Path) -> bool {
        if program.components().count() > 1 {
            return program.is_file();
        }
        let Some(paths) = env::var_os("PATH") else {
            return false;
        };
        env::split_paths(&paths).any(|dir| {
            let candidate = dir.join(program);
            candidate.is_file() || (cfg!(windows) && candidate.with_extension("exe").is_file())
        })
    }
}
