//! Pid-file persistence.
//!
//! A pid file is a single decimal process id plus a trailing newline.
//! Writes go through a hidden temporary in the same directory followed by a
//! `rename`, so a concurrent reader (including external tooling) can never
//! observe a partially written value.

use std::fs;
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Directory pid files default into.
const RUN_DIR: &str = "/var/run";

/// Location and contents of a process's pid file.
///
/// The path defaults to `/var/run/<program>.pid` and can be overridden with
/// [`set_path`](Self::set_path). Reading is advisory; writing is atomic.
pub struct PidFile {
    program: String,
    path: Option<PathBuf>,
}

impl PidFile {
    /// Creates a store for the given program name.
    ///
    /// The name is only used to compute the default path, so it should be a
    /// bare basename like `"myd"`.
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        assert!(!program.is_empty(), "program name must not be empty");

        Self {
            program,
            path: None,
        }
    }

    /// Creates a store named after the program in `argv[0]`.
    pub fn for_argv0(argv0: &str) -> Self {
        Self::new(program_name(argv0))
    }

    /// Returns the configured or computed path, always absolute.
    ///
    /// The default is computed lazily and cached until the next
    /// [`set_path`](Self::set_path).
    pub fn path(&mut self) -> &Path {
        let program = &self.program;
        self.path
            .get_or_insert_with(|| PathBuf::from(format!("{RUN_DIR}/{program}.pid")))
    }

    /// Overrides the pid file location, or restores the default with `None`.
    ///
    /// # Panics
    /// Panics if the override is not an absolute path.
    pub fn set_path(&mut self, path: Option<PathBuf>) {
        if let Some(path) = &path {
            assert!(path.is_absolute(), "pid file path must be absolute");
        }
        self.path = path;
    }

    /// Reads the stored pid, if one is available.
    ///
    /// This is advisory ("is an old instance still running?"): a missing
    /// file or unparsable content is `None`, never an error.
    pub fn read(&mut self) -> Option<libc::pid_t> {
        let content = fs::read_to_string(self.path()).ok()?;
        parse_leading_pid(&content)
    }

    /// Atomically publishes `pid` to the pid file.
    ///
    /// The value is written to a hidden temporary in the destination
    /// directory, flushed to durable storage, then renamed into place; the
    /// rename is the only step that makes the new content visible. On any
    /// failure the temporary is removed and the destination is untouched.
    ///
    /// # Panics
    /// Panics if `pid` is not positive.
    pub fn write(&mut self, pid: libc::pid_t) -> Result<()> {
        assert!(pid > 0, "pid written to a pid file must be positive");

        let path = self.path().to_path_buf();
        let tmp = tmp_path(&path);

        match publish(&tmp, &path, pid) {
            Ok(()) => Ok(()),
            Err(source) => {
                let _ = fs::remove_file(&tmp);
                Err(Error::PidFile { path, source })
            }
        }
    }

    /// Deletes the pid file. Failures are ignored; there is no recovery
    /// action a caller could take.
    pub fn remove(&mut self) {
        let _ = fs::remove_file(self.path());
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let dir = path.parent().unwrap_or(Path::new("/"));
    let base = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    dir.join(format!(".{base}.tmp"))
}

fn publish(tmp: &Path, path: &Path, pid: libc::pid_t) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o644)
        .open(tmp)?;

    file.write_all(format!("{pid}\n").as_bytes())?;
    file.sync_all()?;
    drop(file);

    fs::rename(tmp, path)
}

/// Parses the leading decimal integer of a pid file, tolerating leading
/// whitespace and trailing junk. Anything without a usable positive pid up
/// front is `None`.
fn parse_leading_pid(content: &str) -> Option<libc::pid_t> {
    let rest = content.trim_start();
    let rest = rest.strip_prefix('+').unwrap_or(rest);

    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return None;
    }

    let value = digits.parse::<i64>().ok()?;
    (value > 0 && value <= libc::pid_t::MAX as i64).then_some(value as libc::pid_t)
}

/// Derives the program name from `argv[0]`: the basename, with the leading
/// `-` of a login shell stripped when there is no directory part.
pub fn program_name(argv0: &str) -> &str {
    match argv0.rsplit_once('/') {
        Some((_, base)) => base,
        None => argv0.strip_prefix('-').unwrap_or(argv0),
    }
}
